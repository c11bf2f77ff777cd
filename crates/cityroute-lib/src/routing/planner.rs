//! Route planning strategies implementing the Strategy pattern.
//!
//! Both planners run Dijkstra's algorithm under the requested weight
//! projection and return identical paths; they differ only in how the next
//! vertex to settle is chosen.

use crate::graph::{CityIndex, RouteGraph};
use crate::path::{find_route_dense, find_route_heap};

use super::{RouteAlgorithm, RouteObjective, RouteRequest};

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Execute the search, returning `None` when `goal` is unreachable.
    fn find_path(
        &self,
        graph: &RouteGraph,
        start: CityIndex,
        goal: CityIndex,
        objective: RouteObjective,
    ) -> Option<Vec<CityIndex>>;
}

/// Dijkstra with O(n²) linear-scan vertex selection over the dense matrix.
#[derive(Debug, Clone, Default)]
pub struct DenseDijkstraPlanner;

impl RoutePlanner for DenseDijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dense
    }

    fn find_path(
        &self,
        graph: &RouteGraph,
        start: CityIndex,
        goal: CityIndex,
        objective: RouteObjective,
    ) -> Option<Vec<CityIndex>> {
        find_route_dense(graph, start, goal, objective)
    }
}

/// Dijkstra with a binary-heap frontier that stops once the goal is settled.
#[derive(Debug, Clone, Default)]
pub struct HeapDijkstraPlanner;

impl RoutePlanner for HeapDijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Heap
    }

    fn find_path(
        &self,
        graph: &RouteGraph,
        start: CityIndex,
        goal: CityIndex,
        objective: RouteObjective,
    ) -> Option<Vec<CityIndex>> {
        find_route_heap(graph, start, goal, objective)
    }
}

/// Select the appropriate planner for a given request.
pub fn select_planner(request: &RouteRequest) -> Box<dyn RoutePlanner> {
    match request.algorithm {
        RouteAlgorithm::Dense => Box::new(DenseDijkstraPlanner),
        RouteAlgorithm::Heap => Box::new(HeapDijkstraPlanner),
    }
}
