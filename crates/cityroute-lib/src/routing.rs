//! Route planning over a [`RouteGraph`].
//!
//! This module provides:
//! - [`RouteObjective`] - Which edge weight drives the search
//! - [`RouteAlgorithm`] - Which Dijkstra variant runs the search
//! - [`RouteRequest`] / [`RoutePlan`] - Index-level planning API
//! - [`find_path`] / [`PathResult`] - Name-level query returning the path and totals
//!
//! # Example
//!
//! ```
//! use cityroute_lib::{find_path, Coordinate, EdgeWeights, RouteGraph};
//!
//! let mut graph = RouteGraph::new();
//! graph.add_vertex("Paris", Some(Coordinate::new(48.85, 2.35)));
//! graph.add_vertex("Lyon", Some(Coordinate::new(45.76, 4.84)));
//! graph.add_edge("Paris", "Lyon", EdgeWeights::new(465.0, 4.5, 60.0)).unwrap();
//!
//! let result = find_path(&graph, "Paris", "Lyon", "fastest").unwrap();
//! assert_eq!(result.path, vec!["Paris", "Lyon"]);
//! assert_eq!(result.time, 4.5);
//! ```

mod planner;

pub use planner::{select_planner, DenseDijkstraPlanner, HeapDijkstraPlanner, RoutePlanner};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{CityIndex, EdgeWeights, RouteGraph};

/// Optimization objective: which weight dimension the search minimizes.
///
/// Parsing is permissive. Any unrecognised value selects
/// [`RouteObjective::Shortest`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RouteObjective {
    /// Minimize total distance.
    #[default]
    Shortest,
    /// Minimize total travel time.
    Fastest,
    /// Minimize total monetary cost.
    Cheapest,
}

impl RouteObjective {
    /// Parse an objective name, falling back to `Shortest` for anything unknown.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "shortest" => RouteObjective::Shortest,
            "fastest" => RouteObjective::Fastest,
            "cheapest" => RouteObjective::Cheapest,
            other => {
                debug!(objective = other, "unrecognised objective; using shortest");
                RouteObjective::Shortest
            }
        }
    }

    /// Project a route's weights onto the scalar this objective minimizes.
    pub fn weight(self, weights: &EdgeWeights) -> f64 {
        match self {
            RouteObjective::Shortest => weights.distance,
            RouteObjective::Fastest => weights.time,
            RouteObjective::Cheapest => weights.cost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteObjective::Shortest => "shortest",
            RouteObjective::Fastest => "fastest",
            RouteObjective::Cheapest => "cheapest",
        }
    }
}

impl From<&str> for RouteObjective {
    fn from(value: &str) -> Self {
        Self::parse_lenient(value)
    }
}

impl From<String> for RouteObjective {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl fmt::Display for RouteObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    /// Linear-scan Dijkstra over the dense matrix.
    #[default]
    Dense,
    /// Binary-heap Dijkstra.
    Heap,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dense => "dense",
            RouteAlgorithm::Heap => "heap",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: String,
    pub goal: String,
    pub objective: RouteObjective,
    pub algorithm: RouteAlgorithm,
}

impl RouteRequest {
    /// Request using the default dense planner.
    pub fn new(
        start: impl Into<String>,
        goal: impl Into<String>,
        objective: impl Into<RouteObjective>,
    ) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            objective: objective.into(),
            algorithm: RouteAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub objective: RouteObjective,
    pub start: CityIndex,
    pub goal: CityIndex,
    pub steps: Vec<CityIndex>,
    /// Sum of every weight dimension along `steps`.
    pub totals: EdgeWeights,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Path between two named cities with its aggregate cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub path: Vec<String>,
    pub distance: f64,
    pub time: f64,
    pub cost: f64,
}

impl PathResult {
    /// Resolve a plan's indices back into city names.
    pub fn from_plan(graph: &RouteGraph, plan: &RoutePlan) -> Self {
        Self {
            path: plan
                .steps
                .iter()
                .filter_map(|&idx| graph.name_of(idx).map(str::to_string))
                .collect(),
            distance: plan.totals.distance,
            time: plan.totals.time,
            cost: plan.totals.cost,
        }
    }
}

/// Compute a route using the requested planner and objective.
pub fn plan_route(graph: &RouteGraph, request: &RouteRequest) -> Result<RoutePlan> {
    let start_id = graph.require_index(&request.start)?;
    let goal_id = graph.require_index(&request.goal)?;

    let planner = select_planner(request);
    let steps = planner
        .find_path(graph, start_id, goal_id, request.objective)
        .ok_or_else(|| Error::RouteNotFound {
            start: request.start.clone(),
            goal: request.goal.clone(),
        })?;

    let totals = aggregate_weights(graph, &steps);
    debug!(
        algorithm = %planner.algorithm(),
        objective = %request.objective,
        hops = steps.len().saturating_sub(1),
        "route planned"
    );

    Ok(RoutePlan {
        algorithm: planner.algorithm(),
        objective: request.objective,
        start: start_id,
        goal: goal_id,
        steps,
        totals,
    })
}

/// Find the best path between two named cities.
///
/// `objective` accepts a [`RouteObjective`] or any string; unknown strings
/// fall back to `shortest`.
pub fn find_path(
    graph: &RouteGraph,
    start: &str,
    goal: &str,
    objective: impl Into<RouteObjective>,
) -> Result<PathResult> {
    let request = RouteRequest::new(start, goal, objective);
    let plan = plan_route(graph, &request)?;
    Ok(PathResult::from_plan(graph, &plan))
}

/// Sum stored weights over each consecutive pair of `steps`.
pub fn aggregate_weights(graph: &RouteGraph, steps: &[CityIndex]) -> EdgeWeights {
    let mut totals = EdgeWeights::default();
    for pair in steps.windows(2) {
        if let Some(weights) = graph.edge_between(pair[0], pair[1]) {
            totals += *weights;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_parsing_is_permissive() {
        assert_eq!(RouteObjective::from("fastest"), RouteObjective::Fastest);
        assert_eq!(RouteObjective::from(" Cheapest "), RouteObjective::Cheapest);
        assert_eq!(RouteObjective::from("scenic"), RouteObjective::Shortest);
        assert_eq!(RouteObjective::from(""), RouteObjective::Shortest);
    }

    #[test]
    fn objective_deserializes_unknown_values_to_shortest() {
        let objective: RouteObjective = serde_json::from_str("\"teleport\"").unwrap();
        assert_eq!(objective, RouteObjective::Shortest);

        let objective: RouteObjective = serde_json::from_str("\"fastest\"").unwrap();
        assert_eq!(objective, RouteObjective::Fastest);
        assert_eq!(serde_json::to_string(&objective).unwrap(), "\"fastest\"");
    }

    #[test]
    fn objective_projects_matching_dimension() {
        let weights = EdgeWeights::new(1.0, 2.0, 3.0);
        assert_eq!(RouteObjective::Shortest.weight(&weights), 1.0);
        assert_eq!(RouteObjective::Fastest.weight(&weights), 2.0);
        assert_eq!(RouteObjective::Cheapest.weight(&weights), 3.0);
    }

    #[test]
    fn route_plan_hop_count() {
        let plan = RoutePlan {
            algorithm: RouteAlgorithm::Dense,
            objective: RouteObjective::Shortest,
            start: 0,
            goal: 2,
            steps: vec![0, 1, 2],
            totals: EdgeWeights::default(),
        };
        assert_eq!(plan.hop_count(), 2);
    }

    #[test]
    fn route_plan_empty_hop_count() {
        let plan = RoutePlan {
            algorithm: RouteAlgorithm::Heap,
            objective: RouteObjective::Shortest,
            start: 0,
            goal: 0,
            steps: vec![],
            totals: EdgeWeights::default(),
        };
        assert_eq!(plan.hop_count(), 0);
    }

    #[test]
    fn algorithm_display_matches_serde_names() {
        assert_eq!(RouteAlgorithm::Dense.to_string(), "dense");
        assert_eq!(
            serde_json::to_string(&RouteAlgorithm::Heap).unwrap(),
            "\"heap\""
        );
    }
}
