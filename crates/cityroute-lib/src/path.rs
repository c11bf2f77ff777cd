use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{CityIndex, RouteGraph};
use crate::routing::RouteObjective;

/// Run Dijkstra's algorithm with a linear scan for the next vertex.
///
/// Every call allocates its own distance, predecessor, and visited arrays, so
/// concurrent queries against one graph need no synchronisation. Among
/// unvisited vertices with equal tentative cost the lowest index is settled
/// first, and a predecessor is only replaced by a strictly cheaper path.
pub fn find_route_dense(
    graph: &RouteGraph,
    start: CityIndex,
    goal: CityIndex,
    objective: RouteObjective,
) -> Option<Vec<CityIndex>> {
    let n = graph.vertex_count();
    if start >= n || goal >= n {
        return None;
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut parents: Vec<Option<CityIndex>> = vec![None; n];
    let mut visited = vec![false; n];
    distances[start] = 0.0;

    for _ in 0..n {
        let mut current: Option<CityIndex> = None;
        for candidate in 0..n {
            if visited[candidate] || !distances[candidate].is_finite() {
                continue;
            }
            match current {
                Some(best) if distances[best] <= distances[candidate] => {}
                _ => current = Some(candidate),
            }
        }
        let Some(u) = current else {
            break;
        };

        visited[u] = true;
        for (v, weights) in graph.neighbours(u) {
            if visited[v] {
                continue;
            }
            let next_cost = distances[u] + objective.weight(weights);
            if next_cost < distances[v] {
                distances[v] = next_cost;
                parents[v] = Some(u);
            }
        }
    }

    reconstruct_path(&parents, start, goal)
}

/// Run Dijkstra's algorithm backed by a binary heap.
///
/// Produces the same path as [`find_route_dense`]: heap entries are ordered by
/// cost and then by lowest index, and the search settles vertices in the same
/// order before stopping at the goal.
pub fn find_route_heap(
    graph: &RouteGraph,
    start: CityIndex,
    goal: CityIndex,
    objective: RouteObjective,
) -> Option<Vec<CityIndex>> {
    let n = graph.vertex_count();
    if start >= n || goal >= n {
        return None;
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut parents: Vec<Option<CityIndex>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = BinaryHeap::new();

    distances[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let u = entry.node;
        if visited[u] || entry.cost.0 > distances[u] {
            continue;
        }
        visited[u] = true;

        if u == goal {
            break;
        }

        for (v, weights) in graph.neighbours(u) {
            if visited[v] {
                continue;
            }
            let next_cost = distances[u] + objective.weight(weights);
            if next_cost < distances[v] {
                distances[v] = next_cost;
                parents[v] = Some(u);
                queue.push(QueueEntry::new(v, next_cost));
            }
        }
    }

    reconstruct_path(&parents, start, goal)
}

/// Walk predecessors back from `goal`; `None` when the walk never reaches `start`.
fn reconstruct_path(
    parents: &[Option<CityIndex>],
    start: CityIndex,
    goal: CityIndex,
) -> Option<Vec<CityIndex>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = parents[current]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: CityIndex,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: CityIndex, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then index.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeWeights;

    /// Square A-B-D / A-C-D where both sides cost the same.
    fn tied_square() -> RouteGraph {
        let mut graph = RouteGraph::new();
        for name in ["A", "B", "C", "D"] {
            graph.add_vertex(name, None);
        }
        let w = EdgeWeights::new(1.0, 1.0, 1.0);
        graph.add_edge("A", "B", w).unwrap();
        graph.add_edge("A", "C", w).unwrap();
        graph.add_edge("B", "D", w).unwrap();
        graph.add_edge("C", "D", w).unwrap();
        graph
    }

    #[test]
    fn equal_cost_paths_keep_the_first_found_predecessor() {
        let graph = tied_square();
        let expected = Some(vec![0, 1, 3]);
        assert_eq!(
            find_route_dense(&graph, 0, 3, RouteObjective::Shortest),
            expected
        );
        assert_eq!(
            find_route_heap(&graph, 0, 3, RouteObjective::Shortest),
            expected
        );
    }

    #[test]
    fn start_equals_goal_is_a_single_vertex() {
        let graph = tied_square();
        assert_eq!(
            find_route_dense(&graph, 2, 2, RouteObjective::Fastest),
            Some(vec![2])
        );
        assert_eq!(
            find_route_heap(&graph, 2, 2, RouteObjective::Fastest),
            Some(vec![2])
        );
    }

    #[test]
    fn disconnected_goal_has_no_route() {
        let mut graph = tied_square();
        graph.add_vertex("Island", None);
        assert_eq!(find_route_dense(&graph, 0, 4, RouteObjective::Shortest), None);
        assert_eq!(find_route_heap(&graph, 0, 4, RouteObjective::Shortest), None);
    }

    #[test]
    fn out_of_range_indices_have_no_route() {
        let graph = tied_square();
        assert_eq!(find_route_dense(&graph, 0, 9, RouteObjective::Shortest), None);
        assert_eq!(find_route_heap(&graph, 9, 0, RouteObjective::Shortest), None);
    }

    #[test]
    fn zero_weight_edges_are_traversed() {
        let mut graph = RouteGraph::new();
        for name in ["A", "B", "C"] {
            graph.add_vertex(name, None);
        }
        graph
            .add_edge("A", "B", EdgeWeights::new(0.0, 0.0, 0.0))
            .unwrap();
        graph
            .add_edge("B", "C", EdgeWeights::new(0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(
            find_route_dense(&graph, 0, 2, RouteObjective::Cheapest),
            Some(vec![0, 1, 2])
        );
        assert_eq!(
            find_route_heap(&graph, 0, 2, RouteObjective::Cheapest),
            Some(vec![0, 1, 2])
        );
    }

    #[test]
    fn queue_entries_pop_lowest_cost_then_lowest_index() {
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry::new(3, 1.0));
        queue.push(QueueEntry::new(1, 1.0));
        queue.push(QueueEntry::new(0, 2.0));
        let order: Vec<_> = std::iter::from_fn(|| queue.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![1, 3, 0]);
    }
}
