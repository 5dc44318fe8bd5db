use std::{cmp::Ordering, collections::BinaryHeap};

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{RoadEdge, SafetyGraph};

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

// Min-heap by cost, lower node index first on equal cost
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Dijkstra's algorithm between two nodes under an arbitrary non-negative
/// edge cost. Returns the node sequence from `start` to `target`, or `None`
/// if the target is unreachable.
pub fn shortest_path<F>(
    graph: &SafetyGraph,
    start: NodeIndex,
    target: NodeIndex,
    edge_cost: F,
) -> Option<Vec<NodeIndex>>
where
    F: Fn(EdgeReference<'_, RoadEdge>) -> f64,
{
    if start == target {
        return Some(vec![start]);
    }

    let estimated_nodes = graph.node_count().min(1024);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if settled.put(node.index()) {
            continue;
        }
        if node == target {
            break;
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }
            let next_cost = cost + edge_cost(edge);

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    if !settled.contains(target.index()) {
        return None;
    }

    // Follow predecessors backward from target to start
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        current = *predecessors.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use petgraph::graph::DiGraph;

    use super::*;
    use crate::model::RoadNode;

    fn plain(id: &str) -> RoadNode {
        RoadNode {
            id: id.to_string(),
            location: None,
            safety_raw: 0.0,
            safety_score: 0.0,
        }
    }

    fn edge(length_m: f64) -> RoadEdge {
        RoadEdge { length_m, key: 0 }
    }

    #[test]
    fn follows_cheapest_detour() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(plain("a"));
        let b = graph.add_node(plain("b"));
        let c = graph.add_node(plain("c"));
        graph.add_edge(a, c, edge(10.0));
        graph.add_edge(a, b, edge(3.0));
        graph.add_edge(b, c, edge(4.0));
        let graph = SafetyGraph::new(graph, false, true);

        let path = shortest_path(&graph, a, c, |e| e.weight().length_m).unwrap();
        assert_eq!(path, vec![a, b, c]);
    }

    #[test]
    fn unreachable_target_is_none() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(plain("a"));
        let b = graph.add_node(plain("b"));
        graph.add_edge(b, a, edge(1.0));
        let graph = SafetyGraph::new(graph, false, true);

        assert_eq!(shortest_path(&graph, a, b, |e| e.weight().length_m), None);
        assert_eq!(shortest_path(&graph, a, a, |e| e.weight().length_m), Some(vec![a]));
    }

    #[test]
    fn equal_costs_prefer_lower_index() {
        // a -> b -> d and a -> c -> d cost the same
        let mut graph = DiGraph::new();
        let a = graph.add_node(plain("a"));
        let b = graph.add_node(plain("b"));
        let c = graph.add_node(plain("c"));
        let d = graph.add_node(plain("d"));
        graph.add_edge(a, c, edge(5.0));
        graph.add_edge(a, b, edge(5.0));
        graph.add_edge(c, d, edge(5.0));
        graph.add_edge(b, d, edge(5.0));
        let graph = SafetyGraph::new(graph, false, true);

        let path = shortest_path(&graph, a, d, |e| e.weight().length_m).unwrap();
        assert_eq!(path, vec![a, b, d]);
    }
}
