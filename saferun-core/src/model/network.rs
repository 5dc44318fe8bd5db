//! Road network annotated with per-node safety scores

use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{RoadEdge, RoadNode};
use crate::Error;

/// Node location in `[lon, lat]` order tagged with its graph index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Immutable road graph shared by every route search.
///
/// Edge costs are never stored here; they are derived per relaxation by
/// [`crate::routing::RouteCategory::edge_cost`], so one instance can serve
/// any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct SafetyGraph {
    pub graph: DiGraph<RoadNode, RoadEdge>,
    id_index: HashMap<String, NodeIndex>,
    rtree: RTree<IndexedPoint>,
    multigraph: bool,
    directed: bool,
}

impl SafetyGraph {
    /// Wraps an annotated graph, indexing node ids and coordinates.
    ///
    /// Node ids are expected to be unique; the builder rejects duplicates
    /// before calling this.
    pub fn new(graph: DiGraph<RoadNode, RoadEdge>, multigraph: bool, directed: bool) -> Self {
        let id_index = graph
            .node_indices()
            .map(|idx| (graph[idx].id.clone(), idx))
            .collect();

        let points: Vec<IndexedPoint> = graph
            .node_indices()
            .filter_map(|idx| {
                graph[idx]
                    .location
                    .map(|p| GeomWithData::new([p.x(), p.y()], idx))
            })
            .collect();

        Self {
            graph,
            id_index,
            rtree: RTree::bulk_load(points),
            multigraph,
            directed,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the source dataset allowed parallel edges
    pub fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes with known coordinates
    pub fn located_node_count(&self) -> usize {
        self.rtree.size()
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        node.index() < self.graph.node_count()
    }

    pub fn node(&self, node: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(node)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Resolves a source node id to its graph index
    pub fn resolve(&self, id: &str) -> Result<NodeIndex, Error> {
        self.node_index(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Normalized safety score of a node, 0 for unknown indices
    pub fn safety_score(&self, node: NodeIndex) -> f64 {
        self.graph
            .node_weight(node)
            .map_or(0.0, |n| n.safety_score)
    }

    /// Closest node with coordinates to the query point.
    ///
    /// Distance is planar euclidean over raw degrees, without geodesic
    /// correction. Returns `None` if no node has coordinates.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeIndex> {
        self.rtree.nearest_neighbor(&[lon, lat]).map(|point| point.data)
    }

    /// Canonical edge `u -> v`
    pub fn edge_between(&self, u: NodeIndex, v: NodeIndex) -> Option<&RoadEdge> {
        self.graph
            .find_edge(u, v)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Length of the segment between two consecutive walk nodes.
    ///
    /// Falls back to the opposite direction when `u -> v` is missing, which
    /// happens on the return leg along one-way streets.
    pub fn segment_length(&self, u: NodeIndex, v: NodeIndex) -> Option<f64> {
        self.edge_between(u, v)
            .or_else(|| self.edge_between(v, u))
            .map(|edge| edge.length_m)
    }

    /// Physical length in meters of a node walk
    pub fn walk_length(&self, walk: &[NodeIndex]) -> f64 {
        walk.iter()
            .tuple_windows()
            .map(|(&u, &v)| self.segment_length(u, v).unwrap_or(0.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;

    fn node(id: &str, location: Option<(f64, f64)>) -> RoadNode {
        RoadNode {
            id: id.to_string(),
            location: location.map(|(lat, lon)| Point::new(lon, lat)),
            safety_raw: 0.0,
            safety_score: 0.0,
        }
    }

    #[test]
    fn nearest_node_is_none_without_coordinates() {
        let mut graph = DiGraph::new();
        graph.add_node(node("a", None));
        graph.add_node(node("b", None));
        let graph = SafetyGraph::new(graph, false, true);

        assert_eq!(graph.nearest_node(35.0, 128.0), None);
        assert_eq!(graph.located_node_count(), 0);
    }

    #[test]
    fn nearest_node_minimizes_planar_distance() {
        let mut graph = DiGraph::new();
        graph.add_node(node("far", Some((35.9, 128.9))));
        let close = graph.add_node(node("close", Some((35.01, 128.02))));
        graph.add_node(node("unlocated", None));
        graph.add_node(node("mid", Some((35.2, 128.2))));
        let graph = SafetyGraph::new(graph, false, true);

        assert_eq!(graph.nearest_node(35.0, 128.0), Some(close));
    }

    #[test]
    fn resolve_unknown_id_is_node_not_found() {
        let mut graph = DiGraph::new();
        graph.add_node(node("a", None));
        let graph = SafetyGraph::new(graph, false, true);

        assert!(graph.resolve("a").is_ok());
        assert!(matches!(graph.resolve("zz"), Err(Error::NodeNotFound(id)) if id == "zz"));
    }

    #[test]
    fn walk_length_falls_back_to_reverse_edge() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(node("a", None));
        let b = graph.add_node(node("b", None));
        let c = graph.add_node(node("c", None));
        graph.add_edge(a, b, RoadEdge { length_m: 40.0, key: 0 });
        graph.add_edge(b, c, RoadEdge { length_m: 60.0, key: 0 });
        graph.add_edge(c, b, RoadEdge { length_m: 65.0, key: 0 });
        let graph = SafetyGraph::new(graph, false, true);

        // c -> b exists, b -> a only in the forward direction
        let walk = [a, b, c, b, a];
        assert!((graph.walk_length(&walk) - 205.0).abs() < 1e-9);
    }
}
