use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::cost::RouteCategory;
use crate::model::SafetyGraph;

/// One `[lat, lon]` point of a route; both parts are `null` for nodes
/// without coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint(pub Option<f64>, pub Option<f64>);

impl Waypoint {
    pub fn lat(&self) -> Option<f64> {
        self.0
    }

    pub fn lon(&self) -> Option<f64> {
        self.1
    }

    /// `(lat, lon)` if both parts are known
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        self.0.zip(self.1)
    }
}

/// Accepted there-and-back route
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub category: RouteCategory,
    /// Closed walk, first node equals last node
    pub nodes: Vec<NodeIndex>,
    /// Source ids of `nodes`
    pub node_ids: Vec<String>,
    /// Physical length of the whole walk
    pub length_m: f64,
    pub distance_km: f64,
    /// Arithmetic mean of node safety scores along the walk
    pub average_safety_score: f64,
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub(crate) fn from_walk(
        graph: &SafetyGraph,
        category: RouteCategory,
        walk: Vec<NodeIndex>,
        length_m: f64,
    ) -> Self {
        let mut node_ids = Vec::with_capacity(walk.len());
        let mut waypoints = Vec::with_capacity(walk.len());
        let mut score_sum = 0.0;

        for &idx in &walk {
            let node = &graph.graph[idx];
            node_ids.push(node.id.clone());
            score_sum += node.safety_score;
            waypoints.push(match node.lat_lon() {
                Some((lat, lon)) => Waypoint(Some(lat), Some(lon)),
                None => Waypoint(None, None),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let average_safety_score = if walk.is_empty() {
            0.0
        } else {
            score_sum / walk.len() as f64
        };

        Self {
            category,
            nodes: walk,
            node_ids,
            length_m,
            distance_km: length_m / 1000.0,
            average_safety_score,
            waypoints,
        }
    }

    /// Start and finish of the walk coincide
    pub fn is_closed(&self) -> bool {
        self.nodes.first() == self.nodes.last()
    }
}

/// Forward path followed by its own reverse, without repeating the turnaround node
pub(crate) fn there_and_back(path: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut walk = Vec::with_capacity(path.len() * 2);
    walk.extend_from_slice(path);
    walk.extend(path.iter().rev().skip(1));
    walk
}
