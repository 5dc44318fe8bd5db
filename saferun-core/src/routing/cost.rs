//! Edge cost functions for each route category
//!
//! Costs are derived from the immutable graph every time an edge is
//! relaxed instead of being written onto the edges.

use std::fmt;

use petgraph::graph::EdgeReference;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::loading::safety::MAX_SAFETY_SCORE;
use crate::model::{RoadEdge, SafetyGraph};

/// Category of a recommended route, in search order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteCategory {
    /// Minimizes exposure to low-safety nodes
    Safe,
    /// Minimizes physical length
    Shortest,
    /// Equal blend of safety and length
    Balanced,
}

impl RouteCategory {
    /// All categories in the order the search fills them
    pub const ALL: [RouteCategory; 3] = [
        RouteCategory::Safe,
        RouteCategory::Shortest,
        RouteCategory::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteCategory::Safe => "safe",
            RouteCategory::Shortest => "shortest",
            RouteCategory::Balanced => "balanced",
        }
    }

    /// Cost of traversing `edge` under this category
    pub fn edge_cost(self, graph: &SafetyGraph, edge: EdgeReference<'_, RoadEdge>) -> f64 {
        match self {
            RouteCategory::Safe => safety_cost(graph, edge),
            RouteCategory::Shortest => distance_cost(edge.weight()),
            RouteCategory::Balanced => balanced_cost(graph, edge),
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn distance_cost(edge: &RoadEdge) -> f64 {
    edge.length_m
}

/// `101 - safety(v)`: the penalty belongs to the node the edge leads into.
/// Always at least 1, so zero-length edges still cost something.
pub fn safety_cost(graph: &SafetyGraph, edge: EdgeReference<'_, RoadEdge>) -> f64 {
    MAX_SAFETY_SCORE + 1.0 - graph.safety_score(edge.target())
}

pub fn balanced_cost(graph: &SafetyGraph, edge: EdgeReference<'_, RoadEdge>) -> f64 {
    0.5 * safety_cost(graph, edge) + 0.5 * distance_cost(edge.weight())
}
