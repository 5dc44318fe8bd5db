//! Road network components - nodes carrying safety scores and edges carrying lengths

use geo::Point;

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Opaque id of the node in the source dataset
    pub id: String,
    /// Node coordinates (x = lon, y = lat), absent when no safety record matched
    pub location: Option<Point<f64>>,
    /// Safety score as found in the safety dataset
    pub safety_raw: f64,
    /// Safety score scaled to the 0..=100 range
    pub safety_score: f64,
}

impl RoadNode {
    /// `(lat, lon)` pair of the node, if it has coordinates
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        self.location.map(|p| (p.y(), p.x()))
    }
}

/// Road graph edge (street segment)
#[derive(Debug, Clone, Copy)]
pub struct RoadEdge {
    /// Physical length in meters
    pub length_m: f64,
    /// Key distinguishing parallel edges in the source multigraph
    pub key: u64,
}
