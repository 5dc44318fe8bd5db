pub use crate::{DEFAULT_DISTANCE_TOLERANCE, DEFAULT_EDGE_LENGTH, DEFAULT_MAX_ATTEMPTS};

// Loading and the graph model
pub use crate::loading::{ModelConfig, build_safety_graph, create_safety_model};
pub use crate::model::{RoadEdge, RoadNode, SafetyGraph};

// Route search and output
pub use crate::routing::{
    CircularRoutes, Route, RouteCategory, RouteRecord, SearchOptions, Waypoint,
    find_circular_routes, find_circular_routes_batch, format_routes, routes_to_geojson,
};

pub use crate::Error;
