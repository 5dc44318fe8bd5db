//! Safety-aware circular running routes
//!
//! Loads a road network and a per-node safety dataset into an immutable
//! [`SafetyGraph`], then searches there-and-back routes of a requested length
//! under three cost models: safest, shortest and a balanced blend.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use loading::{ModelConfig, create_safety_model};
pub use model::SafetyGraph;
pub use routing::{
    CircularRoutes, RouteCategory, RouteRecord, SearchOptions, find_circular_routes,
    find_circular_routes_batch, format_routes,
};

/// Length in meters assumed for edges without a `length` attribute
pub const DEFAULT_EDGE_LENGTH: f64 = 1.0;
/// Far-end samples drawn per search before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;
/// Accepted relative deviation of route length from the requested distance
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 0.2;
