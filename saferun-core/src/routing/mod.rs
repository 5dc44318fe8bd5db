//! Route search over the safety-annotated road graph
//!
//! Contains the per-category cost model, the weighted shortest-path search,
//! the randomized circular route search and its output formats.

pub mod circular;
pub mod cost;
pub mod dijkstra;
pub mod format;
pub mod route;
pub mod to_geojson;

pub use circular::{CircularRoutes, SearchOptions, find_circular_routes, find_circular_routes_batch};
pub use cost::RouteCategory;
pub use format::{RouteRecord, format_routes, round2};
pub use route::{Route, Waypoint};
pub use to_geojson::{routes_to_geojson, routes_to_geojson_string};
