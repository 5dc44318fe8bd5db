//! HTTP service around the `saferun_core` route search

pub mod api;
pub mod config;
pub mod state;
pub mod store;

pub use api::{ApiError, build_router};
pub use config::{ConfigError, ServerConfig};
pub use state::AppState;
pub use store::RouteStore;
