use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use saferun_core::{SafetyGraph, SearchOptions};

use crate::config::ServerConfig;
use crate::store::RouteStore;

/// Shared handler state; cloning only bumps reference counts
#[derive(Debug, Clone)]
pub struct AppState {
    pub graph: Arc<SafetyGraph>,
    pub store: Arc<RouteStore>,
    pub options: SearchOptions,
    pub seed: Option<u64>,
    /// Wall-clock budget of one request, also the search deadline
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(graph: SafetyGraph, config: &ServerConfig) -> Self {
        Self {
            graph: Arc::new(graph),
            store: Arc::new(RouteStore::with_capacity(config.store.max_routes)),
            options: config.search.options(),
            seed: config.search.seed,
            request_timeout: config.request_timeout(),
        }
    }

    /// Fresh generator for one search
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Search options whose deadline matches the request timeout starting now
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            deadline: Some(Instant::now() + self.request_timeout),
            ..self.options
        }
    }
}
