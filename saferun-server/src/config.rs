//! TOML configuration for the route server
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Command line flags override single values after
//! loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use saferun_core::{DEFAULT_DISTANCE_TOLERANCE, DEFAULT_MAX_ATTEMPTS, ModelConfig, SearchOptions};
use serde::Deserialize;
use thiserror::Error;

/// Default bound on routes kept in memory between requests
pub const DEFAULT_MAX_ROUTES: usize = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub data: DataConfig,
    pub server: ListenConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

/// Input datasets
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub graph_path: PathBuf,
    pub safety_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("data/graph.json"),
            safety_path: PathBuf::from("data/safety.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_attempts: usize,
    pub tolerance: f64,
    /// Fixed RNG seed; every request replays the same sampling when set
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tolerance: DEFAULT_DISTANCE_TOLERANCE,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            max_attempts: self.max_attempts,
            tolerance: self.tolerance,
            ..SearchOptions::default()
        }
    }
}

/// Retention of recommended routes; the oldest are evicted past `max_routes`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub max_routes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_routes: DEFAULT_MAX_ROUTES,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "search.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.search.tolerance > 0.0 && self.search.tolerance < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "search.tolerance must be in (0, 1), got {}",
                self.search.tolerance
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.store.max_routes == 0 {
            return Err(ConfigError::Invalid(
                "store.max_routes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(&self.data.graph_path, &self.data.safety_path)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
