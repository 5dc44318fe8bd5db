use std::path::PathBuf;

/// Input datasets for the safety model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Road network in node-link JSON form
    pub graph_path: PathBuf,
    /// Per-node safety scores (CSV)
    pub safety_path: PathBuf,
}

impl ModelConfig {
    pub fn new(graph_path: impl Into<PathBuf>, safety_path: impl Into<PathBuf>) -> Self {
        Self {
            graph_path: graph_path.into(),
            safety_path: safety_path.into(),
        }
    }
}
