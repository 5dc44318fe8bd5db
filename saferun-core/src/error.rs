use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph load error: {0}")]
    GraphLoad(String),
    #[error("Node not found in graph: {0}")]
    NodeNotFound(String),
    #[error("Invalid desired distance: {0} km")]
    InvalidDistance(f64),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
