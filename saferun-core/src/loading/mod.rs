//! This module is responsible for loading the road network and the safety
//! dataset and joining them into one routing model.

mod builder;
mod config;
pub mod graph_source;
pub mod safety;

pub use builder::{build_safety_graph, create_safety_model};
pub use config::ModelConfig;
pub use graph_source::{GraphSource, load_graph_source, parse_graph_source};
pub use safety::{SafetyRecord, load_safety_records, normalize_scores, read_safety_records};
