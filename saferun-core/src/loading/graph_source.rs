//! Road network source in networkx node-link JSON form

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::Error;

/// Node identifier as found in the document; OSM exports mix integers and strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SourceNodeId {
    Int(i64),
    Str(String),
}

impl SourceNodeId {
    pub fn into_string(self) -> String {
        match self {
            SourceNodeId::Int(id) => id.to_string(),
            SourceNodeId::Str(id) => id,
        }
    }
}

impl fmt::Display for SourceNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceNodeId::Int(id) => write!(f, "{id}"),
            SourceNodeId::Str(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceNode {
    pub id: SourceNodeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceLink {
    pub source: SourceNodeId,
    pub target: SourceNodeId,
    /// Parallel edge key, only present in multigraphs
    #[serde(default)]
    pub key: Option<u64>,
    /// Segment length in meters
    #[serde(default)]
    pub length: Option<f64>,
}

fn default_directed() -> bool {
    true
}

/// Road network document. Unknown attributes are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSource {
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    pub nodes: Vec<SourceNode>,
    /// networkx < 3.4 writes `links`, newer versions write `edges`
    #[serde(default, alias = "edges")]
    pub links: Vec<SourceLink>,
}

/// Reads a node-link document from any reader
pub fn parse_graph_source<R: Read>(reader: R) -> Result<GraphSource, Error> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a node-link document from disk
///
/// # Errors
///
/// Returns [`Error::GraphLoad`] if the file cannot be opened or parsed
pub fn load_graph_source(path: &Path) -> Result<GraphSource, Error> {
    let file = File::open(path).map_err(|e| {
        Error::GraphLoad(format!("Failed to open graph '{}': {e}", path.display()))
    })?;

    parse_graph_source(BufReader::new(file)).map_err(|e| {
        Error::GraphLoad(format!("Failed to parse graph '{}': {e}", path.display()))
    })
}
