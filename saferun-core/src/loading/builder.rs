use geo::Point;
use hashbrown::{HashMap, hash_map::Entry};
use log::{debug, info, warn};
use petgraph::graph::{DiGraph, NodeIndex};

use super::config::ModelConfig;
use super::graph_source::{GraphSource, SourceNodeId, load_graph_source};
use super::safety::{SafetyRecord, load_safety_records, normalize_scores};
use crate::model::{RoadEdge, RoadNode, SafetyGraph};
use crate::{DEFAULT_EDGE_LENGTH, Error};

/// Creates a safety model based on the provided configuration
///
/// # Errors
///
/// Returns an error if either dataset is missing, unreadable or inconsistent
pub fn create_safety_model(config: &ModelConfig) -> Result<SafetyGraph, Error> {
    validate_config(config)?;

    info!("Loading road network: {}", config.graph_path.display());
    let source = load_graph_source(&config.graph_path)?;

    info!("Loading safety scores: {}", config.safety_path.display());
    let records = load_safety_records(&config.safety_path)?;

    let graph = build_safety_graph(source, records)?;
    info!(
        "Safety model created: {} nodes ({} located), {} edges",
        graph.node_count(),
        graph.located_node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn validate_config(config: &ModelConfig) -> Result<(), Error> {
    for (what, path) in [
        ("Graph file", &config.graph_path),
        ("Safety dataset", &config.safety_path),
    ] {
        if !path.exists() {
            return Err(Error::GraphLoad(format!(
                "{what} not found: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Safety data attached to a node: raw score, normalized score, location
type NodeSafety = (f64, f64, Option<Point<f64>>);

/// Joins the road network with the safety dataset.
///
/// Only one edge is kept per ordered node pair: the one with the lowest
/// parallel key, first in file order on equal keys. Undirected sources are
/// expanded into both directions.
pub fn build_safety_graph(
    source: GraphSource,
    records: Vec<SafetyRecord>,
) -> Result<SafetyGraph, Error> {
    let GraphSource {
        directed,
        multigraph,
        nodes,
        links,
    } = source;

    let safety = index_safety_records(records);

    let mut graph: DiGraph<RoadNode, RoadEdge> = DiGraph::with_capacity(nodes.len(), links.len());
    let mut node_index: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());
    let mut unscored = 0_usize;

    for node in nodes {
        let id = node.id.into_string();
        if node_index.contains_key(&id) {
            return Err(Error::GraphLoad(format!("Duplicate node id '{id}'")));
        }

        let road_node = match safety.get(&id) {
            Some(&(raw, score, location)) => RoadNode {
                id: id.clone(),
                location,
                safety_raw: raw,
                safety_score: score,
            },
            None => {
                unscored += 1;
                RoadNode {
                    id: id.clone(),
                    location: None,
                    safety_raw: 0.0,
                    safety_score: 0.0,
                }
            }
        };
        node_index.insert(id, graph.add_node(road_node));
    }

    if unscored > 0 {
        warn!(
            "{unscored} of {} nodes have no safety record; they score 0 and have no coordinates",
            graph.node_count()
        );
    }

    // File order is kept so that path tie-breaking is reproducible
    let mut edges: Vec<(NodeIndex, NodeIndex, RoadEdge)> = Vec::with_capacity(links.len());
    let mut pair_slot: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::with_capacity(links.len());
    let mut dropped = 0_usize;

    for (link_no, link) in links.into_iter().enumerate() {
        let u = endpoint(&node_index, &link.source, link_no)?;
        let v = endpoint(&node_index, &link.target, link_no)?;

        let length_m = match link.length {
            None => DEFAULT_EDGE_LENGTH,
            Some(length) if length.is_finite() && length >= 0.0 => length,
            Some(length) => {
                return Err(Error::GraphLoad(format!(
                    "Link {link_no} ({} -> {}) has invalid length {length}",
                    link.source, link.target
                )));
            }
        };
        let edge = RoadEdge {
            length_m,
            key: link.key.unwrap_or(0),
        };

        let mut pairs = vec![(u, v)];
        if !directed && u != v {
            pairs.push((v, u));
        }

        for pair in pairs {
            match pair_slot.entry(pair) {
                Entry::Vacant(slot) => {
                    slot.insert(edges.len());
                    edges.push((pair.0, pair.1, edge));
                }
                Entry::Occupied(slot) => {
                    dropped += 1;
                    let kept = &mut edges[*slot.get()].2;
                    if edge.key < kept.key {
                        *kept = edge;
                    }
                }
            }
        }
    }

    if dropped > 0 {
        if multigraph {
            debug!("Collapsed {dropped} parallel edges onto the lowest key");
        } else {
            warn!("Graph is not flagged as multigraph but has {dropped} parallel edges; kept the lowest key");
        }
    }

    for (u, v, edge) in edges {
        graph.add_edge(u, v, edge);
    }

    Ok(SafetyGraph::new(graph, multigraph, directed))
}

fn index_safety_records(records: Vec<SafetyRecord>) -> HashMap<String, NodeSafety> {
    let scores = normalize_scores(&records);
    let mut safety: HashMap<String, NodeSafety> = HashMap::with_capacity(records.len());

    for (record, score) in records.into_iter().zip(scores) {
        match safety.entry(record.id) {
            Entry::Vacant(slot) => {
                slot.insert((record.raw, score, record.location));
            }
            Entry::Occupied(slot) => {
                warn!(
                    "Duplicate safety record for node {}, keeping the first one",
                    slot.key()
                );
            }
        }
    }

    safety
}

fn endpoint(
    node_index: &HashMap<String, NodeIndex>,
    id: &SourceNodeId,
    link_no: usize,
) -> Result<NodeIndex, Error> {
    let key = id.clone().into_string();
    node_index.get(&key).copied().ok_or_else(|| {
        Error::GraphLoad(format!("Link {link_no} references unknown node '{key}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::graph_source::parse_graph_source;

    fn record(id: &str, raw: f64, lat: f64, lon: f64) -> SafetyRecord {
        SafetyRecord {
            id: id.to_string(),
            raw,
            location: Some(Point::new(lon, lat)),
        }
    }

    fn source(doc: &str) -> GraphSource {
        parse_graph_source(doc.as_bytes()).unwrap()
    }

    #[test]
    fn attaches_scores_and_defaults_unmatched_nodes() {
        let graph = build_safety_graph(
            source(r#"{"nodes": [{"id": 1}, {"id": 2}, {"id": 3}], "links": []}"#),
            vec![record("1", 5.0, 35.0, 128.0), record("2", 10.0, 35.1, 128.1)],
        )
        .unwrap();

        let one = graph.node(graph.resolve("1").unwrap()).unwrap();
        assert_eq!(one.safety_score, 50.0);
        assert_eq!(one.safety_raw, 5.0);
        assert_eq!(one.lat_lon(), Some((35.0, 128.0)));

        let three = graph.node(graph.resolve("3").unwrap()).unwrap();
        assert_eq!(three.safety_score, 0.0);
        assert_eq!(three.location, None);
        assert_eq!(graph.located_node_count(), 2);
    }

    #[test]
    fn missing_length_defaults_to_one() {
        let graph = build_safety_graph(
            source(r#"{"nodes": [{"id": "a"}, {"id": "b"}], "links": [{"source": "a", "target": "b"}]}"#),
            vec![],
        )
        .unwrap();

        let (a, b) = (graph.resolve("a").unwrap(), graph.resolve("b").unwrap());
        assert_eq!(graph.edge_between(a, b).unwrap().length_m, 1.0);
        assert!(graph.edge_between(b, a).is_none());
    }

    #[test]
    fn parallel_edges_keep_lowest_key() {
        let graph = build_safety_graph(
            source(
                r#"{"multigraph": true, "nodes": [{"id": "a"}, {"id": "b"}], "links": [
                    {"source": "a", "target": "b", "key": 2, "length": 30.0},
                    {"source": "a", "target": "b", "key": 0, "length": 80.0},
                    {"source": "a", "target": "b", "key": 1, "length": 10.0}
                ]}"#,
            ),
            vec![],
        )
        .unwrap();

        assert!(graph.is_multigraph());
        assert_eq!(graph.edge_count(), 1);
        let (a, b) = (graph.resolve("a").unwrap(), graph.resolve("b").unwrap());
        let edge = graph.edge_between(a, b).unwrap();
        assert_eq!(edge.key, 0);
        assert_eq!(edge.length_m, 80.0);
    }

    #[test]
    fn undirected_source_is_expanded_both_ways() {
        let graph = build_safety_graph(
            source(
                r#"{"directed": false, "nodes": [{"id": "a"}, {"id": "b"}],
                    "links": [{"source": "a", "target": "b", "length": 7.0}]}"#,
            ),
            vec![],
        )
        .unwrap();

        let (a, b) = (graph.resolve("a").unwrap(), graph.resolve("b").unwrap());
        assert_eq!(graph.edge_between(b, a).unwrap().length_m, 7.0);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn rejects_inconsistent_sources() {
        let unknown = build_safety_graph(
            source(r#"{"nodes": [{"id": "a"}], "links": [{"source": "a", "target": "x"}]}"#),
            vec![],
        );
        assert!(matches!(unknown, Err(Error::GraphLoad(msg)) if msg.contains("'x'")));

        let negative = build_safety_graph(
            source(
                r#"{"nodes": [{"id": "a"}, {"id": "b"}],
                    "links": [{"source": "a", "target": "b", "length": -3.0}]}"#,
            ),
            vec![],
        );
        assert!(matches!(negative, Err(Error::GraphLoad(_))));

        let duplicate = build_safety_graph(source(r#"{"nodes": [{"id": "a"}, {"id": "a"}]}"#), vec![]);
        assert!(matches!(duplicate, Err(Error::GraphLoad(_))));
    }

    #[test]
    fn duplicate_safety_rows_keep_first() {
        let graph = build_safety_graph(
            source(r#"{"nodes": [{"id": "a"}]}"#),
            vec![record("a", 4.0, 1.0, 1.0), record("a", 8.0, 2.0, 2.0)],
        )
        .unwrap();

        let a = graph.node(graph.resolve("a").unwrap()).unwrap();
        assert_eq!(a.safety_score, 50.0);
        assert_eq!(a.lat_lon(), Some((1.0, 1.0)));
    }
}
