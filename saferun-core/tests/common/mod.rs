#![allow(dead_code)]

use std::fs;
use std::path::Path;

use saferun_core::{ModelConfig, SafetyGraph, create_safety_model};
use serde_json::json;

/// Grid spacing in meters between neighbouring nodes
pub const GRID_STEP_M: f64 = 100.0;

/// Node id of grid cell `(row, col)`
pub fn grid_id(size: usize, row: usize, col: usize) -> u64 {
    1000 + (row * size + col) as u64
}

/// Writes an undirected `size x size` grid with 100 m edges and a safety
/// CSV where the raw score grows with the column index.
pub fn write_grid(dir: &Path, size: usize) -> ModelConfig {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut csv = String::from("osmid,safety_score,x,y\n");

    for row in 0..size {
        for col in 0..size {
            let id = grid_id(size, row, col);
            nodes.push(json!({ "id": id }));
            let lat = 37.5 + row as f64 * 0.0009;
            let lon = 127.0 + col as f64 * 0.0011;
            csv.push_str(&format!("{id},{},{lon},{lat}\n", col * 2));

            if col + 1 < size {
                edges.push(json!({
                    "source": id,
                    "target": grid_id(size, row, col + 1),
                    "key": 0,
                    "length": GRID_STEP_M,
                }));
            }
            if row + 1 < size {
                edges.push(json!({
                    "source": id,
                    "target": grid_id(size, row + 1, col),
                    "key": 0,
                    "length": GRID_STEP_M,
                }));
            }
        }
    }

    let doc = json!({
        "directed": false,
        "multigraph": true,
        "graph": {},
        "nodes": nodes,
        "edges": edges,
    });

    let graph_path = dir.join("grid.json");
    let safety_path = dir.join("safety.csv");
    fs::write(&graph_path, doc.to_string()).unwrap();
    fs::write(&safety_path, csv).unwrap();
    ModelConfig::new(graph_path, safety_path)
}

pub fn load_grid(dir: &Path, size: usize) -> SafetyGraph {
    create_safety_model(&write_grid(dir, size)).unwrap()
}
