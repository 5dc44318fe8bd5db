use std::path::PathBuf;

use clap::Parser;
use saferun_core::prelude::*;
use saferun_core::routing::routes_to_geojson_string;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Plans safety-aware circular running routes offline and prints them as JSON
#[derive(Debug, Parser)]
#[command(name = "saferun", version)]
struct Args {
    /// Road network in node-link JSON form
    #[arg(long)]
    graph: PathBuf,

    /// Per-node safety scores (CSV: osmid,safety_score,x,y)
    #[arg(long)]
    safety: PathBuf,

    /// Start node id; repeat to plan from several starts in parallel
    #[arg(long = "node", conflicts_with_all = ["lat", "lon"])]
    nodes: Vec<String>,

    /// Start latitude, snapped to the nearest node
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Start longitude, snapped to the nearest node
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Desired route length
    #[arg(short, long)]
    distance_km: f64,

    /// RNG seed; a random one is drawn when omitted
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    #[arg(long, default_value_t = DEFAULT_DISTANCE_TOLERANCE)]
    tolerance: f64,

    /// Also write all routes as a GeoJSON FeatureCollection
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let graph = create_safety_model(&ModelConfig::new(&args.graph, &args.safety))?;

    let start_ids: Vec<String> = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            let start = graph
                .nearest_node(lat, lon)
                .ok_or_else(|| Error::NodeNotFound(format!("no road node near ({lat}, {lon})")))?;
            info!("Snapped ({lat}, {lon}) to node {}", graph.graph[start].id);
            vec![graph.graph[start].id.clone()]
        }
        _ if !args.nodes.is_empty() => args.nodes.clone(),
        _ => return Err("either --node or --lat/--lon is required".into()),
    };
    let starts = start_ids
        .iter()
        .map(|id| graph.resolve(id))
        .collect::<Result<Vec<_>, _>>()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let options = SearchOptions {
        max_attempts: args.max_attempts,
        tolerance: args.tolerance,
        ..SearchOptions::default()
    };
    info!(
        "Planning {} km routes from {} start(s), seed {seed}",
        args.distance_km,
        starts.len()
    );

    let results = find_circular_routes_batch(&graph, &starts, args.distance_km, &options, seed);

    let mut all_records = Vec::new();
    let mut output = Vec::with_capacity(results.len());
    for (id, result) in start_ids.iter().zip(results) {
        let found = result?;
        if found.is_empty() {
            warn!("No route of {} km found from node {id}", args.distance_km);
        }
        let records = format_routes(&found);
        output.push(json!({
            "start_node": id,
            "attempts": found.attempts,
            "routes": &records,
        }));
        all_records.extend(records);
    }

    if let Some(path) = &args.geojson {
        std::fs::write(path, routes_to_geojson_string(&all_records)?)?;
        info!("GeoJSON written to {}", path.display());
    }

    let output = json!({ "seed": seed, "results": output });
    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
