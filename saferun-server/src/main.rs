use std::path::PathBuf;

use clap::Parser;
use saferun_core::create_safety_model;
use saferun_server::{AppState, ServerConfig, build_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "saferun-server", about = "HTTP API for safety-aware running routes")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Road network in node-link JSON form
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Per-node safety scores (CSV)
    #[arg(long)]
    safety: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Fixed RNG seed for reproducible recommendations
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_attempts: Option<usize>,

    #[arg(long)]
    tolerance: Option<f64>,

    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(graph) = self.graph {
            config.data.graph_path = graph;
        }
        if let Some(safety) = self.safety {
            config.data.safety_path = safety;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.server.request_timeout_secs = secs;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.search.max_attempts = max_attempts;
        }
        if let Some(tolerance) = self.tolerance {
            config.search.tolerance = tolerance;
        }
        if self.seed.is_some() {
            config.search.seed = self.seed;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let model_config = config.model_config();
    let graph = tokio::task::spawn_blocking(move || create_safety_model(&model_config)).await??;

    let state = AppState::new(graph, &config);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
