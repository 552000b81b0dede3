//! Triage Board API Server
//!
//! Run with: cargo run --bin triage-board
//!
//! # Configuration
//!
//! Read from the first config file found (see `Config::load_default`) or the
//! path given with `--config`. Environment variables override the file:
//! - `TRIAGE_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TRIAGE_API_PORT`: Port to listen on (default: 8085)
//! - `TRIAGE_PUBLIC_URL`: Dashboard URL used in generated share links
//! - `TRIAGE_LOG_LEVEL`: Log level (default: info)
//! - `TRIAGE_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Full filter directive, takes precedence over the level

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_board::api::{serve, AppState};
use triage_board::config::{Config, LoggingConfig};

#[derive(Parser)]
#[command(name = "triage-board")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Triage dashboard API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting triage board API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Share links point at {}", config.share.public_url);
    if config.api.cors_origins.is_empty() {
        tracing::warn!("No CORS origins configured, allowing any origin");
    }

    let state = AppState::new(config.api.clone(), config.share.clone());

    tracing::info!("Starting server on {}:{}", config.api.host, config.api.port);
    serve(state, &config.api).await?;

    tracing::info!("Triage board API server stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("triage_board={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
