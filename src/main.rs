//! Civitas - Urban Risk Intelligence Service
//!
//! Multi-domain risk inference and scenario simulation over HTTP/WS.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (0.0.0.0:8080)
//! cargo run --release
//!
//! # Run with the demo ingest simulator feeding the real-time path
//! cargo run --release -- --simulate
//!
//! # Override the bind address
//! cargo run --release -- --addr 127.0.0.1:9090
//! ```
//!
//! # Environment Variables
//!
//! - `CIVITAS_CONFIG`: Path to the TOML configuration file
//! - `RUST_LOG`: Logging level (default: info)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use civitas::api::{create_app, ServiceState};
use civitas::config::{self, ServiceConfig};
use civitas::engine::CascadingRiskEngine;
use civitas::model::RiskModels;
use civitas::realtime::RealtimeStateManager;
use civitas::sim::IngestSimulator;
use civitas::warehouse::SeededWarehouse;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "civitas")]
#[command(about = "Civitas Urban Risk Intelligence Service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Start the in-process demo data simulator
    #[arg(long)]
    simulate: bool,

    /// Seed for the demo simulator
    #[arg(long, default_value_t = 42)]
    sim_seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civitas=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    config::init(ServiceConfig::load());
    let cfg = config::get();

    // Models are constructed eagerly at startup and passed into the
    // orchestration layer; no lazy re-init anywhere.
    let models = RiskModels::pretrained().context("building pretrained risk models")?;
    let engine = Arc::new(CascadingRiskEngine::new(models, cfg.engine));
    let realtime = Arc::new(RealtimeStateManager::new(engine.clone(), cfg.realtime));
    let warehouse = Arc::new(SeededWarehouse::new());

    let state = ServiceState {
        engine,
        realtime: realtime.clone(),
        warehouse,
    };

    let shutdown = CancellationToken::new();

    if args.simulate {
        let simulator =
            IngestSimulator::new(args.sim_seed).context("building demo simulator")?;
        tokio::spawn(simulator.run(realtime, shutdown.clone()));
    }

    let addr = args.addr.unwrap_or_else(|| cfg.server.addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "Civitas service listening");

    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("serving HTTP")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    token.cancel();
}
