//! IC Node Status Exporter: Prometheus exporter for Internet Computer nodes.
//!
//! Polls the public IC API once a minute for every node registered to one
//! node provider and republishes their status as gauges:
//! - `ic_node_api_up`: whether the last fetch succeeded
//! - `ic_node_count{node_provider_id}`: nodes returned
//! - `ic_node_status{node_id, ...}`: numeric status per node
//!
//! Configuration comes from a `.env`-style settings file and the
//! environment (`EXPORTER_PORT`, `NODE_PROVIDER_ID`, `IC_API_URL`).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod api;
mod config;
mod metrics;
mod poller;
mod server;
mod status;

use api::client::IcApiClient;
use config::Config;
use metrics::ExporterMetrics;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file with KEY=VALUE lines. Optional; environment wins.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (structured logs)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ic_node_exporter=info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("IC Node Status Exporter v{}", env!("CARGO_PKG_VERSION"));

    // ── Config ──────────────────────────────────────────────────────
    // A missing provider id is fatal: exit before anything listens.
    let config = match Config::load(&args.env_file) {
        Ok(c) => c,
        Err(e) => {
            error!("{}. Exiting...", e);
            std::process::exit(1);
        }
    };

    // ── Metrics ─────────────────────────────────────────────────────
    info!(
        provider_id = %config.provider_id,
        "Initializing metrics for node provider"
    );
    let metrics = Arc::new(ExporterMetrics::new().context("Failed to build metrics registry")?);

    // ── Metrics Endpoint ────────────────────────────────────────────
    let listener = server::bind(config.listen_port)
        .await
        .with_context(|| format!("Failed to bind metrics endpoint on port {}", config.listen_port))?;

    let server_metrics = Arc::clone(&metrics);
    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_metrics).await {
            error!("Metrics endpoint stopped: {}", e);
        }
    });

    info!(
        port = config.listen_port,
        "Started IC node status Prometheus exporter"
    );

    // ── Scrape Loop ─────────────────────────────────────────────────
    let client = IcApiClient::new(config.api_base_url, config.provider_id.clone());
    poller::run_poller(Arc::new(client), metrics, config.provider_id).await;

    Ok(())
}
