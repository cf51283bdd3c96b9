//! Worker gateway dev host.
//!
//! Runs the in-process API gateway behind a plain HTTP listener so the demo
//! API and static assets can be used from a real browser or `gateway-cli`.
//!
//! # Architecture Overview
//!
//! ```text
//!     HTTP request
//!         │
//!         ▼
//!   ┌───────────┐   FetchEvent   ┌───────────────┐  claimed   ┌──────────────────────────┐
//!   │  devhost  │───────────────▶│ ServiceWorker │───────────▶│ Gateway                  │
//!   │  (axum)   │                │ origin+prefix │            │ body → override →        │
//!   └─────┬─────┘                └───────┬───────┘            │ redirect → log → dispatch│
//!         │  fallthrough                 │                    └────────────┬─────────────┘
//!         ▼                              │                                 │
//!   ┌───────────┐                        │◀──────── response ──────────────┘
//!   │ ServeDir  │                        │
//!   └───────────┘                        ▼
//!                                  HTTP response
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use worker_gateway::config::{load_config, GatewayConfig};
use worker_gateway::devhost::{self, LocalHost};
use worker_gateway::observability;
use worker_gateway::pipeline::Gateway;
use worker_gateway::worker::ServiceWorker;
use worker_gateway::demo;

#[derive(Parser)]
#[command(name = "gateway-devhost")]
#[command(about = "Serve the demo API through the in-process gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    observability::logging::init(&config.observability);
    tracing::info!("gateway-devhost v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        origin = %config.worker.origin,
        api_prefix = %config.worker.api_prefix,
        assets_dir = %config.devhost.assets_dir.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = Arc::new(demo::registry(Arc::new(demo::TodoStore::new()))?);
    let gateway = Arc::new(Gateway::standard(registry, &config));
    tracing::info!(stages = ?gateway.stage_names(), "Gateway ready");

    let worker = Arc::new(ServiceWorker::new(gateway, &config.worker, Arc::new(LocalHost)));
    worker.install().await;
    worker.activate().await;

    let app = devhost::router(
        worker,
        config.worker.origin.clone(),
        &config.devhost.assets_dir,
        config.limits.max_body_bytes,
    );

    let listener = TcpListener::bind(&config.devhost.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(devhost::shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
