//! Mock dashboard API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server (CORS, request id, timeout, trace)
//!                          │
//!                          ▼
//!                      mock::MockApi::dispatch
//!                          │
//!                          ▼
//!                      routing::RouteResolver ──▶ mock::handlers ──▶ MockDb
//!                          │
//!     Client Response      ▼
//!     ◀─────────────── { code, data, message }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use dashboard_api::config::{load_config, AppConfig};
use dashboard_api::observability::{init_logging, init_metrics};
use dashboard_api::{MockApi, MockDb, MockServer, Shutdown};

#[derive(Parser)]
#[command(name = "dashboard-api")]
#[command(about = "In-memory mock backend for the admin dashboard", long_about = None)]
struct Args {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("dashboard-api v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        base_path = %config.server.base_path,
        seed = config.mock.seed,
        delay_ms = config.mock.delay_ms,
        "Configuration loaded"
    );

    if !config.mock.enabled {
        tracing::warn!("Mock API disabled in configuration; nothing to serve");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let db = if config.mock.seed {
        MockDb::seeded()
    } else {
        MockDb::new()
    };
    let api = Arc::new(MockApi::new(Arc::new(db), &config.mock));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = MockServer::new(config, api);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
