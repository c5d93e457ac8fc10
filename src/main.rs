//! Request telemetry demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────────┐
//!                │                  REQUEST TELEMETRY                    │
//!   Request      │  ┌────────────┐    ┌──────────┐                      │
//!   ─────────────┼─▶│ middleware │───▶│ handlers │                      │
//!                │  └─────┬──────┘    └──────────┘                      │
//!                │        │ Observation                                 │
//!                │        ▼                                             │
//!                │  ┌────────────┐ try_send ┌────────────┐   flush      │
//!                │  │  request   │─────────▶│ aggregator │─────────┐    │
//!                │  │  logger    │  queue   │   task     │         │    │
//!                │  └─────┬──────┘          └────────────┘         ▼    │
//!                │        │ aggregation disabled             ┌─────────┐│
//!                │        └─────────────────────────────────▶│LogSink  ││
//!                │                                           └─────────┘│
//!                └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use request_telemetry::config::{load_config, TelemetryConfig};
use request_telemetry::lifecycle::{self, signals, Shutdown};
use request_telemetry::observability::{logging, metrics};
use request_telemetry::{HttpServer, RequestLogger};

#[derive(Parser)]
#[command(name = "request-telemetry")]
#[command(about = "HTTP server with aggregated request logging", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TelemetryConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("request-telemetry v0.1.0 starting");

    tracing::info!(
        bind_address = %config.server.bind_address,
        aggregation = config.aggregation.enabled,
        interval_ms = config.aggregation.interval_ms,
        queue_size = config.aggregation.queue_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    // Cancelled only after the server has drained
    let aggregator_cancel = CancellationToken::new();
    let (logger, aggregator) = RequestLogger::builder(config.clone()).start(aggregator_cancel.clone());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(&config.server, logger);
    let served = server.run(listener, shutdown.subscribe()).await;
    lifecycle::finish_after_serve(served, &aggregator_cancel, aggregator).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
