//! Monitoring service harness.
//!
//! # Architecture Overview
//!
//! ```text
//!   Application collaborators                Operators / dashboards
//!   (query pipeline, vector search)          (CLI, scrapers)
//!            │                                        │
//!            ▼                                        ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │                     Monitor (facade)                    │
//!   │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────────┐  │
//!   │  │ metrics │ │  trace  │ │ logging  │ │    alerts    │  │
//!   │  │registry │ │ engine  │ │  buffer  │ │    engine    │  │
//!   │  └────┬────┘ └─────────┘ └──────────┘ └──────▲───────┘  │
//!   │       │    evaluation loop (60s tick)        │          │
//!   │       └────────────────────────────────────--┘          │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Recording flows one way into the leaf components; inspection flows one
//! way out through `monitoring_data()`. The evaluation loop is the only
//! task that reads across components.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweetpick_monitor::config::{load_config, MonitorConfig};
use sweetpick_monitor::http::OperatorServer;
use sweetpick_monitor::lifecycle::{self, Shutdown};
use sweetpick_monitor::Monitor;

#[derive(Parser)]
#[command(name = "sweetpick-monitor")]
#[command(about = "Observability core for the SweetPick recommendation service")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweetpick_monitor=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    tracing::info!(
        series_capacity = config.metrics.series_capacity,
        evaluation_interval_secs = config.alerts.evaluation_interval_secs,
        operator_enabled = config.operator.enabled,
        "Configuration loaded"
    );

    let operator_config = config.operator.clone();
    let monitor = Arc::new(Monitor::new(config));
    let shutdown = Shutdown::new();

    let loop_handle = tokio::spawn(
        monitor
            .clone()
            .run_evaluation_loop(shutdown.subscribe()),
    );

    let server_handle = if operator_config.enabled {
        let listener = TcpListener::bind(&operator_config.bind_address).await?;
        let server = OperatorServer::new(monitor.clone(), &operator_config);
        Some(tokio::spawn(server.run(listener, shutdown.subscribe())))
    } else {
        None
    };

    lifecycle::shutdown_on_ctrl_c(&shutdown).await;

    loop_handle.await?;
    if let Some(handle) = server_handle {
        handle.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
