//! Operator HTTP server setup.

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::OperatorConfig;
use crate::http::handlers;
use crate::monitor::Monitor;

/// Read-only HTTP server for operators and dashboards.
pub struct OperatorServer {
    router: Router,
}

impl OperatorServer {
    pub fn new(monitor: Arc<Monitor>, config: &OperatorConfig) -> Self {
        let router = Router::new()
            .route("/status", get(handlers::get_status))
            .route("/monitoring", get(handlers::get_monitoring))
            .route("/monitoring/metrics", get(handlers::get_metrics))
            .route("/monitoring/alerts", get(handlers::get_alerts))
            .route("/monitoring/logs", get(handlers::get_logs))
            .with_state(monitor)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Operator endpoint starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Operator endpoint stopped");
        Ok(())
    }
}
