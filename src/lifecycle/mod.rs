//! Startup and shutdown coordination.
//!
//! The monitor owns one long-running task (the alert evaluation loop) and,
//! optionally, the operator HTTP server. Both subscribe to the same
//! broadcast channel and exit when it fires, which gives the process a
//! defined teardown instead of tasks dying with the runtime.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown of the monitor's background tasks.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until Ctrl+C, then trigger shutdown.
pub async fn shutdown_on_ctrl_c(shutdown: &Shutdown) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler, shutting down immediately");
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
