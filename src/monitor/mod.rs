//! Monitoring facade.
//!
//! # Data Flow
//! ```text
//! Application code (query pipeline, vector search, system probes):
//!     → record_*_metrics / trace_operation / log_structured
//!         → MetricsRegistry / TraceEngine / StructuredLogger
//!
//! Background loop (one task, fixed interval):
//!     → MetricsRegistry.snapshot() → AlertEngine.evaluate_all()
//!
//! Operator / dashboard:
//!     → monitoring_data() — one consolidated document
//! ```

pub mod orchestrator;

pub use orchestrator::{Monitor, MonitoringData, Statistics};

use thiserror::Error;

/// Errors surfaced by the monitor's fallible paths. Recording and tracing
/// are deliberately infallible; this covers construction and the
/// evaluation loop's supervisor contract.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("alert evaluation failed: {0}")]
    Evaluation(String),
}
