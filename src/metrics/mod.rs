//! Metrics collection subsystem.
//!
//! # Data Flow
//! ```text
//! Recording helpers (monitor facade):
//!     → counters  (monotonic, keyed by name + sorted labels)
//!     → gauges    (last-write-wins, keyed by name + sorted labels)
//!     → series    (bounded ring of raw points, keyed by name)
//!
//! Readers:
//!     → snapshot() — count/sum/avg/min/max/latest per series,
//!       computed under the same lock acquisition as writes
//! ```
//!
//! # Design Decisions
//! - One mutex serializes the whole registry; critical sections are
//!   synchronous and never held across an await
//! - Recording never fails: a poisoned lock is recovered, not propagated
//! - Ring-buffer eviction is the only backpressure; writers are never blocked

pub mod key;
pub mod registry;
pub mod snapshot;

pub use key::MetricKey;
pub use registry::{MetricPoint, MetricsRegistry};
pub use snapshot::{MetricsSnapshot, SeriesSummary};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as fractional seconds since the epoch.
pub(crate) fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
