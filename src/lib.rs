//! In-process observability core for the SweetPick recommendation service.

pub mod alerts;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod trace;

pub use config::MonitorConfig;
pub use lifecycle::Shutdown;
pub use monitor::{Monitor, MonitorError, MonitoringData};
