//! Configuration for the monitoring core.
//!
//! # Responsibilities
//! - Serde schema with defaults for every section
//! - TOML loading from disk
//! - Semantic validation (all errors reported, not just the first)

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AlertsConfig, LoggingConfig, MetricsConfig, MonitorConfig, OperatorConfig, TracingConfig,
};
