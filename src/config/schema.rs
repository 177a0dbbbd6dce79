//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files,
//! with defaults matching the values the recommendation service ran with.

use serde::{Deserialize, Serialize};

use crate::alerts::rule::AlertRule;

/// Root configuration for the monitoring core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Metrics registry settings.
    pub metrics: MetricsConfig,

    /// Trace engine settings.
    pub tracing: TracingConfig,

    /// Structured logger settings.
    pub logging: LoggingConfig,

    /// Alert engine and evaluation loop settings.
    pub alerts: AlertsConfig,

    /// Operator HTTP endpoint settings.
    pub operator: OperatorConfig,
}

/// Metrics registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Points retained per series/histogram before oldest-first eviction.
    pub series_capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            series_capacity: 1000,
        }
    }
}

/// Trace engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Completed traces retained before oldest-first eviction.
    pub max_traces: usize,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self { max_traces: 500 }
    }
}

/// Structured logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Entries retained in the log ring buffer.
    pub buffer_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 10_000,
        }
    }
}

/// Alert engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Seconds between evaluation passes of the background loop.
    pub evaluation_interval_secs: u64,

    /// Alerts retained in history before oldest-first eviction.
    pub history_capacity: usize,

    /// Register the built-in rule set (response time, error rate,
    /// cache hit rate, memory usage) at startup.
    pub default_rules: bool,

    /// Additional rules supplied by the operator.
    pub rules: Vec<AlertRule>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_secs: 60,
            history_capacity: 1000,
            default_rules: true,
            rules: Vec::new(),
        }
    }
}

/// Operator HTTP endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Enable the read-only operator endpoint.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:9464").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:9464".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = MonitorConfig::default();
        assert_eq!(config.metrics.series_capacity, 1000);
        assert_eq!(config.alerts.evaluation_interval_secs, 60);
        assert!(config.alerts.default_rules);
        assert!(!config.operator.enabled);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [metrics]
            series_capacity = 50

            [[alerts.rules]]
            name = "slow_vector_search"
            metric = "vector_search_latency"
            threshold = 1.5
            operator = "gt"
            severity = "warning"
            message = "Vector search latency is above 1.5 seconds"
            "#,
        )
        .unwrap();

        assert_eq!(config.metrics.series_capacity, 50);
        assert_eq!(config.logging.buffer_capacity, 10_000);
        assert_eq!(config.alerts.rules.len(), 1);
        assert_eq!(config.alerts.rules[0].metric, "vector_search_latency");
    }
}
