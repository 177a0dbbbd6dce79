//! Configuration validation.
//!
//! Semantic checks over an already-parsed config. All violations are
//! collected and returned together, so an operator fixes one round of
//! errors instead of replaying them one at a time.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::MonitorConfig;

/// One semantic violation in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ZeroCapacity(&'static str),
    ZeroInterval,
    InvalidBindAddress(String),
    EmptyRuleField { rule: String, field: &'static str },
    NonFiniteThreshold(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroCapacity(what) => {
                write!(f, "{} capacity must be at least 1", what)
            }
            ValidationError::ZeroInterval => {
                write!(f, "alert evaluation interval must be at least 1 second")
            }
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid operator bind address: {}", addr)
            }
            ValidationError::EmptyRuleField { rule, field } => {
                write!(f, "alert rule '{}' has an empty {}", rule, field)
            }
            ValidationError::NonFiniteThreshold(rule) => {
                write!(f, "alert rule '{}' has a non-finite threshold", rule)
            }
        }
    }
}

/// Pure function: config in, complete error list out.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.metrics.series_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity("metrics series"));
    }
    if config.tracing.max_traces == 0 {
        errors.push(ValidationError::ZeroCapacity("trace"));
    }
    if config.logging.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity("log buffer"));
    }
    if config.alerts.history_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity("alert history"));
    }
    if config.alerts.evaluation_interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    if config.operator.enabled && config.operator.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.operator.bind_address.clone(),
        ));
    }

    for rule in &config.alerts.rules {
        let rule_name = if rule.name.is_empty() {
            "<unnamed>".to_string()
        } else {
            rule.name.clone()
        };
        if rule.name.is_empty() {
            errors.push(ValidationError::EmptyRuleField {
                rule: rule_name.clone(),
                field: "name",
            });
        }
        if rule.metric.is_empty() {
            errors.push(ValidationError::EmptyRuleField {
                rule: rule_name.clone(),
                field: "metric",
            });
        }
        if !rule.threshold.is_finite() {
            errors.push(ValidationError::NonFiniteThreshold(rule_name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
