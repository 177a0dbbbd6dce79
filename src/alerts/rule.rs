//! Declarative alert rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied as `operator(current_value, threshold)`.
///
/// The closed enum replaces the stringly-typed operator field the design
/// inherited: an unknown operator is now unrepresentable instead of
/// silently evaluating false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertOperator {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
}

impl AlertOperator {
    pub fn evaluate(self, value: f64, threshold: f64) -> bool {
        match self {
            AlertOperator::Gt => value > threshold,
            AlertOperator::Lt => value < threshold,
            AlertOperator::Eq => value == threshold,
            AlertOperator::Gte => value >= threshold,
            AlertOperator::Lte => value <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// A threshold condition over one metric. Read-only during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub name: String,
    /// Metric name, resolved against the snapshot at evaluation time.
    pub metric: String,
    pub threshold: f64,
    pub operator: AlertOperator,
    /// Seconds a breach must hold before the alert fires. Zero fires on
    /// the first breaching evaluation.
    #[serde(default)]
    pub sustain_secs: u64,
    pub severity: Severity,
    pub message: String,
}

impl AlertRule {
    pub fn new(
        name: &str,
        metric: &str,
        threshold: f64,
        operator: AlertOperator,
        severity: Severity,
        message: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            metric: metric.to_string(),
            threshold,
            operator,
            sustain_secs: 0,
            severity,
            message: message.to_string(),
        }
    }

    pub fn with_sustain(mut self, sustain_secs: u64) -> Self {
        self.sustain_secs = sustain_secs;
        self
    }
}
