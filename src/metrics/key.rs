//! Composite metric keys.
//!
//! Counters and gauges are keyed by name plus a sorted label map. Keeping the
//! labels structured (rather than concatenated into the name) means label
//! values containing `=`, `,` or `{` can never collide with another key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a labeled metric: name plus sorted label set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub name: String,
    /// BTreeMap keeps labels sorted, so equal label sets always hash equal.
    pub labels: BTreeMap<String, String>,
}

impl MetricKey {
    pub fn new(name: &str, labels: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Whether this key carries no labels.
    pub fn is_unlabeled(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for MetricKey {
    /// Prometheus-style `name{k="v",...}` rendering, for logs and dashboards
    /// only. Never used as a lookup key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, "{}", self.name);
        }
        write!(f, "{}{{", self.name)?;
        for (i, (k, v)) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}=\"{}\"", k, v)?;
        }
        write!(f, "}}")
    }
}
