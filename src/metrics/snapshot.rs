//! Point-in-time metric summaries.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use crate::metrics::key::MetricKey;
use crate::metrics::registry::MetricPoint;

/// Summary of one bounded series, computed by scanning the current buffer.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub latest: f64,
    pub latest_timestamp: f64,
}

impl SeriesSummary {
    /// None for an empty buffer: empty series are omitted from snapshots.
    pub(crate) fn from_points(points: &VecDeque<MetricPoint>) -> Option<Self> {
        let latest = points.back()?;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in points {
            sum += p.value;
            min = min.min(p.value);
            max = max.max(p.value);
        }
        Some(Self {
            count: points.len(),
            sum,
            avg: sum / points.len() as f64,
            min,
            max,
            latest: latest.value,
            latest_timestamp: latest.timestamp,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterSnapshot {
    #[serde(flatten)]
    pub key: MetricKey,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeSnapshot {
    #[serde(flatten)]
    pub key: MetricKey,
    pub value: f64,
    pub updated_at: f64,
}

/// Everything the registry tracks, frozen at one lock acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub series: BTreeMap<String, SeriesSummary>,
    pub counters: Vec<CounterSnapshot>,
    pub gauges: Vec<GaugeSnapshot>,
    pub histograms: BTreeMap<String, SeriesSummary>,
}

impl MetricsSnapshot {
    /// Resolve a metric name to a current scalar for alert evaluation.
    ///
    /// Checked in order: named series latest, gauge value, histogram latest.
    /// A labeled gauge resolves by name to its most recently written
    /// instance, so a rule on `error_rate` sees the freshest
    /// `error_rate{query_type=...}` value.
    pub fn resolve(&self, metric: &str) -> Option<f64> {
        if let Some(summary) = self.series.get(metric) {
            return Some(summary.latest);
        }
        if let Some(value) = self.resolve_gauge(metric) {
            return Some(value);
        }
        self.histograms.get(metric).map(|s| s.latest)
    }

    fn resolve_gauge(&self, name: &str) -> Option<f64> {
        self.gauges
            .iter()
            .filter(|g| g.key.name == name)
            .max_by(|a, b| a.updated_at.total_cmp(&b.updated_at))
            .map(|g| g.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::metrics::MetricsRegistry;

    #[test]
    fn resolve_prefers_series_then_gauge_then_histogram() {
        let registry = MetricsRegistry::new(100);
        registry.record_metric("shared", 1.0, &[]);
        registry.set_gauge("shared", 2.0, &[]);
        registry.record_histogram("shared", 3.0, &[]);
        registry.set_gauge("gauge_only", 7.0, &[]);
        registry.record_histogram("hist_only", 9.0, &[]);

        let snap = registry.snapshot();
        assert_eq!(snap.resolve("shared"), Some(1.0));
        assert_eq!(snap.resolve("gauge_only"), Some(7.0));
        assert_eq!(snap.resolve("hist_only"), Some(9.0));
        assert_eq!(snap.resolve("never_recorded"), None);
    }

    #[test]
    fn labeled_gauge_resolves_to_most_recent_write() {
        let registry = MetricsRegistry::new(100);
        registry.set_gauge("error_rate", 0.5, &[("query_type", "dish")]);
        std::thread::sleep(std::time::Duration::from_millis(2));
        registry.set_gauge("error_rate", 0.2, &[("query_type", "restaurant")]);

        let snap = registry.snapshot();
        assert_eq!(snap.resolve("error_rate"), Some(0.2));
    }
}
