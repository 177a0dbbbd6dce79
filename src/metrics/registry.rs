//! In-memory metrics registry.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::metrics::key::MetricKey;
use crate::metrics::snapshot::{CounterSnapshot, GaugeSnapshot, MetricsSnapshot, SeriesSummary};
use crate::metrics::unix_timestamp;

/// A single recorded value. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct MetricPoint {
    pub timestamp: f64,
    pub value: f64,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct GaugeCell {
    value: f64,
    updated_at: f64,
}

#[derive(Default)]
struct RegistryInner {
    series: HashMap<String, VecDeque<MetricPoint>>,
    counters: HashMap<MetricKey, u64>,
    gauges: HashMap<MetricKey, GaugeCell>,
    histograms: HashMap<String, VecDeque<MetricPoint>>,
}

/// Registry for counters, gauges and bounded raw-value series.
///
/// All operations lock the same mutex, so every call is atomic with respect
/// to every other call, including `snapshot()`.
pub struct MetricsRegistry {
    inner: Mutex<RegistryInner>,
    /// Maximum points retained per series; oldest evicted first.
    series_capacity: usize,
}

impl MetricsRegistry {
    pub fn new(series_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            series_capacity: series_capacity.max(1),
        }
    }

    /// A poisoned lock still holds a usable registry; recording must not
    /// panic just because another thread did.
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a raw point to the named series.
    pub fn record_metric(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let point = Self::point(value, labels);
        let mut inner = self.lock();
        let buf = inner.series.entry(name.to_string()).or_default();
        push_bounded(buf, point, self.series_capacity);
    }

    /// Atomically add `delta` to a counter. Counters never decrease.
    pub fn increment_counter(&self, name: &str, delta: u64, labels: &[(&str, &str)]) {
        let key = MetricKey::new(name, labels);
        let mut inner = self.lock();
        *inner.counters.entry(key).or_insert(0) += delta;
    }

    /// Overwrite a gauge. Last write wins.
    pub fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = MetricKey::new(name, labels);
        let cell = GaugeCell {
            value,
            updated_at: unix_timestamp(),
        };
        let mut inner = self.lock();
        inner.gauges.insert(key, cell);
    }

    /// Append a raw point to the named histogram series.
    pub fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let point = Self::point(value, labels);
        let mut inner = self.lock();
        let buf = inner.histograms.entry(name.to_string()).or_default();
        push_bounded(buf, point, self.series_capacity);
    }

    /// Current value of a counter, 0 if it was never incremented.
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = MetricKey::new(name, labels);
        let inner = self.lock();
        inner.counters.get(&key).copied().unwrap_or(0)
    }

    /// Point-in-time summary of everything tracked.
    ///
    /// Summaries are computed by scanning the buffers under the same lock
    /// acquisition, so the result is internally consistent. O(points).
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.lock();

        let series = inner
            .series
            .iter()
            .filter_map(|(name, points)| {
                SeriesSummary::from_points(points).map(|s| (name.clone(), s))
            })
            .collect();

        let histograms = inner
            .histograms
            .iter()
            .filter_map(|(name, points)| {
                SeriesSummary::from_points(points).map(|s| (name.clone(), s))
            })
            .collect();

        let mut counters: Vec<CounterSnapshot> = inner
            .counters
            .iter()
            .map(|(key, value)| CounterSnapshot {
                key: key.clone(),
                value: *value,
            })
            .collect();
        counters.sort_by(|a, b| a.key.cmp_for_output(&b.key));

        let mut gauges: Vec<GaugeSnapshot> = inner
            .gauges
            .iter()
            .map(|(key, cell)| GaugeSnapshot {
                key: key.clone(),
                value: cell.value,
                updated_at: cell.updated_at,
            })
            .collect();
        gauges.sort_by(|a, b| a.key.cmp_for_output(&b.key));

        MetricsSnapshot {
            series,
            counters,
            gauges,
            histograms,
        }
    }

    fn point(value: f64, labels: &[(&str, &str)]) -> MetricPoint {
        MetricPoint {
            timestamp: unix_timestamp(),
            value,
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

fn push_bounded(buf: &mut VecDeque<MetricPoint>, point: MetricPoint, cap: usize) {
    while buf.len() >= cap {
        buf.pop_front();
    }
    buf.push_back(point);
}

impl MetricKey {
    /// Deterministic ordering for snapshot output.
    fn cmp_for_output(&self, other: &MetricKey) -> std::cmp::Ordering {
        (&self.name, &self.labels).cmp(&(&other.name, &other.labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_sums_deltas_per_key() {
        let registry = MetricsRegistry::new(100);
        for _ in 0..5 {
            registry.increment_counter("query_total", 1, &[("type", "dish")]);
        }
        registry.increment_counter("query_total", 3, &[("type", "dish")]);
        registry.increment_counter("query_total", 1, &[("type", "restaurant")]);

        assert_eq!(registry.counter_value("query_total", &[("type", "dish")]), 8);
        assert_eq!(
            registry.counter_value("query_total", &[("type", "restaurant")]),
            1
        );
        assert_eq!(registry.counter_value("query_total", &[]), 0);
    }

    #[test]
    fn gauge_is_last_write_wins() {
        let registry = MetricsRegistry::new(100);
        registry.set_gauge("memory_usage", 0.5, &[]);
        registry.set_gauge("memory_usage", 0.9, &[]);

        let snap = registry.snapshot();
        let gauge = snap
            .gauges
            .iter()
            .find(|g| g.key.name == "memory_usage")
            .unwrap();
        assert_eq!(gauge.value, 0.9);
    }

    #[test]
    fn series_evicts_oldest_beyond_capacity() {
        let registry = MetricsRegistry::new(10);
        for i in 0..25 {
            registry.record_metric("latency", i as f64, &[]);
        }

        let snap = registry.snapshot();
        let summary = &snap.series["latency"];
        assert_eq!(summary.count, 10);
        // The 10 most recent values are 15..=24.
        assert_eq!(summary.min, 15.0);
        assert_eq!(summary.max, 24.0);
        assert_eq!(summary.latest, 24.0);
    }

    #[test]
    fn snapshot_summarizes_series() {
        let registry = MetricsRegistry::new(100);
        for v in [1.0, 2.0, 3.0, 4.0] {
            registry.record_histogram("query_response_time", v, &[("query_type", "dish")]);
        }

        let snap = registry.snapshot();
        let summary = &snap.histograms["query_response_time"];
        assert_eq!(summary.count, 4);
        assert_eq!(summary.sum, 10.0);
        assert_eq!(summary.avg, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.latest, 4.0);
        assert!(summary.latest_timestamp > 0.0);
    }

    #[test]
    fn empty_label_slice_is_a_distinct_key() {
        let registry = MetricsRegistry::new(100);
        registry.increment_counter("hits", 2, &[]);
        registry.increment_counter("hits", 5, &[("region", "manhattan")]);
        assert_eq!(registry.counter_value("hits", &[]), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        use std::sync::Arc;
        let registry = Arc::new(MetricsRegistry::new(100));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let r = registry.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    r.increment_counter("query_total", 1, &[("type", "dish")]);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(
            registry.counter_value("query_total", &[("type", "dish")]),
            8000
        );
    }
}
