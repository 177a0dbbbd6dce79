//! The `Monitor` orchestrator.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::alerts::{Alert, AlertEngine, AlertOperator, AlertRule, Severity};
use crate::config::MonitorConfig;
use crate::logging::{LogEntry, LogLevel, StructuredLogger};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::monitor::MonitorError;
use crate::trace::{Span, SpanGuard, TraceEngine};

/// Metric names the recording helpers can produce. Rules referencing
/// anything else are accepted but flagged at registration, since a rule
/// over a never-recorded metric silently never fires.
const PRODUCED_METRICS: &[&str] = &[
    "query_response_time",
    "query_result_count",
    "query_total",
    "query_success",
    "query_failure",
    "error_rate",
    "vector_search_latency",
    "vector_search_results",
    "vector_search_total",
    "vector_search_cache_hit",
    "vector_search_cache_miss",
    "cache_hit_rate",
    "memory_usage",
    "cpu_usage",
    "active_connections",
    "recommendations_generated",
    "user_satisfaction",
];

/// Running counters for the statistics block of the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub metrics_recorded: u64,
    pub traces_created: u64,
    pub alerts_triggered: u64,
}

/// The consolidated document served to operators and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringData {
    pub metrics: MetricsSnapshot,
    pub active_alerts: Vec<Alert>,
    pub alert_history: Vec<Alert>,
    pub recent_logs: Vec<LogEntry>,
    pub active_spans: Vec<Span>,
    pub statistics: Statistics,
    pub uptime_secs: f64,
}

/// Facade composing the metrics registry, trace engine, structured logger
/// and alert engine behind domain-shaped entry points.
///
/// Constructed once at process start and injected into collaborators as
/// `Arc<Monitor>`; there is no process-wide singleton.
pub struct Monitor {
    metrics: MetricsRegistry,
    traces: TraceEngine,
    logger: StructuredLogger,
    alerts: AlertEngine,
    evaluation_interval: Duration,
    metrics_recorded: AtomicU64,
    traces_created: AtomicU64,
    /// Active alert count as of the last evaluation pass.
    alerts_triggered: AtomicU64,
    started_at: Instant,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let monitor = Self {
            metrics: MetricsRegistry::new(config.metrics.series_capacity),
            traces: TraceEngine::new(config.tracing.max_traces),
            logger: StructuredLogger::new(config.logging.buffer_capacity),
            alerts: AlertEngine::new(config.alerts.history_capacity),
            evaluation_interval: Duration::from_secs(config.alerts.evaluation_interval_secs),
            metrics_recorded: AtomicU64::new(0),
            traces_created: AtomicU64::new(0),
            alerts_triggered: AtomicU64::new(0),
            started_at: Instant::now(),
        };

        if config.alerts.default_rules {
            for rule in default_rules() {
                monitor.register_rule(rule);
            }
        }
        for rule in config.alerts.rules {
            monitor.register_rule(rule);
        }

        monitor
    }

    /// Add an alert rule, surfacing the silent-configuration defect of a
    /// rule over a metric this facade never records.
    pub fn register_rule(&self, rule: AlertRule) {
        if !PRODUCED_METRICS.contains(&rule.metric.as_str()) {
            tracing::warn!(
                rule = %rule.name,
                metric = %rule.metric,
                "Alert rule references a metric not produced by the recording helpers; \
                 it will only fire if a collaborator records it directly"
            );
        }
        self.alerts.add_rule(rule);
    }

    /// Record one query: latency, outcome counters and the derived
    /// `error_rate` gauge.
    ///
    /// The gauge is computed from a read of two counters after the
    /// increments, outside their critical section; concurrent recorders can
    /// leave it briefly stale, which is accepted for a dashboard value.
    pub fn record_query_metrics(
        &self,
        query_type: &str,
        response_time: f64,
        success: bool,
        result_count: u64,
    ) {
        let labels: &[(&str, &str)] = &[("query_type", query_type)];

        self.metrics
            .record_histogram("query_response_time", response_time, labels);
        self.metrics.increment_counter("query_total", 1, labels);
        if success {
            self.metrics.increment_counter("query_success", 1, labels);
        } else {
            self.metrics.increment_counter("query_failure", 1, labels);
        }
        if result_count > 0 {
            self.metrics
                .record_histogram("query_result_count", result_count as f64, labels);
        }

        let total = self.metrics.counter_value("query_total", labels);
        let failed = self.metrics.counter_value("query_failure", labels);
        if total > 0 {
            self.metrics
                .set_gauge("error_rate", failed as f64 / total as f64, labels);
        }

        self.metrics_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one vector search: latency, result count, cache counters and
    /// the derived `cache_hit_rate` gauge (same staleness window as
    /// `error_rate`).
    pub fn record_vector_search_metrics(
        &self,
        search_type: &str,
        latency: f64,
        result_count: u64,
        cache_hit: bool,
    ) {
        let labels: &[(&str, &str)] = &[("search_type", search_type)];

        self.metrics
            .record_histogram("vector_search_latency", latency, labels);
        self.metrics
            .record_histogram("vector_search_results", result_count as f64, labels);
        self.metrics
            .increment_counter("vector_search_total", 1, labels);
        if cache_hit {
            self.metrics
                .increment_counter("vector_search_cache_hit", 1, labels);
        } else {
            self.metrics
                .increment_counter("vector_search_cache_miss", 1, labels);
        }

        let total = self.metrics.counter_value("vector_search_total", labels);
        let hits = self.metrics.counter_value("vector_search_cache_hit", labels);
        if total > 0 {
            self.metrics
                .set_gauge("cache_hit_rate", hits as f64 / total as f64, labels);
        }

        self.metrics_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record system-level gauges.
    pub fn record_system_metrics(
        &self,
        memory_usage: f64,
        cpu_usage: f64,
        active_connections: u64,
    ) {
        self.metrics.set_gauge("memory_usage", memory_usage, &[]);
        self.metrics.set_gauge("cpu_usage", cpu_usage, &[]);
        self.metrics
            .set_gauge("active_connections", active_connections as f64, &[]);
        self.metrics_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record business metrics.
    pub fn record_business_metrics(
        &self,
        recommendations_generated: u64,
        user_satisfaction: Option<f64>,
    ) {
        self.metrics
            .increment_counter("recommendations_generated", recommendations_generated, &[]);
        if let Some(score) = user_satisfaction {
            self.metrics.record_histogram("user_satisfaction", score, &[]);
        }
        self.metrics_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Begin a scoped span; archived when the guard drops.
    pub fn trace_operation(
        &self,
        operation_name: &str,
        trace_id: Option<Uuid>,
        parent_span_id: Option<Uuid>,
    ) -> SpanGuard {
        self.traces_created.fetch_add(1, Ordering::Relaxed);
        self.traces.begin_span(operation_name, trace_id, parent_span_id)
    }

    /// Passthrough to the structured logger.
    pub fn log_structured(
        &self,
        level: LogLevel,
        message: &str,
        correlation_id: Option<&str>,
        extra: Option<serde_json::Value>,
        trace_id: Option<Uuid>,
    ) {
        self.logger.log(level, message, correlation_id, extra, trace_id);
    }

    pub fn set_correlation_id(&self, task_id: &str, correlation_id: &str) {
        self.logger.set_correlation_id(task_id, correlation_id);
    }

    pub fn correlation_id(&self, task_id: &str) -> Option<String> {
        self.logger.correlation_id(task_id)
    }

    /// Direct access to the leaf components, for collaborators that need
    /// more than the domain helpers.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn traces(&self) -> &TraceEngine {
        &self.traces
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    /// One alert evaluation pass. Returns the active alert count so the
    /// loop can log it; errors are values here, never panics, so the loop
    /// stays restart-free.
    pub fn evaluation_tick(&self) -> Result<usize, MonitorError> {
        let snapshot = self.metrics.snapshot();
        self.alerts.evaluate_all(&snapshot);
        let active = self.alerts.active_alerts().len();
        self.alerts_triggered.store(active as u64, Ordering::Relaxed);
        Ok(active)
    }

    /// Long-lived evaluation loop. One bad tick is logged and the loop
    /// continues on the next interval; only the shutdown signal ends it.
    pub async fn run_evaluation_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.evaluation_interval.as_secs(),
            rules = self.alerts.rules().len(),
            "Alert evaluation loop starting"
        );

        let mut ticker = time::interval(self.evaluation_interval);
        // The first tick of a tokio interval fires immediately.
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.evaluation_tick() {
                        Ok(active) => {
                            tracing::debug!(active_alerts = active, "Alert evaluation pass complete");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Alert evaluation pass failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Alert evaluation loop received shutdown signal, exiting");
                    break;
                }
            }
        }
    }

    /// Assemble the consolidated monitoring document.
    pub fn monitoring_data(&self) -> MonitoringData {
        MonitoringData {
            metrics: self.metrics.snapshot(),
            active_alerts: self.alerts.active_alerts(),
            alert_history: self.alerts.alert_history(50),
            recent_logs: self.logger.recent_logs(100),
            active_spans: self.traces.active_spans(),
            statistics: Statistics {
                metrics_recorded: self.metrics_recorded.load(Ordering::Relaxed),
                traces_created: self.traces_created.load(Ordering::Relaxed),
                alerts_triggered: self.alerts_triggered.load(Ordering::Relaxed),
            },
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(
            "high_response_time",
            "query_response_time",
            2.0,
            AlertOperator::Gt,
            Severity::Warning,
            "Query response time is above 2 seconds",
        ),
        AlertRule::new(
            "high_error_rate",
            "error_rate",
            0.05,
            AlertOperator::Gt,
            Severity::Critical,
            "Error rate is above 5%",
        ),
        AlertRule::new(
            "low_cache_hit_rate",
            "cache_hit_rate",
            0.7,
            AlertOperator::Lt,
            Severity::Warning,
            "Cache hit rate is below 70%",
        ),
        AlertRule::new(
            "high_memory_usage",
            "memory_usage",
            0.8,
            AlertOperator::Gt,
            Severity::Warning,
            "Memory usage is above 80%",
        ),
    ]
}
