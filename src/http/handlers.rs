//! Operator endpoint handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alerts::Alert;
use crate::logging::LogEntry;
use crate::metrics::MetricsSnapshot;
use crate::monitor::{Monitor, MonitoringData};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: f64,
    pub active_alerts: usize,
}

#[derive(Serialize)]
pub struct AlertsView {
    pub active: Vec<Alert>,
    pub history: Vec<Alert>,
}

#[derive(Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

pub async fn get_status(State(monitor): State<Arc<Monitor>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: monitor.uptime_secs(),
        active_alerts: monitor.alerts().active_alerts().len(),
    })
}

pub async fn get_monitoring(State(monitor): State<Arc<Monitor>>) -> Json<MonitoringData> {
    Json(monitor.monitoring_data())
}

pub async fn get_metrics(State(monitor): State<Arc<Monitor>>) -> Json<MetricsSnapshot> {
    Json(monitor.metrics().snapshot())
}

pub async fn get_alerts(
    State(monitor): State<Arc<Monitor>>,
    Query(params): Query<LimitParams>,
) -> Json<AlertsView> {
    let limit = params.limit.unwrap_or(50);
    Json(AlertsView {
        active: monitor.alerts().active_alerts(),
        history: monitor.alerts().alert_history(limit),
    })
}

pub async fn get_logs(
    State(monitor): State<Arc<Monitor>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<LogEntry>> {
    let limit = params.limit.unwrap_or(100);
    Json(monitor.logger().recent_logs(limit))
}
