//! Integration tests for the read-only operator endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use sweetpick_monitor::config::{MonitorConfig, OperatorConfig};
use sweetpick_monitor::http::OperatorServer;
use sweetpick_monitor::lifecycle::Shutdown;
use sweetpick_monitor::logging::LogLevel;
use sweetpick_monitor::Monitor;

async fn start_server(monitor: Arc<Monitor>) -> (String, Shutdown) {
    let config = OperatorConfig {
        enabled: true,
        bind_address: "127.0.0.1:0".to_string(),
        request_timeout_secs: 5,
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = OperatorServer::new(monitor, &config);
    tokio::spawn(server.run(listener, shutdown.subscribe()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{}", addr), shutdown)
}

#[tokio::test]
async fn monitoring_document_is_served_as_json() {
    let monitor = Arc::new(Monitor::new(MonitorConfig::default()));
    monitor.record_query_metrics("dish", 0.4, true, 9);
    monitor.record_query_metrics("dish", 0.6, false, 0);
    monitor.log_structured(LogLevel::Info, "query served", Some("req-1"), None, None);
    monitor.evaluation_tick().unwrap();

    let (base, shutdown) = start_server(monitor).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/monitoring", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["metrics"]["histograms"]["query_response_time"]["count"]
        .as_u64()
        .is_some());
    assert_eq!(body["recent_logs"].as_array().unwrap().len(), 1);
    // 50% errors breach the default high_error_rate rule.
    assert_eq!(body["active_alerts"].as_array().unwrap().len(), 1);
    assert!(body["uptime_secs"].as_f64().unwrap() >= 0.0);

    shutdown.trigger();
}

#[tokio::test]
async fn status_and_slice_routes_respond() {
    let monitor = Arc::new(Monitor::new(MonitorConfig::default()));
    monitor.record_system_metrics(0.5, 0.4, 3);

    let (base, shutdown) = start_server(monitor).await;
    let client = reqwest::Client::new();

    let status: Value = client
        .get(format!("{}/status", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "operational");

    let metrics: Value = client
        .get(format!("{}/monitoring/metrics", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let gauges = metrics["gauges"].as_array().unwrap();
    assert!(gauges.iter().any(|g| g["name"] == "memory_usage"));

    let alerts: Value = client
        .get(format!("{}/monitoring/alerts?limit=5", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(alerts["active"].as_array().unwrap().is_empty());

    let logs: Value = client
        .get(format!("{}/monitoring/logs", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(logs.as_array().unwrap().is_empty());

    shutdown.trigger();
}
