//! Integration tests for API endpoints
//!
//! Each test starts a server on a random port over freshly populated stores
//! and talks to it with reqwest.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use watchdog::{
    LogEvent, MetricSample, Severity,
    api::{ApiState, HealthResponse, spawn_api_server},
    config::ApiConfig,
    storage::{EventStore, MetricWindow},
};

use crate::helpers::*;

struct TestApi {
    addr: SocketAddr,
    events: Arc<EventStore>,
    client: reqwest::Client,
}

impl TestApi {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }
}

async fn spawn_test_api() -> TestApi {
    let events = Arc::new(EventStore::new());
    events
        .ingest(vec![
            log_event(1, Severity::Error),
            log_event(2, Severity::Information),
            log_event(3, Severity::Error),
            log_event(4, Severity::Critical),
        ])
        .await;

    let metrics = Arc::new(MetricWindow::default());
    let now = Utc::now();
    for (minutes_ago, value) in [(8, 10.0), (4, 20.0), (1, 30.0)] {
        metrics
            .record(
                MetricSample::new(now - Duration::minutes(minutes_ago), value, value, value)
                    .with_temperature(40.0 + value),
            )
            .await;
    }

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: true,
    };
    let addr = spawn_api_server(config, ApiState::new(events.clone(), metrics))
        .await
        .unwrap();

    TestApi {
        addr,
        events,
        client: reqwest::Client::new(),
    }
}

fn ids(events: &[LogEvent]) -> Vec<u64> {
    events.iter().map(|e| e.id).collect()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let api = spawn_test_api().await;

    let response = api.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = response.json().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_logs_endpoints() {
    let api = spawn_test_api().await;

    let all: Vec<LogEvent> = api.get("/logs").await.json().await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3, 4]);

    let response = api.get("/logs/id/3").await;
    assert_eq!(response.status(), StatusCode::OK);
    let event: LogEvent = response.json().await.unwrap();
    assert_eq!(event.severity, Severity::Error);

    let response = api.get("/logs/id/99").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("99"));

    let response = api.get("/logs/id/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logs_by_type_is_case_insensitive() {
    let api = spawn_test_api().await;

    for log_type in ["error", "Error", "ERROR"] {
        let errors: Vec<LogEvent> = api
            .get(&format!("/logs/type/{log_type}"))
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(ids(&errors), vec![1, 3]);
    }

    let warnings: Vec<LogEvent> = api.get("/logs/type/warning").await.json().await.unwrap();
    assert!(warnings.is_empty());

    let response = api.get("/logs/type/bogus").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pin_lifecycle() {
    let api = spawn_test_api().await;

    let response = api.client.post(api.url("/stored/id/2")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = api.client.post(api.url("/stored/id/77")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = api
        .client
        .post(api.url("/stored/type/error"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "pinned": 2 }));

    let stored: Vec<LogEvent> = api.get("/stored").await.json().await.unwrap();
    assert_eq!(stored.len(), 3);

    let response = api.get("/stored/id/2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = api.get("/stored/id/4").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let errors: Vec<LogEvent> = api.get("/stored/type/ERROR").await.json().await.unwrap();
    assert_eq!(ids(&errors), vec![1, 3]);

    let body: Value = api
        .client
        .delete(api.url("/stored/type/Error"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "removed": 2 }));

    let response = api.client.delete(api.url("/stored/id/2")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = api.client.delete(api.url("/stored/id/2")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored: Vec<LogEvent> = api.get("/stored").await.json().await.unwrap();
    assert!(stored.is_empty());

    // history is untouched by unpinning
    assert_eq!(api.events.len().await, 4);
}

#[tokio::test]
async fn test_latest_metric_endpoints() {
    let api = spawn_test_api().await;

    let cpu: Value = api.get("/metrics/cpu").await.json().await.unwrap();
    assert_eq!(cpu, json!({ "cpu_usage": 30.0 }));

    let ram: Value = api.get("/metrics/ram").await.json().await.unwrap();
    assert_eq!(ram, json!({ "ram_usage": 30.0 }));

    let disk: Value = api.get("/metrics/disk").await.json().await.unwrap();
    assert_eq!(disk, json!({ "disk_usage": 30.0 }));

    let temperature: Value = api.get("/metrics/temperature").await.json().await.unwrap();
    assert_eq!(temperature, json!({ "temperature": 70.0 }));

    let current: MetricSample = api.get("/metrics/current").await.json().await.unwrap();
    assert_eq!(current.cpu_percent, 30.0);
}

#[tokio::test]
async fn test_average_endpoint() {
    let api = spawn_test_api().await;

    let average: MetricSample = api.get("/metrics/average/10").await.json().await.unwrap();
    assert_eq!(average.cpu_percent, 20.0);
    assert_eq!(average.temperature_celsius, Some(60.0));

    let average: MetricSample = api.get("/metrics/average/5").await.json().await.unwrap();
    assert_eq!(average.disk_percent, 25.0);

    let response = api.get("/metrics/average/soon").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let api = spawn_test_api().await;

    let response = api
        .client
        .get(api.url("/logs"))
        .header("Origin", "http://dashboard.example")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
