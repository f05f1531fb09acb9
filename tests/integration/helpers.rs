//! Test helpers shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use watchdog::{
    LogEvent, MetricSample, Severity,
    actors::Pipeline,
    alerts::{AlertManager, LogAlert, Notifier, dedup::AlertDeduplicator},
    sources::{EventSource, MetricSource, RawLogEvent},
    storage::{EventStore, MetricWindow},
};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

pub fn raw_event(id: u64, level: &str) -> RawLogEvent {
    RawLogEvent {
        id,
        timestamp: base_time() + Duration::seconds(id as i64),
        level: level.to_string(),
        message: format!("test event {id}"),
        source_log: "System".to_string(),
    }
}

pub fn log_event(id: u64, severity: Severity) -> LogEvent {
    LogEvent {
        id,
        timestamp: base_time() + Duration::seconds(id as i64),
        severity,
        message: format!("test event {id}"),
        source_log: "Application".to_string(),
    }
}

/// Event source whose batch can be swapped between polls
#[derive(Default)]
pub struct ScriptedEvents {
    batch: Mutex<Vec<RawLogEvent>>,
    fail: Mutex<bool>,
}

impl ScriptedEvents {
    pub fn with_batch(batch: Vec<RawLogEvent>) -> Self {
        let source = Self::default();
        source.set_batch(batch);
        source
    }

    pub fn set_batch(&self, batch: Vec<RawLogEvent>) {
        *self.batch.lock().unwrap() = batch;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl EventSource for ScriptedEvents {
    async fn fetch(&self) -> anyhow::Result<Vec<RawLogEvent>> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("event log query failed");
        }
        Ok(self.batch.lock().unwrap().clone())
    }
}

/// Metric source returning a fixed utilization, or failing
pub struct StaticMetrics {
    pub value: Option<f64>,
}

#[async_trait]
impl MetricSource for StaticMetrics {
    async fn sample(&self) -> anyhow::Result<MetricSample> {
        match self.value {
            Some(value) => Ok(MetricSample::new(Utc::now(), value, value, value)),
            None => anyhow::bail!("sensors unavailable"),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<u64>>,
}

impl RecordingNotifier {
    pub fn alerted_ids(&self) -> Vec<u64> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()> {
        self.alerts.lock().unwrap().push(alert.event.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn notify(&self, _alert: &LogAlert) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("channel unreachable")
    }
}

pub fn create_pipeline(
    event_source: Arc<dyn EventSource>,
    metric_value: Option<f64>,
    alerts: AlertManager,
) -> Pipeline {
    Pipeline {
        event_source,
        metric_source: Arc::new(StaticMetrics {
            value: metric_value,
        }),
        deduplicator: Arc::new(AlertDeduplicator::new()),
        alerts: Arc::new(alerts),
        events: Arc::new(EventStore::new()),
        metrics: Arc::new(MetricWindow::default()),
    }
}
