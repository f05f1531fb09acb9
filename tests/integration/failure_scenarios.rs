//! Failure scenarios: unavailable sources and failing alert channels

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use watchdog::{
    MetricSample, Severity,
    actors::CollectorHandle,
    alerts::{AlertManager, DispatchReport, LogAlert},
    config::{AlertChannel, Webhook},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

const INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_event_source_failure_does_not_abort_tick() {
    let source = Arc::new(ScriptedEvents::with_batch(vec![raw_event(1, "Critical")]));
    source.set_failing(true);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = create_pipeline(
        source.clone(),
        Some(20.0),
        AlertManager::new().with_channel(notifier.clone()),
    );
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);

    let report = handle.poll_now().await.unwrap();
    assert_eq!(report.fetched, 0);
    assert!(report.sample_recorded);
    assert!(pipeline.events.is_empty().await);
    assert!(notifier.alerted_ids().is_empty());

    // recovers on the next poll
    source.set_failing(false);
    let report = handle.poll_now().await.unwrap();
    assert_eq!(report.ingested, 1);
    assert_eq!(report.alerted, 1);
    assert_eq!(notifier.alerted_ids(), vec![1]);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_metric_source_failure_leaves_window_empty() {
    let source = Arc::new(ScriptedEvents::with_batch(vec![raw_event(2, "Warning")]));
    let pipeline = create_pipeline(source, None, AlertManager::new());
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);

    let report = handle.poll_now().await.unwrap();

    assert!(!report.sample_recorded);
    assert_eq!(pipeline.metrics.latest().await, MetricSample::default());
    assert_eq!(
        pipeline.metrics.average_over(Duration::from_secs(600)).await,
        MetricSample::default()
    );
    assert_eq!(pipeline.events.len().await, 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failing_channel_does_not_block_other_channels() {
    let failing = Arc::new(FailingNotifier::default());
    let recording = Arc::new(RecordingNotifier::default());
    let manager = AlertManager::new()
        .with_channel(failing.clone())
        .with_channel(recording.clone());

    let report = manager
        .dispatch(&LogAlert::new(log_event(3, Severity::Error)))
        .await;

    assert_eq!(
        report,
        DispatchReport {
            delivered: 1,
            failed: 1,
        }
    );
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(recording.alerted_ids(), vec![3]);
}

#[tokio::test]
async fn test_failing_channel_does_not_cause_realert() {
    let failing = Arc::new(FailingNotifier::default());
    let source = Arc::new(ScriptedEvents::with_batch(vec![
        raw_event(4, "Error"),
        raw_event(5, "Critical"),
    ]));
    let pipeline = create_pipeline(
        source,
        Some(10.0),
        AlertManager::new().with_channel(failing.clone()),
    );
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);

    handle.poll_now().await.unwrap();
    handle.poll_now().await.unwrap();

    assert_eq!(failing.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.events.len().await, 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_webhook_is_reported_as_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let recording = Arc::new(RecordingNotifier::default());
    let manager = AlertManager::from_config(&[AlertChannel::Webhook(Webhook {
        url: format!("{}/hook", mock_server.uri()),
    })])
    .unwrap()
    .with_channel(recording.clone());

    let report = manager
        .dispatch(&LogAlert::new(log_event(6, Severity::Critical)))
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(recording.alerted_ids(), vec![6]);
}
