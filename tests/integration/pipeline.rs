//! End-to-end tests of the collection pipeline
//!
//! Fake sources feed the real collector actor, deduplicator, alert manager
//! and stores. Every collector polls once at startup, so the report returned
//! by the first `poll_now` describes the second poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use pretty_assertions::assert_eq;
use watchdog::{
    Severity,
    actors::{CollectorHandle, PollReport},
    alerts::AlertManager,
};

use crate::helpers::*;

const INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_repeated_polls_alert_once() {
    let source = Arc::new(ScriptedEvents::with_batch(vec![
        raw_event(1, "Error"),
        raw_event(2, "Information"),
        raw_event(3, "warning"),
        raw_event(4, "Verbose"),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = create_pipeline(
        source,
        Some(30.0),
        AlertManager::new().with_channel(notifier.clone()),
    );
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);

    for _ in 0..3 {
        let report = handle.poll_now().await.unwrap();
        assert_eq!(
            report,
            PollReport {
                fetched: 4,
                ingested: 0,
                alerted: 0,
                sample_recorded: true,
            }
        );
    }

    let mut alerted = notifier.alerted_ids();
    alerted.sort_unstable();
    assert_eq!(alerted, vec![1, 3]);
    assert_eq!(pipeline.events.len().await, 4);
    assert_eq!(pipeline.deduplicator.len().await, 2);
    assert_eq!(pipeline.metrics.len().await, 4);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_new_events_in_later_polls_are_alerted() {
    let source = Arc::new(ScriptedEvents::with_batch(vec![raw_event(1, "Error")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = create_pipeline(
        source.clone(),
        Some(30.0),
        AlertManager::new().with_channel(notifier.clone()),
    );
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);
    handle.poll_now().await.unwrap();

    source.set_batch(vec![
        raw_event(1, "Error"),
        raw_event(5, "Critical"),
        raw_event(6, "Information"),
    ]);
    let report = handle.poll_now().await.unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(report.ingested, 2);
    assert_eq!(report.alerted, 1);
    assert_eq!(notifier.alerted_ids(), vec![1, 5]);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reused_id_with_new_timestamp_alerts_but_is_not_reingested() {
    let first = raw_event(9, "Error");
    let mut reused = first.clone();
    reused.timestamp = first.timestamp + ChronoDuration::hours(1);
    reused.message = "recurring failure".to_string();

    let source = Arc::new(ScriptedEvents::with_batch(vec![first]));
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = create_pipeline(
        source.clone(),
        None,
        AlertManager::new().with_channel(notifier.clone()),
    );
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);
    handle.poll_now().await.unwrap();

    source.set_batch(vec![reused]);
    let report = handle.poll_now().await.unwrap();

    assert_eq!(report.alerted, 1);
    assert_eq!(report.ingested, 0);
    assert_eq!(notifier.alerted_ids(), vec![9, 9]);
    assert_eq!(
        pipeline.events.get_by_id(9).await.unwrap().message,
        "test event 9"
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_collected_events_are_queryable_and_pinnable() {
    let source = Arc::new(ScriptedEvents::with_batch(vec![
        raw_event(10, "ERROR"),
        raw_event(11, "Error"),
        raw_event(12, "Information"),
    ]));
    let pipeline = create_pipeline(source, Some(55.0), AlertManager::new());
    let handle = CollectorHandle::spawn(pipeline.clone(), INTERVAL);
    handle.poll_now().await.unwrap();

    let errors = pipeline.events.get_by_severity(Severity::Error).await;
    assert_eq!(errors.iter().map(|e| e.id).collect::<Vec<_>>(), vec![10, 11]);

    assert_eq!(pipeline.events.pin_by_severity(Severity::Error).await, 2);
    pipeline.events.unpin(10).await.unwrap();

    let pinned = pipeline.events.list_pinned().await;
    assert_eq!(pinned.len(), 1);
    assert_eq!(pinned[0].id, 11);
    assert_eq!(pipeline.events.len().await, 3);
    assert_eq!(pipeline.metrics.latest().await.cpu_percent, 55.0);

    handle.shutdown().await.unwrap();
}
