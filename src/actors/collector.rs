//! CollectorActor - drives periodic ingestion
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → fetch events + sample metrics → classify → dedup → dispatch alerts
//!     ↑                                                        → ingest / record
//!     └─── Commands (PollNow, Shutdown)
//! ```
//!
//! Polls never overlap: the actor is a single task. A tick that came due
//! while a poll was in flight is dropped, and the next poll waits for the
//! following period boundary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument, trace, warn};

use crate::LogEvent;
use crate::alerts::dedup::AlertDeduplicator;
use crate::alerts::{AlertManager, LogAlert};
use crate::sources::{EventSource, MetricSource, RawLogEvent};
use crate::storage::{EventStore, MetricWindow};

use super::messages::{CollectorCommand, PollReport, SchedulerState};

/// Everything a poll reads from and writes to
#[derive(Clone)]
pub struct Pipeline {
    pub event_source: Arc<dyn EventSource>,
    pub metric_source: Arc<dyn MetricSource>,
    pub deduplicator: Arc<AlertDeduplicator>,
    pub alerts: Arc<AlertManager>,
    pub events: Arc<EventStore>,
    pub metrics: Arc<MetricWindow>,
}

pub struct CollectorActor {
    pipeline: Pipeline,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<CollectorCommand>,

    state_tx: watch::Sender<SchedulerState>,

    interval_duration: Duration,
}

impl CollectorActor {
    pub fn new(
        pipeline: Pipeline,
        interval_duration: Duration,
        command_rx: mpsc::Receiver<CollectorCommand>,
        state_tx: watch::Sender<SchedulerState>,
    ) -> Self {
        Self {
            pipeline,
            command_rx,
            state_tx,
            interval_duration,
        }
    }

    /// Run the actor's main loop
    ///
    /// Collects once right away, then on every tick until a Shutdown command
    /// is received or every handle has been dropped.
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting collector actor");

        self.poll().await;
        let mut idle_since = Instant::now();

        let mut ticker = interval_at(idle_since + self.interval_duration, self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                scheduled = ticker.tick() => {
                    if scheduled < idle_since {
                        trace!("skipping tick that came due during a poll");
                        continue;
                    }
                    self.poll().await;
                    idle_since = Instant::now();
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CollectorCommand::PollNow { respond_to }) => {
                            debug!("received PollNow command");
                            let report = self.poll().await;
                            idle_since = Instant::now();
                            let _ = respond_to.send(report);
                        }

                        Some(CollectorCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            debug!("all handles dropped, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("collector actor stopped");
    }

    /// Run one collection cycle.
    ///
    /// Source failures degrade to an empty batch or a missing sample; the
    /// cycle itself never fails.
    #[instrument(skip(self))]
    async fn poll(&self) -> PollReport {
        self.state_tx.send_replace(SchedulerState::Polling);
        let Pipeline {
            event_source,
            metric_source,
            deduplicator,
            alerts,
            events,
            metrics,
        } = &self.pipeline;

        let (fetched, sampled) = tokio::join!(event_source.fetch(), metric_source.sample());

        let batch: Vec<LogEvent> = match fetched {
            Ok(raw) => raw.into_iter().map(RawLogEvent::classify).collect(),
            Err(e) => {
                warn!("event source unavailable: {e:#}");
                Vec::new()
            }
        };

        let mut report = PollReport {
            fetched: batch.len(),
            ..PollReport::default()
        };

        for event in &batch {
            if deduplicator.should_alert(event).await {
                info!(event_id = event.id, severity = %event.severity, "suspicious log detected");
                alerts.dispatch(&LogAlert::new(event.clone())).await;
                report.alerted += 1;
            }
        }

        report.ingested = events.ingest(batch).await;

        match sampled {
            Ok(sample) => {
                metrics.record(sample).await;
                report.sample_recorded = true;
            }
            Err(e) => warn!("metric source unavailable: {e:#}"),
        }

        trace!("poll finished: {report:?}");
        self.state_tx.send_replace(SchedulerState::Idle);
        report
    }
}

/// Handle for controlling a CollectorActor
///
/// It can be cloned and shared across tasks.
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,
    state_rx: watch::Receiver<SchedulerState>,
}

impl CollectorHandle {
    /// Spawn a new collector actor polling every `interval`
    pub fn spawn(pipeline: Pipeline, interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);

        let actor = CollectorActor::new(pipeline, interval, cmd_rx, state_tx);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            state_rx,
        }
    }

    /// Trigger an immediate poll and wait for its report
    pub async fn poll_now(&self) -> Result<PollReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive response")
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Receiver notified on every state transition
    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state_rx.clone()
    }

    /// Gracefully shut down the collector
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(CollectorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
