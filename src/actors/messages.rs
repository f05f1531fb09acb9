//! Message types for actor communication

use serde::Serialize;
use tokio::sync::oneshot;

/// Observable lifecycle of the collector between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Waiting for the next tick or command
    Idle,
    /// A poll is in flight
    Polling,
}

/// Outcome of a single poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Events returned by the event source (0 when it failed)
    pub fetched: usize,

    /// Events that were new to the store
    pub ingested: usize,

    /// Events that triggered a notification
    pub alerted: usize,

    /// Whether a metric sample was recorded
    pub sample_recorded: bool,
}

/// Commands that can be sent to a CollectorActor
#[derive(Debug)]
pub enum CollectorCommand {
    /// Trigger an immediate poll (bypassing the interval timer)
    PollNow {
        respond_to: oneshot::Sender<PollReport>,
    },

    /// Gracefully shut down the collector
    ///
    /// The actor will finish any in-flight poll and then exit.
    Shutdown,
}
