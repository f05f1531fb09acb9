//! Raw data acquisition from the host
//!
//! The collector polls two collaborators on every tick:
//!
//! - an [`EventSource`] returning the most recent log entries (the same entries
//!   are typically re-reported on consecutive polls)
//! - a [`MetricSource`] returning one utilization sample
//!
//! Both are snapshot queries rather than subscriptions because the underlying
//! OS facilities only offer snapshots. Implementations must bound their own
//! latency; a failed call costs the collector one tick, nothing more.

pub mod command;
pub mod system;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::severity::classify;
use crate::{LogEvent, MetricSample};

pub use command::CommandEventSource;
pub use system::SystemMetricSource;

/// A log entry as reported by the source, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogEvent {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    /// Level label exactly as reported (e.g. "Error", "Warnung", "")
    pub level: String,
    pub message: String,
    pub source_log: String,
}

impl RawLogEvent {
    /// Normalize the level label into a [`LogEvent`]
    pub fn classify(self) -> LogEvent {
        LogEvent {
            id: self.id,
            timestamp: self.timestamp,
            severity: classify(&self.level),
            message: self.message,
            source_log: self.source_log,
        }
    }
}

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the most recent log entries
    async fn fetch(&self) -> anyhow::Result<Vec<RawLogEvent>>;
}

#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Take one utilization sample
    async fn sample(&self) -> anyhow::Result<MetricSample>;
}
