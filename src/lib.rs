pub mod actors;
pub mod alerts;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod severity;
pub mod sources;
pub mod storage;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use severity::Severity;

/// A classified entry from one of the host's event logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Identity assigned by the event source
    pub id: u64,

    /// When the entry was written by the operating system
    pub timestamp: DateTime<Utc>,

    pub severity: Severity,

    pub message: String,

    /// Log the entry originates from (e.g. "System", "sshd")
    pub source_log: String,
}

/// A single resource-utilization sample.
///
/// `MetricSample::default()` is the zero-value sentinel returned by empty
/// window queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub disk_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
}

impl MetricSample {
    pub fn new(timestamp: DateTime<Utc>, cpu: f64, ram: f64, disk: f64) -> Self {
        Self {
            timestamp,
            cpu_percent: cpu,
            ram_percent: ram,
            disk_percent: disk,
            temperature_celsius: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_celsius = Some(celsius);
        self
    }
}
