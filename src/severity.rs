//! Normalized log levels
//!
//! Every raw level label reported by an event source is mapped onto the fixed
//! [`Severity`] vocabulary. Classification never fails: labels outside the
//! vocabulary become [`Severity::Information`] so that a single malformed entry
//! cannot block an ingestion cycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Verbose,
    Information,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Verbose,
        Severity::Information,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "Verbose",
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    /// Severities that trigger a notification on first sighting
    pub fn is_alert_worthy(&self) -> bool {
        matches!(
            self,
            Severity::Warning | Severity::Error | Severity::Critical
        )
    }

    fn lookup(label: &str) -> Option<Severity> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::lookup(s)
            .ok_or_else(|| StoreError::InvalidArgument(format!("invalid log type: {s}")))
    }
}

/// Map a raw level label onto [`Severity`], case-insensitively.
pub fn classify(raw_level: &str) -> Severity {
    Severity::lookup(raw_level).unwrap_or(Severity::Information)
}

/// Whether `text` names one of the known severities.
pub fn is_valid_type(text: &str) -> bool {
    Severity::lookup(text).is_some()
}

/// Level label for a syslog/journald priority (0 = emerg .. 7 = debug)
pub fn journald_level(priority: u8) -> &'static str {
    match priority {
        0..=2 => Severity::Critical.as_str(),
        3 => Severity::Error.as_str(),
        4 => Severity::Warning.as_str(),
        5 | 6 => Severity::Information.as_str(),
        _ => Severity::Verbose.as_str(),
    }
}
