//! At-most-once alerting per distinct event
//!
//! Event sources re-report recent history on every poll. The deduplicator
//! remembers every [`AlertKey`] that already produced a notification so the
//! same event is announced once per process lifetime, however often it is
//! observed. Keys are never evicted.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::Mutex;
use tracing::trace;

use crate::LogEvent;

/// Deduplication identity of an event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
}

impl From<&LogEvent> for AlertKey {
    fn from(event: &LogEvent) -> Self {
        Self {
            id: event.id,
            timestamp: event.timestamp,
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.id,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Set of keys that have already triggered a notification
///
/// Guarded by its own lock, independent of the event and metric stores.
#[derive(Debug, Default)]
pub struct AlertDeduplicator {
    seen: Mutex<HashSet<AlertKey>>,
}

impl AlertDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time an alert-worthy event is seen.
    ///
    /// Events below `Warning` return `false` without touching state.
    pub async fn should_alert(&self, event: &LogEvent) -> bool {
        if !event.severity.is_alert_worthy() {
            return false;
        }

        let key = AlertKey::from(event);
        let first_sighting = self.seen.lock().await.insert(key.clone());
        if !first_sighting {
            trace!("already alerted for {key}");
        }
        first_sighting
    }

    /// Number of distinct events that triggered an alert so far
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.seen.lock().await.is_empty()
    }
}
