//! Event history with a pinned subset
//!
//! The history is a single insertion-ordered `Vec<LogEvent>`. Lookups go
//! through two indexes kept consistent on every insert:
//!
//! - `by_id`: identity → position in history
//! - `by_severity`: severity → positions in history (ascending)
//!
//! The pinned subset stores history positions in pin order, so pinning never
//! copies or mutates an event. History entries are never removed; the
//! collector re-reports recent events on every poll, so ingest de-duplicates by
//! identity and the first sighting wins.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::error::{StoreError, StoreResult};
use crate::{LogEvent, Severity};

#[derive(Debug, Default)]
struct EventLog {
    history: Vec<LogEvent>,
    by_id: HashMap<u64, usize>,
    by_severity: HashMap<Severity, Vec<usize>>,
    pinned: Vec<usize>,
    pinned_ids: HashSet<u64>,
}

impl EventLog {
    fn insert(&mut self, event: LogEvent) -> bool {
        if self.by_id.contains_key(&event.id) {
            return false;
        }

        let position = self.history.len();
        self.by_id.insert(event.id, position);
        self.by_severity
            .entry(event.severity)
            .or_default()
            .push(position);
        self.history.push(event);
        true
    }

    fn matching(&self, severity: Severity) -> impl Iterator<Item = usize> + '_ {
        self.by_severity
            .get(&severity)
            .into_iter()
            .flat_map(|positions| positions.iter().copied())
    }

    fn pin_position(&mut self, position: usize) -> bool {
        let id = self.history[position].id;
        if !self.pinned_ids.insert(id) {
            return false;
        }
        self.pinned.push(position);
        true
    }

    fn pinned_events(&self) -> impl Iterator<Item = &LogEvent> + '_ {
        self.pinned.iter().map(|&position| &self.history[position])
    }
}

/// Concurrency-safe store of every event seen during the process lifetime
#[derive(Debug, Default)]
pub struct EventStore {
    inner: RwLock<EventLog>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every event whose identity is not yet in history.
    ///
    /// Returns the number of newly inserted events.
    pub async fn ingest(&self, batch: Vec<LogEvent>) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let received = batch.len();
        let mut log = self.inner.write().await;
        let mut inserted = 0;
        for event in batch {
            if log.insert(event) {
                inserted += 1;
            }
        }

        trace!(
            "ingested {inserted}/{received} events (history: {})",
            log.history.len()
        );
        inserted
    }

    pub async fn get_by_id(&self, id: u64) -> StoreResult<LogEvent> {
        let log = self.inner.read().await;
        log.by_id
            .get(&id)
            .map(|&position| log.history[position].clone())
            .ok_or_else(|| StoreError::NotFound(format!("event {id}")))
    }

    pub async fn get_by_severity(&self, severity: Severity) -> Vec<LogEvent> {
        let log = self.inner.read().await;
        log.matching(severity)
            .map(|position| log.history[position].clone())
            .collect()
    }

    pub async fn list_all(&self) -> Vec<LogEvent> {
        self.inner.read().await.history.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Pin the history entry with the given identity.
    ///
    /// Pinning an already pinned event is a no-op.
    pub async fn pin(&self, id: u64) -> StoreResult<()> {
        let mut log = self.inner.write().await;
        let Some(&position) = log.by_id.get(&id) else {
            return Err(StoreError::NotFound(format!("event {id}")));
        };

        if log.pin_position(position) {
            debug!("pinned event {id}");
        }
        Ok(())
    }

    /// Pin every history entry of the given severity, returning how many were
    /// newly pinned.
    pub async fn pin_by_severity(&self, severity: Severity) -> usize {
        let mut log = self.inner.write().await;
        let positions: Vec<usize> = log.matching(severity).collect();
        let pinned = positions
            .into_iter()
            .filter(|&position| log.pin_position(position))
            .count();

        debug!("pinned {pinned} {severity} events");
        pinned
    }

    /// Remove an event from the pinned subset. History is left untouched.
    pub async fn unpin(&self, id: u64) -> StoreResult<()> {
        let mut log = self.inner.write().await;
        if !log.pinned_ids.remove(&id) {
            return Err(StoreError::NotFound(format!("pinned event {id}")));
        }

        let EventLog {
            history, pinned, ..
        } = &mut *log;
        pinned.retain(|&position| history[position].id != id);

        debug!("unpinned event {id}");
        Ok(())
    }

    /// Remove every pinned event of the given severity, returning how many
    /// were removed.
    pub async fn unpin_by_severity(&self, severity: Severity) -> usize {
        let mut log = self.inner.write().await;
        let EventLog {
            history,
            pinned,
            pinned_ids,
            ..
        } = &mut *log;

        let before = pinned.len();
        pinned.retain(|&position| {
            let event = &history[position];
            if event.severity == severity {
                pinned_ids.remove(&event.id);
                false
            } else {
                true
            }
        });

        let removed = before - pinned.len();
        debug!("unpinned {removed} {severity} events");
        removed
    }

    pub async fn list_pinned(&self) -> Vec<LogEvent> {
        let log = self.inner.read().await;
        log.pinned_events().cloned().collect()
    }

    pub async fn get_pinned_by_id(&self, id: u64) -> StoreResult<LogEvent> {
        let log = self.inner.read().await;
        if !log.pinned_ids.contains(&id) {
            return Err(StoreError::NotFound(format!("pinned event {id}")));
        }

        log.by_id
            .get(&id)
            .map(|&position| log.history[position].clone())
            .ok_or_else(|| StoreError::NotFound(format!("pinned event {id}")))
    }

    pub async fn get_pinned_by_severity(&self, severity: Severity) -> Vec<LogEvent> {
        let log = self.inner.read().await;
        log.pinned_events()
            .filter(|event| event.severity == severity)
            .cloned()
            .collect()
    }

    pub async fn pinned_len(&self) -> usize {
        self.inner.read().await.pinned.len()
    }
}
