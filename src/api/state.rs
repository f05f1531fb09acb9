//! API shared state

use std::sync::Arc;

use crate::storage::{EventStore, MetricWindow};

/// Shared state passed to all API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub events: Arc<EventStore>,
    pub metrics: Arc<MetricWindow>,
}

impl ApiState {
    pub fn new(events: Arc<EventStore>, metrics: Arc<MetricWindow>) -> Self {
        Self { events, metrics }
    }
}
