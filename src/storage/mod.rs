//! In-memory stores for collected events and metrics
//!
//! Both stores are owned instances shared through `Arc` between the collector
//! (the single writer) and the query layer (concurrent readers). Each store is
//! guarded by one reader/writer lock, so reads run in parallel and exclude the
//! writer only for the duration of the state update.
//!
//! ## Stores
//!
//! - **EventStore**: append-only event history with id and severity indexes
//!   plus an operator-curated pinned subset
//! - **MetricWindow**: time-ordered samples bounded by a retention horizon
//!
//! Nothing is persisted: all data is lost on restart.

pub mod error;
pub mod events;
pub mod metrics;

pub use error::{StoreError, StoreResult};
pub use events::EventStore;
pub use metrics::{DEFAULT_RETENTION, MetricWindow};
