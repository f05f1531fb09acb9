//! Actor-based collection
//!
//! The collector runs as an independent async task and is controlled through
//! a cloneable handle over an mpsc command channel. Request/response commands
//! carry a oneshot sender; the scheduler state is published on a watch channel.
//!
//! ```text
//!   timer tick / PollNow
//!          │
//!          ▼
//!   ┌────────────────┐  fetch   ┌──────────────┐
//!   │ CollectorActor ├─────────►│ EventSource  │
//!   │                ├─────────►│ MetricSource │
//!   └───────┬────────┘  sample  └──────────────┘
//!           │ classify → dedup → dispatch
//!           ▼
//!   EventStore.ingest / MetricWindow.record
//! ```

pub mod collector;
pub mod messages;

pub use collector::{CollectorActor, CollectorHandle, Pipeline};
pub use messages::{CollectorCommand, PollReport, SchedulerState};
