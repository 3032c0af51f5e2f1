//! Inspection tooling for Tickloop. Nothing here mutates a state.

pub mod snapshot;
pub mod trace;
pub mod view;

pub use snapshot::{DevtoolsError, SCHEMA_VERSION, Snapshot, round_trip};
pub use trace::{Recorder, TraceSink, explain};
pub use view::{FrameView, PendingView, QueueView, StateView, TaskSummary};
