//! Data model for the Tickloop event-loop simulator.
//!
//! Everything here is plain, fully traversable data. Behaviour (enqueueing,
//! ticking, effects) lives in `tickloop-scheduler`.

pub mod log;
pub mod queue;
pub mod registry;
pub mod state;
pub mod task;

pub use log::{LogCategory, LogEntry};
pub use queue::{CallStack, TaskQueue};
pub use registry::{DeferredKind, DeferredOperation, Registry};
pub use state::{
    DEFAULT_FRAME_INTERVAL, FrameTiming, Location, NestedTimerPolicy, SimulatorConfig,
    SimulatorState, StackFrame, StateOptions,
};
pub use task::{
    Effect, Effects, LogicalTime, OperationId, Origin, Placement, QueueKind, Seq, Task, TaskId,
    TaskKind, TaskOptions, TaskSpec, TaskState,
};
