use thiserror::Error;
use tickloop_core::{LogicalTime, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// No rule applies. The state was built or mutated outside the scheduler.
    #[error("no scheduling rule applies at t={now} (step {step}): {reason}")]
    InvalidState {
        now: LogicalTime,
        step: u64,
        reason: String,
    },

    #[error("call stack frame for task '{task}' has no remaining steps")]
    CorruptFrame { task: TaskId },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
