//! Cancellation from outside the simulation.

use serde_json::json;
use tickloop_core::{
    LogCategory, LogEntry, OperationId, QueueKind, SimulatorState, TaskId, TaskState,
};

/// Removes a task that is waiting in the registry or sitting in any queue.
/// A running task cannot be canceled; unknown ids are a no-op.
pub fn cancel_task(state: &SimulatorState, id: &TaskId) -> SimulatorState {
    let mut next = state.clone();
    let mut removed = Vec::new();

    if let Some(op) = next.registry.remove(id) {
        removed.push(("registry", op.task));
    }
    for kind in QueueKind::ALL {
        while let Some(task) = next.queue_mut(kind).remove_first(|task| task.id() == id) {
            removed.push((kind.name(), task));
        }
    }

    if removed.is_empty() {
        tracing::trace!("cancel of '{}' ignored: not waiting or queued", id);
        return next;
    }

    for (place, task) in removed {
        let task = task.with_state(TaskState::Canceled);
        tracing::debug!("canceled '{}' from {}", id, place);
        let entry = LogEntry::new(
            next.now,
            LogCategory::User,
            format!("Canceled '{}'", task.label),
        )
        .task(id)
        .meta("from", place)
        .meta("seq", json!(task.enqueue_seq()))
        .meta("step", json!(next.step))
        .meta("state", json!(task.state));
        next.record(entry);
    }
    next
}

/// Stops a recurring interval by dropping its registry entry. Instances
/// already released to a queue still run.
pub fn clear_interval(state: &SimulatorState, handle: &OperationId) -> SimulatorState {
    let mut next = state.clone();
    match next.registry.remove(handle) {
        Some(op) => {
            tracing::debug!("cleared interval '{}'", handle);
            next.record(
                LogEntry::new(
                    next.now,
                    LogCategory::User,
                    format!("Cleared {} '{}'", op.task.kind().name(), op.task.label),
                )
                .task(handle)
                .meta("from", "registry")
                .meta("state", json!(TaskState::Canceled)),
            );
        }
        None => tracing::trace!("clear of unknown interval '{}' ignored", handle),
    }
    next
}
