//! Releasing deferred operations and moving logical time forward.

use serde_json::json;
use tickloop_core::{DeferredOperation, LogCategory, LogEntry, SimulatorState, TaskState};

use crate::render::{animation_frame_waiting, next_frame_boundary};
use crate::rules::Rule;

/// Moves every registry entry due at `now` onto its target queue.
pub fn release_due(state: &SimulatorState) -> SimulatorState {
    let mut next = state.clone();
    release_into(&mut next);
    next
}

/// Releases due entries in ascending enqueue-sequence order. Recurring entries
/// are re-armed at `now + period` with a fresh sequence number and the same id.
/// Returns how many tasks were released.
pub(crate) fn release_into(state: &mut SimulatorState) -> usize {
    let now = state.now;
    let due = state.registry.take_due(now);
    let released = due.len();

    for op in due {
        let DeferredOperation {
            id,
            kind,
            task,
            target,
            recurring,
            ..
        } = op;

        let entry = LogEntry::new(
            now,
            LogCategory::Enqueue,
            format!(
                "Released {} '{}' to the {} queue",
                task.kind().name(),
                task.label,
                target
            ),
        )
        .task(&id)
        .meta("seq", json!(task.enqueue_seq()))
        .meta("target", target.name());
        state.record(entry);

        if let Some(period) = recurring {
            let seq = state.next_seq();
            let ready_at = now.saturating_add(period);
            tracing::trace!("re-arming '{}' for t={} as seq {}", id, ready_at, seq);
            state.registry.insert(DeferredOperation {
                id: id.clone(),
                kind,
                task: task.resequenced(seq, TaskState::WaitingOnDeferred),
                ready_at,
                target,
                recurring,
            });
        }

        state
            .queue_mut(target)
            .enqueue(task.with_state(TaskState::Queued));
    }

    released
}

/// Rule 6: jump to the earliest ready time in the registry, or to the next
/// frame boundary if an animation-frame callback is waiting for it first.
pub(crate) fn advance_time(state: &mut SimulatorState) {
    let from = state.now;
    let registry_next = state.registry.earliest_ready();
    let frame_next = animation_frame_waiting(state).then(|| next_frame_boundary(state));

    let target = match (registry_next, frame_next) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => from,
    };
    // Time never moves backwards, even for entries already overdue.
    state.now = from.max(target);

    let index = state.log.len();
    let released = release_into(state);

    tracing::debug!(
        "advanced time t={} -> t={}, released {} task(s)",
        from,
        state.now,
        released
    );
    let entry = LogEntry::new(
        state.now,
        LogCategory::Enqueue,
        format!("Advanced time from t={} to t={}", from, state.now),
    )
    .meta("rule", Rule::AdvanceTime.name())
    .meta("from", json!(from))
    .meta("to", json!(state.now))
    .meta("released", json!(released));
    // The advance entry precedes the releases it caused.
    state.log.insert(index, entry);
}
