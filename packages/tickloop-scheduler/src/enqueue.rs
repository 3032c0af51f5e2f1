//! One entry point per task source. Each takes a state and returns the next
//! one; the enqueue counter travels inside the state.

use serde_json::json;
use tickloop_core::{
    DeferredKind, DeferredOperation, LogCategory, LogEntry, LogicalTime, Origin, Placement,
    QueueKind, Seq, SimulatorState, Task, TaskId, TaskKind, TaskOptions, TaskSpec, TaskState,
};

/// Places `spec` wherever its kind belongs: the registry for timed kinds,
/// otherwise straight onto its home queue.
pub fn enqueue(state: &SimulatorState, spec: TaskSpec) -> SimulatorState {
    let mut next = state.clone();
    let target = spec.kind.home_queue();
    let deferral = spec.kind.deferral();
    place(&mut next, spec, Origin::External, target, deferral);
    next
}

/// The synchronous script block. Runs as an ordinary macrotask.
pub fn enqueue_sync(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::Sync))
}

pub fn enqueue_timer(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    delay: LogicalTime,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::timer(delay)))
}

/// A recurring timer. Its handle is its own id; cancel it with
/// [`crate::cancel::clear_interval`] or a `cancel-deferred` effect.
pub fn enqueue_interval(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    delay: LogicalTime,
    options: TaskOptions,
) -> SimulatorState {
    let id = id.into();
    let handle = id.clone();
    enqueue(state, options.into_spec(id, TaskKind::Interval { delay, handle }))
}

pub fn enqueue_microtask(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::Microtask))
}

/// A promise reaction job.
pub fn enqueue_promise(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::Promise))
}

/// The continuation after an `await`.
pub fn enqueue_async_continuation(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::AsyncContinuation))
}

pub fn enqueue_fetch(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    resource: impl Into<String>,
    latency: LogicalTime,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::fetch(latency, resource)))
}

/// A DOM event. With a delay it waits in the registry; without one it is
/// dispatched to the macrotask queue immediately.
pub fn enqueue_dom_event(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    event: impl Into<String>,
    delay: Option<LogicalTime>,
    options: TaskOptions,
) -> SimulatorState {
    let kind = TaskKind::DomEvent {
        event: event.into(),
        delay,
    };
    enqueue(state, options.into_spec(id, kind))
}

pub fn enqueue_animation_frame(
    state: &SimulatorState,
    id: impl Into<TaskId>,
    options: TaskOptions,
) -> SimulatorState {
    enqueue(state, options.into_spec(id, TaskKind::AnimationFrame))
}

/// Stamps a sequence number on `spec` and puts it in the registry (when
/// `deferral` is set) or on `target`.
pub(crate) fn place(
    state: &mut SimulatorState,
    spec: TaskSpec,
    origin: Origin,
    target: QueueKind,
    deferral: Option<LogicalTime>,
) {
    let deferred =
        deferral.and_then(|delay| DeferredKind::of(&spec.kind).map(|kind| (delay, kind)));
    let seq = state.next_seq();
    let now = state.now;

    match deferred {
        Some((delay, kind)) => {
            let recurring = spec.kind.is_recurring().then_some(delay);
            let ready_at = now.saturating_add(delay);
            let task = Task::place(
                spec,
                Placement {
                    created_at: now,
                    enqueue_seq: seq,
                    origin,
                    state: TaskState::WaitingOnDeferred,
                },
            );
            let entry = LogEntry::new(
                now,
                LogCategory::Enqueue,
                format!(
                    "Registered {} '{}' for the {} queue at t={}",
                    task.kind().name(),
                    task.label,
                    target,
                    ready_at
                ),
            )
            .task(task.id())
            .meta("seq", json!(seq))
            .meta("ready_at", json!(ready_at))
            .meta("target", target.name());

            let op = DeferredOperation {
                id: task.id().clone(),
                kind,
                task,
                ready_at,
                target,
                recurring,
            };
            tracing::trace!("registered seq {} ready at t={}", seq, ready_at);
            state.record(entry);
            if let Some(replaced) = state.registry.insert(op) {
                record_replaced(state, replaced, seq);
            }
        }
        None => {
            let task = Task::place(
                spec,
                Placement {
                    created_at: now,
                    enqueue_seq: seq,
                    origin,
                    state: TaskState::Queued,
                },
            );
            let entry = LogEntry::new(
                now,
                LogCategory::Enqueue,
                format!(
                    "Queued {} '{}' on the {} queue",
                    task.kind().name(),
                    task.label,
                    target
                ),
            )
            .task(task.id())
            .meta("seq", json!(seq))
            .meta("target", target.name());

            tracing::trace!("queued seq {} on {}", seq, target);
            state.queue_mut(target).enqueue(task);
            state.record(entry);
        }
    }
}

/// A registration reused the id of a pending operation. The older payload
/// never runs; it is logged as canceled so the trace stays complete.
fn record_replaced(state: &mut SimulatorState, replaced: DeferredOperation, by_seq: Seq) {
    let task = replaced.task.with_state(TaskState::Canceled);
    tracing::warn!(
        "deferred operation '{}' (seq {}) replaced by seq {}",
        replaced.id,
        task.enqueue_seq(),
        by_seq
    );
    state.record(
        LogEntry::new(
            state.now,
            LogCategory::User,
            format!(
                "Dropped {} '{}': id '{}' was registered again",
                task.kind().name(),
                task.label,
                replaced.id
            ),
        )
        .task(&replaced.id)
        .meta("level", "warn")
        .meta("seq", json!(task.enqueue_seq()))
        .meta("replaced_by", json!(by_seq))
        .meta("state", json!(task.state)),
    );
}
