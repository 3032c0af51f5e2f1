//! Completion effects: interpreted in list order against the state right
//! after the finished task was popped.

use serde_json::json;
use tickloop_core::{
    Effect, LogCategory, LogEntry, NestedTimerPolicy, Origin, QueueKind, SimulatorState, Task,
    TaskSpec, TaskState,
};

use crate::enqueue::place;

pub(crate) fn apply_effects(state: &mut SimulatorState, task: &Task) {
    for effect in task.effects() {
        match effect {
            Effect::SpawnTask { task: child, queue } => spawn(state, task, child, *queue),
            Effect::Log { message } => {
                state.record(
                    LogEntry::new(state.now, LogCategory::User, message.clone())
                        .task(task.id())
                        .meta("effect", "log"),
                );
            }
            Effect::RequestRender => {
                tracing::trace!("'{}' requested a render", task.id());
                state.frame.render_requested = true;
            }
            Effect::CancelDeferred { operation } => match state.registry.remove(operation) {
                Some(op) => {
                    tracing::debug!("'{}' canceled deferred operation '{}'", task.id(), op.id);
                    state.record(
                        LogEntry::new(
                            state.now,
                            LogCategory::User,
                            format!("Canceled {} '{}'", op.task.kind().name(), op.task.label),
                        )
                        .task(&op.id)
                        .meta("effect", "cancel-deferred")
                        .meta("canceled_by", task.id().as_str())
                        .meta("state", json!(TaskState::Canceled)),
                    );
                }
                None => tracing::trace!("cancel of unknown operation '{}' ignored", operation),
            },
        }
    }
}

fn spawn(state: &mut SimulatorState, parent: &Task, child: &TaskSpec, queue: QueueKind) {
    let home = child.kind.home_queue();
    if home != queue {
        tracing::warn!(
            "'{}' tried to spawn {} '{}' onto the {} queue; ignoring",
            parent.id(),
            child.kind.name(),
            child.id,
            queue
        );
        state.record(
            LogEntry::new(
                state.now,
                LogCategory::User,
                format!(
                    "Ignored spawn of {} '{}' onto the {} queue (belongs on {})",
                    child.kind.name(),
                    child.label,
                    queue,
                    home
                ),
            )
            .task(parent.id())
            .meta("level", "warn")
            .meta("effect", "spawn-task"),
        );
        return;
    }

    let deferral = match state.config.nested_timers {
        NestedTimerPolicy::Deferred => child.kind.deferral(),
        NestedTimerPolicy::Immediate => None,
    };
    place(
        state,
        child.clone(),
        Origin::Task(parent.id().clone()),
        queue,
        deferral,
    );
}
