//! The single state transition.

use serde_json::json;
use tickloop_core::{
    LogCategory, LogEntry, QueueKind, SimulatorState, StackFrame, Task, TaskState,
};

use crate::deferred::advance_time;
use crate::effects::apply_effects;
use crate::error::Result;
use crate::render::render;
use crate::rules::{Rule, select_rule};

/// A fired rule and the state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub rule: Rule,
    pub state: SimulatorState,
    /// Log length before the rule fired.
    pub log_start: usize,
}

impl Step {
    /// Entries appended by this step.
    pub fn entries(&self) -> &[LogEntry] {
        self.state.log.get(self.log_start..).unwrap_or_default()
    }
}

/// Applies the first applicable rule. The input is left untouched; on error
/// nothing is applied.
pub fn tick(state: &SimulatorState) -> Result<SimulatorState> {
    step(state).map(|step| step.state)
}

pub fn step(state: &SimulatorState) -> Result<Step> {
    let rule = select_rule(state)?;
    let mut next = state.clone();

    tracing::debug!("step {} t={}: {}", state.step, state.now, rule);
    match rule {
        Rule::ExecuteStack => execute_stack(&mut next),
        Rule::DrainMicrotask => start_from(&mut next, QueueKind::Microtask, rule),
        Rule::Render => render(&mut next),
        Rule::RunAnimationFrame => start_from(&mut next, QueueKind::AnimationFrame, rule),
        Rule::ExecuteMacrotask => start_from(&mut next, QueueKind::Macrotask, rule),
        Rule::AdvanceTime => advance_time(&mut next),
        Rule::Complete => complete(&mut next),
    }
    // The terminal rule only appends to the log.
    if rule != Rule::Complete {
        next.step += 1;
    }

    Ok(Step {
        rule,
        state: next,
        log_start: state.log.len(),
    })
}

fn execute_stack(state: &mut SimulatorState) {
    let finished = match state.call_stack.top_mut() {
        Some(frame) => {
            frame.remaining_steps = frame.remaining_steps.saturating_sub(1);
            frame.remaining_steps == 0
        }
        None => false,
    };
    if !finished {
        return;
    }
    let Some(frame) = state.call_stack.pop() else {
        return;
    };

    let task = frame.task.with_state(TaskState::Completed);
    tracing::trace!("completed '{}' after {} step(s)", task.id(), task.cost());
    state.record(
        LogEntry::new(
            state.now,
            LogCategory::TaskComplete,
            format!("Completed {} '{}'", task.kind().name(), task.label),
        )
        .task(task.id())
        .meta("rule", Rule::ExecuteStack.name())
        .meta("steps", json!(task.cost()))
        .meta("started_at", json!(frame.started_at)),
    );
    apply_effects(state, &task);
}

fn start_from(state: &mut SimulatorState, queue: QueueKind, rule: Rule) {
    if let Some(task) = state.queue_mut(queue).dequeue() {
        start(state, task, queue, rule);
    }
}

fn start(state: &mut SimulatorState, task: Task, queue: QueueKind, rule: Rule) {
    let task = task.with_state(TaskState::Running);
    state.record(
        LogEntry::new(
            state.now,
            LogCategory::TaskStart,
            format!("Started {} '{}'", task.kind().name(), task.label),
        )
        .task(task.id())
        .meta("rule", rule.name())
        .meta("queue", queue.name())
        .meta("seq", json!(task.enqueue_seq())),
    );
    state.call_stack.push(StackFrame {
        remaining_steps: task.cost(),
        started_at: state.now,
        task,
    });
}

fn complete(state: &mut SimulatorState) {
    tracing::info!("simulation complete at t={}", state.now);
    state.record(
        LogEntry::new(state.now, LogCategory::User, "Simulation complete")
            .meta("rule", Rule::Complete.name()),
    );
}
