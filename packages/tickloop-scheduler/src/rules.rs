//! The seven scheduling rules, evaluated in fixed order.

use serde::{Deserialize, Serialize};
use std::fmt;
use tickloop_core::SimulatorState;

use crate::error::{Result, SchedulerError};
use crate::render::{animation_frame_waiting, frame_boundary_reached};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    ExecuteStack,
    DrainMicrotask,
    Render,
    RunAnimationFrame,
    ExecuteMacrotask,
    AdvanceTime,
    Complete,
}

impl Rule {
    /// Evaluation order. The first rule whose predicate holds fires.
    pub const ORDER: [Rule; 7] = [
        Rule::ExecuteStack,
        Rule::DrainMicrotask,
        Rule::Render,
        Rule::RunAnimationFrame,
        Rule::ExecuteMacrotask,
        Rule::AdvanceTime,
        Rule::Complete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::ExecuteStack => "execute-stack",
            Rule::DrainMicrotask => "drain-microtask",
            Rule::Render => "render",
            Rule::RunAnimationFrame => "run-animation-frame",
            Rule::ExecuteMacrotask => "execute-macrotask",
            Rule::AdvanceTime => "advance-time",
            Rule::Complete => "complete",
        }
    }

    /// 1-based position in the evaluation order.
    pub fn priority(self) -> usize {
        self as usize + 1
    }

    /// Why this rule fires when it does.
    pub fn describe(self) -> &'static str {
        match self {
            Rule::ExecuteStack => {
                "the running task still has steps left and execution is never preempted"
            }
            Rule::DrainMicrotask => {
                "the call stack is empty and pending microtasks drain before any other work"
            }
            Rule::Render => "a render was requested and the frame boundary has been reached",
            Rule::RunAnimationFrame => {
                "the frame boundary has been reached and an animation-frame callback is waiting"
            }
            Rule::ExecuteMacrotask => "no microtask is pending, so the oldest macrotask runs",
            Rule::AdvanceTime => {
                "nothing can run at the current instant, so time jumps to the next scheduled event"
            }
            Rule::Complete => "nothing is running, queued or pending",
        }
    }

    pub fn applies(self, state: &SimulatorState) -> bool {
        match self {
            Rule::ExecuteStack => can_execute_stack(state),
            Rule::DrainMicrotask => can_drain_microtask(state),
            Rule::Render => can_render(state),
            Rule::RunAnimationFrame => can_run_animation_frame(state),
            Rule::ExecuteMacrotask => can_execute_macrotask(state),
            Rule::AdvanceTime => can_advance_time(state),
            Rule::Complete => is_complete(state),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Stack is empty and no microtask is pending: the gate for rules 3 to 6.
fn settled(state: &SimulatorState) -> bool {
    state.call_stack.is_empty() && state.microtasks.is_empty()
}

pub fn can_execute_stack(state: &SimulatorState) -> bool {
    state
        .running()
        .is_some_and(|frame| frame.remaining_steps > 0)
}

pub fn can_drain_microtask(state: &SimulatorState) -> bool {
    state.call_stack.is_empty() && !state.microtasks.is_empty()
}

pub fn can_render(state: &SimulatorState) -> bool {
    settled(state) && state.frame.render_requested && frame_boundary_reached(state)
}

pub fn can_run_animation_frame(state: &SimulatorState) -> bool {
    settled(state) && frame_boundary_reached(state) && !state.animation_frames.is_empty()
}

pub fn can_execute_macrotask(state: &SimulatorState) -> bool {
    settled(state) && !state.macrotasks.is_empty()
}

/// Fires when every queue is empty and the registry holds future work, and
/// also when an animation-frame callback waits on a boundary not yet reached.
pub fn can_advance_time(state: &SimulatorState) -> bool {
    if !settled(state) || !state.macrotasks.is_empty() {
        return false;
    }
    let registry_pending = state.animation_frames.is_empty() && !state.registry.is_empty();
    registry_pending || animation_frame_waiting(state)
}

pub fn is_complete(state: &SimulatorState) -> bool {
    state.is_idle()
}

/// The first applicable rule, or an error if the state breaks the
/// scheduler's invariants.
pub fn select_rule(state: &SimulatorState) -> Result<Rule> {
    if state.call_stack.depth() > 1 {
        return Err(invalid(
            state,
            format!("call stack holds {} frames", state.call_stack.depth()),
        ));
    }
    if let Some(frame) = state.running() {
        if frame.remaining_steps == 0 {
            return Err(SchedulerError::CorruptFrame {
                task: frame.task.id().clone(),
            });
        }
    }

    Rule::ORDER
        .into_iter()
        .find(|rule| rule.applies(state))
        .ok_or_else(|| invalid(state, "no rule condition holds".to_string()))
}

fn invalid(state: &SimulatorState, reason: String) -> SchedulerError {
    SchedulerError::InvalidState {
        now: state.now,
        step: state.step,
        reason,
    }
}
