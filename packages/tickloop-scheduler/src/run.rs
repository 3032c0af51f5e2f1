//! A bounded driver loop. The bound belongs here, never inside `tick`.

use tickloop_core::SimulatorState;

use crate::error::Result;
use crate::rules::Rule;
use crate::tick::{Step, step};

pub const DEFAULT_MAX_TICKS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub max_ticks: u64,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub state: SimulatorState,
    /// Every rule fired, in order, including the final `complete`.
    pub rules: Vec<Rule>,
    /// `false` when the tick budget ran out first.
    pub completed: bool,
}

pub fn run(state: &SimulatorState, limits: RunLimits) -> Result<Run> {
    run_with(state, limits, |_| {})
}

/// Runs until the terminal rule fires or `limits` is exhausted, handing each
/// step to `observe` as it happens.
pub fn run_with(
    state: &SimulatorState,
    limits: RunLimits,
    mut observe: impl FnMut(&Step),
) -> Result<Run> {
    let mut current = state.clone();
    let mut rules = Vec::new();

    for _ in 0..limits.max_ticks {
        let next = step(&current)?;
        observe(&next);
        rules.push(next.rule);
        let done = next.rule == Rule::Complete;
        current = next.state;
        if done {
            return Ok(Run {
                state: current,
                rules,
                completed: true,
            });
        }
    }

    tracing::warn!(
        "run stopped after {} ticks without completing",
        limits.max_ticks
    );
    Ok(Run {
        state: current,
        rules,
        completed: false,
    })
}
