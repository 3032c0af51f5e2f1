//! Collapsing a whole microtask drain into one call.

use tickloop_core::SimulatorState;

use crate::error::Result;
use crate::rules::Rule;
use crate::tick::{Step, step};

/// Ticks until the call stack and the microtask queue are both empty.
///
/// Each iteration is an ordinary [`step`], so ordering and logging match
/// repeated ticking exactly: a running frame finishes first, then microtasks
/// run one at a time, including any they spawn. Stops as soon as the queue
/// empties, whatever else has become ready meanwhile.
///
/// There is no iteration cap. A microtask that always re-enqueues itself
/// never lets this return; bound it from the calling harness instead.
pub fn drain_microtasks(state: &SimulatorState) -> Result<SimulatorState> {
    drain_microtasks_traced(state).map(|(state, _)| state)
}

/// Like [`drain_microtasks`], also returning every step taken.
pub fn drain_microtasks_traced(state: &SimulatorState) -> Result<(SimulatorState, Vec<Step>)> {
    let mut current = state.clone();
    let mut steps = Vec::new();

    while !(current.call_stack.is_empty() && current.microtasks.is_empty()) {
        let next = step(&current)?;
        debug_assert!(matches!(
            next.rule,
            Rule::ExecuteStack | Rule::DrainMicrotask
        ));
        current = next.state.clone();
        steps.push(next);
    }

    Ok((current, steps))
}
