#![allow(dead_code)]

use tickloop_core::{LogCategory, SimulatorState};
use tickloop_scheduler::{Rule, Step, step};

/// Ids of started tasks, in log order.
pub fn started(state: &SimulatorState) -> Vec<String> {
    ids_for(state, LogCategory::TaskStart)
}

pub fn completed(state: &SimulatorState) -> Vec<String> {
    ids_for(state, LogCategory::TaskComplete)
}

fn ids_for(state: &SimulatorState, category: LogCategory) -> Vec<String> {
    state
        .log
        .iter()
        .filter(|entry| entry.category == category)
        .filter_map(|entry| entry.task_id.as_ref())
        .map(|id| id.to_string())
        .collect()
}

pub fn queue_ids(state: &SimulatorState) -> Vec<String> {
    state.macrotasks.iter().map(|t| t.id().to_string()).collect()
}

/// Steps until the terminal rule, panicking past `max` ticks.
pub fn run_steps(state: &SimulatorState, max: usize) -> Vec<Step> {
    let mut current = state.clone();
    let mut steps = Vec::new();
    for _ in 0..max {
        let next = step(&current).expect("well-formed state");
        let done = next.rule == Rule::Complete;
        current = next.state.clone();
        steps.push(next);
        if done {
            return steps;
        }
    }
    panic!("did not complete within {max} ticks");
}
