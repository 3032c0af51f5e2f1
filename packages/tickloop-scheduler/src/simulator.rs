use tickloop_core::{
    LogicalTime, SimulatorConfig, SimulatorState, StateOptions, TaskId, TaskOptions, TaskSpec,
};

use crate::error::Result;
use crate::rules::Rule;
use crate::run::{Run, RunLimits};
use crate::{cancel, deferred, drain, enqueue, render, run, tick};

/// Holds the current snapshot and swaps in the next one on every call.
/// Earlier snapshots handed out by [`Simulator::snapshot`] are unaffected.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    state: SimulatorState,
}

impl Simulator {
    pub fn new(options: StateOptions) -> Self {
        Self::from_state(SimulatorState::new(options))
    }

    pub fn with_config(options: StateOptions, config: SimulatorConfig) -> Self {
        Self::from_state(SimulatorState::with_config(options, config))
    }

    pub fn from_state(state: SimulatorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn snapshot(&self) -> SimulatorState {
        self.state.clone()
    }

    pub fn into_state(self) -> SimulatorState {
        self.state
    }

    pub fn now(&self) -> LogicalTime {
        self.state.now
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn schedule(&mut self, spec: TaskSpec) {
        self.state = enqueue::enqueue(&self.state, spec);
    }

    pub fn schedule_sync(&mut self, id: impl Into<TaskId>, options: TaskOptions) {
        self.state = enqueue::enqueue_sync(&self.state, id, options);
    }

    pub fn schedule_timer(
        &mut self,
        id: impl Into<TaskId>,
        delay: LogicalTime,
        options: TaskOptions,
    ) {
        self.state = enqueue::enqueue_timer(&self.state, id, delay, options);
    }

    pub fn schedule_interval(
        &mut self,
        id: impl Into<TaskId>,
        delay: LogicalTime,
        options: TaskOptions,
    ) {
        self.state = enqueue::enqueue_interval(&self.state, id, delay, options);
    }

    pub fn schedule_microtask(&mut self, id: impl Into<TaskId>, options: TaskOptions) {
        self.state = enqueue::enqueue_microtask(&self.state, id, options);
    }

    pub fn schedule_promise(&mut self, id: impl Into<TaskId>, options: TaskOptions) {
        self.state = enqueue::enqueue_promise(&self.state, id, options);
    }

    pub fn schedule_async_continuation(&mut self, id: impl Into<TaskId>, options: TaskOptions) {
        self.state = enqueue::enqueue_async_continuation(&self.state, id, options);
    }

    pub fn schedule_fetch(
        &mut self,
        id: impl Into<TaskId>,
        resource: impl Into<String>,
        latency: LogicalTime,
        options: TaskOptions,
    ) {
        self.state = enqueue::enqueue_fetch(&self.state, id, resource, latency, options);
    }

    pub fn schedule_dom_event(
        &mut self,
        id: impl Into<TaskId>,
        event: impl Into<String>,
        delay: Option<LogicalTime>,
        options: TaskOptions,
    ) {
        self.state = enqueue::enqueue_dom_event(&self.state, id, event, delay, options);
    }

    pub fn schedule_animation_frame(&mut self, id: impl Into<TaskId>, options: TaskOptions) {
        self.state = enqueue::enqueue_animation_frame(&self.state, id, options);
    }

    pub fn request_render(&mut self) {
        self.state = render::request_render(&self.state);
    }

    pub fn cancel(&mut self, id: &TaskId) {
        self.state = cancel::cancel_task(&self.state, id);
    }

    pub fn clear_interval(&mut self, handle: &TaskId) {
        self.state = cancel::clear_interval(&self.state, handle);
    }

    pub fn release_due(&mut self) {
        self.state = deferred::release_due(&self.state);
    }

    /// Fires one rule. On error the current state is kept.
    pub fn tick(&mut self) -> Result<Rule> {
        let step = tick::step(&self.state)?;
        self.state = step.state;
        Ok(step.rule)
    }

    pub fn drain_microtasks(&mut self) -> Result<()> {
        self.state = drain::drain_microtasks(&self.state)?;
        Ok(())
    }

    pub fn run(&mut self, limits: RunLimits) -> Result<Run> {
        let outcome = run::run(&self.state, limits)?;
        self.state = outcome.state.clone();
        Ok(outcome)
    }
}
