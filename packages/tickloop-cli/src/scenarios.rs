use clap::ValueEnum;
use tickloop_core::{Effect, QueueKind, SimulatorState, TaskKind, TaskOptions, TaskSpec};
use tickloop_scheduler::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Script, zero-delay timeout and a promise reaction
    Basics,
    /// Three timers registered out of order
    Timers,
    /// An interval stopped by a later timer
    Interval,
    /// A chain of microtasks that spawn microtasks
    Microtasks,
    /// Invalidation, rendering and animation-frame callbacks
    Frames,
    /// A fetch racing a click and an await continuation
    Network,
}

impl Scenario {
    pub fn build(self, base: SimulatorState) -> SimulatorState {
        match self {
            Scenario::Basics => basics(base),
            Scenario::Timers => timers(base),
            Scenario::Interval => interval(base),
            Scenario::Microtasks => microtasks(base),
            Scenario::Frames => frames(base),
            Scenario::Network => network(base),
        }
    }
}

fn basics(state: SimulatorState) -> SimulatorState {
    let state = enqueue_sync(
        &state,
        "script",
        TaskOptions::new()
            .label("main script")
            .cost(2)
            .effect(Effect::log("console.log('sync')")),
    );
    let state = enqueue_timer(
        &state,
        "timeout",
        0,
        TaskOptions::new()
            .label("setTimeout(cb, 0)")
            .effect(Effect::log("console.log('timeout')")),
    );
    enqueue_promise(
        &state,
        "then",
        TaskOptions::new()
            .label("Promise.resolve().then(cb)")
            .effect(Effect::log("console.log('promise')")),
    )
}

fn timers(state: SimulatorState) -> SimulatorState {
    let state = enqueue_timer(&state, "t100", 100, TaskOptions::new().label("setTimeout 100"));
    let state = enqueue_timer(&state, "t50", 50, TaskOptions::new().label("setTimeout 50"));
    enqueue_timer(&state, "t200", 200, TaskOptions::new().label("setTimeout 200"))
}

fn interval(state: SimulatorState) -> SimulatorState {
    let state = enqueue_interval(
        &state,
        "poll",
        10,
        TaskOptions::new()
            .label("setInterval(poll, 10)")
            .effect(Effect::log("poll")),
    );
    enqueue_timer(
        &state,
        "stop",
        45,
        TaskOptions::new()
            .label("clearInterval after 45")
            .effect(Effect::cancel("poll")),
    )
}

fn microtasks(state: SimulatorState) -> SimulatorState {
    let third = TaskSpec::new("m3", TaskKind::Microtask).label("queueMicrotask #3");
    let second = TaskSpec::new("m2", TaskKind::Microtask)
        .label("queueMicrotask #2")
        .effect(Effect::spawn(third, QueueKind::Microtask));
    let state = enqueue_timer(&state, "timeout", 0, TaskOptions::new().label("setTimeout(cb, 0)"));
    enqueue_microtask(
        &state,
        "m1",
        TaskOptions::new()
            .label("queueMicrotask #1")
            .effect(Effect::spawn(second, QueueKind::Microtask)),
    )
}

fn frames(state: SimulatorState) -> SimulatorState {
    let state = enqueue_dom_event(
        &state,
        "input",
        "input",
        Some(4),
        TaskOptions::new()
            .label("input handler")
            .effect(Effect::RequestRender)
            .effect(Effect::spawn(
                TaskSpec::new("raf", TaskKind::AnimationFrame).label("requestAnimationFrame"),
                QueueKind::AnimationFrame,
            )),
    );
    enqueue_timer(&state, "late", 40, TaskOptions::new().label("setTimeout 40"))
}

fn network(state: SimulatorState) -> SimulatorState {
    let resume = TaskSpec::new("resume", TaskKind::AsyncContinuation).label("await fetch(...)");
    let state = enqueue_fetch(
        &state,
        "fetch",
        "/api/items",
        30,
        TaskOptions::new()
            .label("fetch('/api/items')")
            .effect(Effect::spawn(resume, QueueKind::Microtask)),
    );
    enqueue_dom_event(
        &state,
        "click",
        "click",
        None,
        TaskOptions::new()
            .label("click handler")
            .effect(Effect::log("clicked")),
    )
}
