mod common;

use common::{run_steps, started};
use tickloop_core::{
    Effect, Location, LogCategory, NestedTimerPolicy, QueueKind, SimulatorConfig, SimulatorState,
    StateOptions, TaskKind, TaskOptions, TaskSpec, TaskState,
};
use tickloop_scheduler::*;

#[test]
fn test_interval_rearms_with_same_id() {
    const DELAY: u64 = 10;
    const FIRINGS: usize = 5;

    let mut state = enqueue_interval(&SimulatorState::default(), "iv", DELAY, TaskOptions::new());
    let id = "iv".into();
    let mut release_times = Vec::new();

    while release_times.len() < FIRINGS {
        let next = step(&state).unwrap();
        if next.rule == Rule::AdvanceTime {
            assert_eq!(next.state.macrotasks.len(), 1);
            assert_eq!(next.state.macrotasks.peek().unwrap().id(), &id);
            release_times.push(next.state.now);
        }
        // Exactly one live registration at all times
        assert_eq!(next.state.registry.len(), 1);
        assert!(next.state.registry.contains(&id));
        state = next.state;
    }

    assert_eq!(release_times, vec![10, 20, 30, 40, 50]);

    let released = state
        .log
        .iter()
        .filter(|e| e.category == LogCategory::Enqueue && e.message.starts_with("Released"))
        .count();
    assert_eq!(released, FIRINGS);
}

#[test]
fn test_interval_rearm_gets_fresh_sequence() {
    let state = enqueue_interval(&SimulatorState::default(), "iv", 5, TaskOptions::new());
    let first_seq = state.registry.get(&"iv".into()).unwrap().task.enqueue_seq();

    let state = tick(&state).unwrap();
    let rearmed = state.registry.get(&"iv".into()).unwrap();
    let released = state.macrotasks.peek().unwrap();

    assert_eq!(released.enqueue_seq(), first_seq);
    assert_eq!(released.state, TaskState::Queued);
    assert!(rearmed.task.enqueue_seq() > first_seq);
    assert_eq!(rearmed.task.state, TaskState::WaitingOnDeferred);
    assert_eq!(rearmed.ready_at, 10);
    assert_eq!(rearmed.recurring, Some(5));
}

#[test]
fn test_interval_canceled_by_effect() {
    let state = enqueue_interval(&SimulatorState::default(), "iv", 10, TaskOptions::new());
    let state = enqueue_timer(
        &state,
        "stop",
        35,
        TaskOptions::new().effect(Effect::cancel("iv")),
    );

    let outcome = run(&state, RunLimits::default()).unwrap();
    assert!(outcome.completed);
    assert_eq!(started(&outcome.state), vec!["iv", "iv", "iv", "stop"]);
    assert_eq!(outcome.state.now, 35);
    assert!(outcome.state.registry.is_empty());

    let cancel = outcome
        .state
        .log
        .iter()
        .find(|e| e.meta_str("effect") == Some("cancel-deferred"))
        .unwrap();
    assert_eq!(cancel.task_id, Some("iv".into()));
    assert_eq!(cancel.meta_str("state"), Some("canceled"));
}

#[test]
fn test_cancel_of_unknown_operation_is_noop() {
    let state = enqueue_sync(
        &SimulatorState::default(),
        "script",
        TaskOptions::new().effect(Effect::cancel("ghost")),
    );
    let outcome = run(&state, RunLimits::default()).unwrap();
    assert!(outcome.completed);
    assert!(
        !outcome
            .state
            .log
            .iter()
            .any(|e| e.message.starts_with("Canceled"))
    );
}

#[test]
fn test_clear_interval_and_cancel_task() {
    let state = enqueue_interval(&SimulatorState::default(), "iv", 10, TaskOptions::new());
    let state = enqueue_microtask(&state, "m", TaskOptions::new());
    assert_eq!(state.locate(&"iv".into()), Some(Location::Registry));
    assert_eq!(
        state.locate(&"m".into()),
        Some(Location::Queue(QueueKind::Microtask))
    );

    let cleared = clear_interval(&state, &"iv".into());
    assert!(cleared.registry.is_empty());

    let canceled = cancel_task(&cleared, &"m".into());
    assert!(canceled.microtasks.is_empty());
    assert_eq!(canceled.locate(&"m".into()), None);
    let entry = canceled.log.last().unwrap();
    assert_eq!(entry.category, LogCategory::User);
    assert_eq!(entry.meta_str("from"), Some("microtask"));
    assert_eq!(entry.meta_str("state"), Some("canceled"));
    assert_eq!(cleared.log.last().unwrap().meta_str("state"), Some("canceled"));

    // Unknown ids change nothing but the snapshot identity
    let again = cancel_task(&canceled, &"nope".into());
    assert_eq!(again, canceled);
}

#[test]
fn test_release_due_is_explicit() {
    let state = enqueue_timer(&SimulatorState::default(), "t", 0, TaskOptions::new());
    let released = release_due(&state);
    assert!(released.registry.is_empty());
    assert_eq!(common::queue_ids(&released), vec!["t"]);
    assert_eq!(released.now, 0);

    // Not yet due
    let later = enqueue_timer(&SimulatorState::default(), "t", 5, TaskOptions::new());
    assert_eq!(release_due(&later).registry.len(), 1);
}

fn parent_spawning_timer(policy: NestedTimerPolicy) -> SimulatorState {
    let child = TaskSpec::new("child", TaskKind::timer(50));
    let state = SimulatorState::with_config(
        StateOptions::default(),
        SimulatorConfig {
            nested_timers: policy,
        },
    );
    enqueue_sync(
        &state,
        "parent",
        TaskOptions::new().effect(Effect::spawn(child, QueueKind::Macrotask)),
    )
}

#[test]
fn test_nested_timer_deferred_policy() {
    let outcome = run(
        &parent_spawning_timer(NestedTimerPolicy::Deferred),
        RunLimits::default(),
    )
    .unwrap();
    assert_eq!(started(&outcome.state), vec!["parent", "child"]);
    assert_eq!(outcome.state.now, 50);
}

#[test]
fn test_nested_timer_immediate_policy() {
    let outcome = run(
        &parent_spawning_timer(NestedTimerPolicy::Immediate),
        RunLimits::default(),
    )
    .unwrap();
    assert_eq!(started(&outcome.state), vec!["parent", "child"]);
    assert_eq!(outcome.state.now, 0);
}

#[test]
fn test_time_only_moves_on_advance() {
    let state = enqueue_timer(&SimulatorState::default(), "a", 7, TaskOptions::new().cost(3));
    let state = enqueue_sync(&state, "b", TaskOptions::new().cost(2));

    let steps = run_steps(&state, 50);
    let mut now = state.now;
    for s in &steps {
        if s.rule != Rule::AdvanceTime {
            assert_eq!(s.state.now, now, "{} moved time", s.rule);
        }
        assert!(s.state.now >= now);
        now = s.state.now;
    }
    assert_eq!(now, 7);
}

#[test]
fn test_reused_deferred_id_logs_dropped_task() {
    let state = SimulatorState::default();
    let state = enqueue_timer(&state, "t", 10, TaskOptions::new().label("first"));
    let state = enqueue_timer(&state, "t", 20, TaskOptions::new().label("second"));

    assert_eq!(state.registry.len(), 1);
    let dropped = state.log.last().unwrap();
    assert_eq!(dropped.category, LogCategory::User);
    assert_eq!(dropped.task_id, Some("t".into()));
    assert!(dropped.message.contains("'first'"));
    assert_eq!(dropped.meta_str("level"), Some("warn"));
    assert_eq!(dropped.meta_str("state"), Some("canceled"));
    let metadata = dropped.metadata.as_ref().unwrap();
    assert_eq!(metadata["seq"], 1);
    assert_eq!(metadata["replaced_by"], 2);

    let outcome = run(&state, RunLimits::default()).unwrap();
    assert_eq!(started(&outcome.state), vec!["t"]);
    assert_eq!(outcome.state.now, 20);
    let start = outcome
        .state
        .log
        .iter()
        .find(|e| e.category == LogCategory::TaskStart)
        .unwrap();
    assert!(start.message.contains("'second'"));
}
