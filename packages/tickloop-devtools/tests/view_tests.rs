use tickloop_core::{QueueKind, SimulatorState, TaskOptions};
use tickloop_devtools::{StateView, explain};
use tickloop_scheduler::*;

#[test]
fn test_view_lists_queues_and_pending() {
    let state = SimulatorState::default();
    let state = enqueue_timer(&state, "late", 30, TaskOptions::new());
    let state = enqueue_timer(&state, "early", 5, TaskOptions::new());
    let state = enqueue_sync(&state, "script", TaskOptions::new().label("main script").cost(2));
    let state = enqueue_microtask(&state, "m", TaskOptions::new());

    let view = StateView::from(&state);
    assert!(view.running.is_none());
    assert_eq!(view.queue(QueueKind::Macrotask).unwrap().tasks[0].label, "main script");
    assert_eq!(view.queue(QueueKind::Microtask).unwrap().tasks[0].kind, "microtask");
    assert!(view.queue(QueueKind::AnimationFrame).unwrap().tasks.is_empty());

    let pending: Vec<&str> = view.pending.iter().map(|p| p.task.id.as_str()).collect();
    assert_eq!(pending, vec!["early", "late"]);
    assert_eq!(view.next_frame_at, 16);

    let state = tick(&tick(&tick(&state).unwrap()).unwrap()).unwrap();
    let view = StateView::from(&state);
    let running = view.running.unwrap();
    assert_eq!(running.task.id, "script");
    assert_eq!(running.remaining_steps, 2);
}

#[test]
fn test_explain_names_rule_and_reason() {
    let state = enqueue_microtask(&SimulatorState::default(), "m", TaskOptions::new().label("resolve"));
    let first = step(&state).unwrap();

    let line = explain(&first);
    assert!(line.contains("[2] drain-microtask"));
    assert!(line.contains("Started microtask 'resolve'"));
    assert!(line.contains(Rule::DrainMicrotask.describe()));

    let done = step(&first.state).unwrap();
    assert!(explain(&done).contains("Completed microtask 'resolve'"));
}

#[test]
fn test_explain_without_log_entry() {
    let state = enqueue_sync(&SimulatorState::default(), "s", TaskOptions::new().cost(2));
    let started = step(&state).unwrap();
    let running = step(&started.state).unwrap();

    assert_eq!(running.rule, Rule::ExecuteStack);
    assert!(running.entries().is_empty());
    assert!(!explain(&running).contains("Started"));
}
