use tickloop_core::{StateOptions, TaskOptions};
use tickloop_scheduler::{Rule, SchedulerError, Simulator};

#[test]
fn test_scheduler_yielding() {
    let mut scheduler = Simulator::new(StateOptions::default());

    // Initially idle, and ticking an idle loop only reports completion
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.tick().unwrap(), Rule::Complete);

    scheduler.schedule_microtask("m", TaskOptions::new());
    assert!(!scheduler.is_idle());

    assert_eq!(scheduler.tick().unwrap(), Rule::DrainMicrotask);
    assert_eq!(scheduler.tick().unwrap(), Rule::ExecuteStack);
    assert!(scheduler.is_idle());
}

#[test]
fn test_running_task_is_not_preempted() {
    let mut scheduler = Simulator::new(StateOptions::default());
    scheduler.schedule_sync("script", TaskOptions::new().cost(3));

    assert_eq!(scheduler.tick().unwrap(), Rule::ExecuteMacrotask);

    // A microtask arriving mid-task waits for the frame to finish
    scheduler.schedule_microtask("m", TaskOptions::new());
    assert_eq!(scheduler.tick().unwrap(), Rule::ExecuteStack);
    assert_eq!(scheduler.state().running().unwrap().remaining_steps, 2);
    assert_eq!(scheduler.tick().unwrap(), Rule::ExecuteStack);
    assert_eq!(scheduler.tick().unwrap(), Rule::ExecuteStack);
    assert!(scheduler.state().call_stack.is_empty());

    assert_eq!(scheduler.tick().unwrap(), Rule::DrainMicrotask);
}

#[test]
fn test_snapshots_are_independent() {
    let mut scheduler = Simulator::new(StateOptions::default());
    scheduler.schedule_sync("script", TaskOptions::new());
    let before = scheduler.snapshot();

    scheduler.tick().unwrap();
    assert_ne!(&before, scheduler.state());
    assert_eq!(before.macrotasks.len(), 1);
    assert!(before.call_stack.is_empty());
}

#[test]
fn test_corrupt_frame_is_rejected() {
    let mut scheduler = Simulator::new(StateOptions::default());
    scheduler.schedule_sync("script", TaskOptions::new());
    scheduler.tick().unwrap();

    let mut state = scheduler.snapshot();
    if let Some(frame) = state.call_stack.top_mut() {
        frame.remaining_steps = 0;
    }
    let mut broken = Simulator::from_state(state.clone());

    let err = broken.tick().unwrap_err();
    assert_eq!(
        err,
        SchedulerError::CorruptFrame {
            task: "script".into()
        }
    );
    // Nothing was applied
    assert_eq!(broken.state(), &state);
}

#[test]
fn test_stacked_frames_are_invalid() {
    let mut scheduler = Simulator::new(StateOptions::default());
    scheduler.schedule_sync("a", TaskOptions::new().cost(2));
    scheduler.tick().unwrap();

    let mut state = scheduler.snapshot();
    let frame = state.call_stack.top().cloned().unwrap();
    state.call_stack.push(frame);

    let err = tickloop_scheduler::tick(&state).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidState { .. }));
    assert!(err.to_string().contains("2 frames"));
}
