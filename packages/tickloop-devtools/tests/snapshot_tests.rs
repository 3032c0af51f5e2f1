use tickloop_core::{Effect, QueueKind, SimulatorState, TaskKind, TaskOptions, TaskSpec};
use tickloop_devtools::{DevtoolsError, Recorder, SCHEMA_VERSION, Snapshot, TraceSink, round_trip};
use tickloop_scheduler::*;

fn busy_state() -> SimulatorState {
    let state = SimulatorState::default();
    let state = enqueue_sync(
        &state,
        "script",
        TaskOptions::new().cost(2).effect(Effect::spawn(
            TaskSpec::new("then", TaskKind::Promise).effect(Effect::RequestRender),
            QueueKind::Microtask,
        )),
    );
    let state = enqueue_interval(&state, "poll", 12, TaskOptions::new());
    let state = enqueue_timer(&state, "stop", 40, TaskOptions::new().effect(Effect::cancel("poll")));
    let state = enqueue_fetch(&state, "req", "/api/items", 25, TaskOptions::new());
    let state = enqueue_dom_event(&state, "click", "click", Some(7), TaskOptions::new());
    enqueue_animation_frame(&state, "paint", TaskOptions::new())
}

#[test]
fn test_every_snapshot_round_trips() {
    let mut recorder = Recorder::new();
    let outcome = run_with(&busy_state(), RunLimits::default(), |step| {
        recorder.record(step)
    })
    .unwrap();
    assert!(outcome.completed);
    assert_eq!(recorder.len(), outcome.rules.len());

    for snapshot in recorder.snapshots() {
        let restored = round_trip(&snapshot.state).unwrap();
        assert_eq!(restored, snapshot.state);
    }
    assert_eq!(recorder.last().unwrap().state, outcome.state);
}

#[test]
fn test_restored_state_continues_identically() {
    let state = busy_state();
    let mut midway = state.clone();
    for _ in 0..9 {
        midway = tick(&midway).unwrap();
    }

    let restored = round_trip(&midway).unwrap();
    let a = run(&midway, RunLimits::default()).unwrap();
    let b = run(&restored, RunLimits::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_registry_serializes_as_map() {
    let state = busy_state();
    let json: serde_json::Value =
        serde_json::from_str(&Snapshot::capture(&state).to_json().unwrap()).unwrap();

    let registry = json["state"]["registry"].as_object().unwrap();
    assert_eq!(registry.len(), 4);
    assert_eq!(registry["poll"]["ready_at"], 12);
    assert_eq!(registry["poll"]["recurring"], 12);
    assert_eq!(json["schema"], SCHEMA_VERSION);

    let macrotasks = json["state"]["macrotasks"].as_array().unwrap();
    assert_eq!(macrotasks[0]["id"], "script");
}

#[test]
fn test_schema_mismatch_is_rejected() {
    let mut snapshot = Snapshot::capture(&SimulatorState::default());
    snapshot.schema = "something-else".to_string();
    let json = snapshot.to_json_pretty().unwrap();

    match Snapshot::from_json(&json) {
        Err(DevtoolsError::SchemaMismatch { found, .. }) => assert_eq!(found, "something-else"),
        other => panic!("expected schema mismatch, got {other:?}"),
    }
    assert!(matches!(
        Snapshot::from_json("{not json"),
        Err(DevtoolsError::Json(_))
    ));
}
