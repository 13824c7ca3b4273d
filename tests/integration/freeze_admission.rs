//! Integration tests for freeze state and the task admission check.

use tickscope::{GlobalStatus, ServerDebugger, StatusFlag};

#[derive(Debug)]
struct QueuedTask {
    #[allow(dead_code)]
    id: u64,
}

#[test]
fn admission_skips_every_task_while_frozen() {
    let mut debugger = ServerDebugger::default();
    debugger.start(None).unwrap();
    debugger.on_tick_begin();

    assert!(!debugger.can_execute(&QueuedTask { id: 1 }));

    debugger.freeze("operator request");
    for id in 0..16 {
        assert!(debugger.can_execute(&QueuedTask { id }));
    }
    // Task identity is opaque; any type passes through the same gate.
    assert!(debugger.can_execute(&"drain packets"));

    debugger.unfreeze();
    assert!(!debugger.can_execute(&QueuedTask { id: 2 }));
}

#[test]
fn freeze_requires_started() {
    let mut status = GlobalStatus::new();
    status.set(StatusFlag::Frozen);
    assert!(!status.is_frozen());
}

#[test]
fn stopping_while_frozen_leaves_nothing_wedged() {
    let mut debugger = ServerDebugger::default();
    debugger.start(None).unwrap();
    debugger.freeze("breakpoint");
    assert!(debugger.is_frozen());

    debugger.stop(None).unwrap();
    assert!(!debugger.is_started());
    assert!(!debugger.is_frozen());
    assert!(!debugger.can_execute(&QueuedTask { id: 0 }));
}

#[test]
fn restart_follows_the_status_state_machine() {
    let mut debugger = ServerDebugger::default();
    assert!(!debugger.is_started());

    debugger.start(None).unwrap();
    assert!(debugger.is_started() && !debugger.is_frozen());

    debugger.freeze("pause");
    assert!(debugger.is_started() && debugger.is_frozen());

    debugger.unfreeze();
    assert!(debugger.is_started() && !debugger.is_frozen());

    debugger.stop(None).unwrap();
    assert!(!debugger.is_started() && !debugger.is_frozen());
}
