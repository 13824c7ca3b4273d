//! Integration tests for the tick stage tree and tick boundary hooks.

use tickscope::{ConsistencyError, NewStage, ServerDebugger, StageKind, StageTree};

fn started() -> ServerDebugger {
    let mut debugger = ServerDebugger::default();
    debugger.start(None).unwrap();
    debugger
}

#[test]
fn nested_tick_unwinds_to_empty() {
    let mut debugger = started();
    debugger.on_tick_begin();

    debugger.push_stage_detail(StageKind::World, "overworld").unwrap();
    debugger.push_stage(StageKind::ScheduledTick).unwrap();
    debugger.push_stage(StageKind::BlockUpdate).unwrap();
    assert_eq!(debugger.tree().depth(), 4);

    let descriptor = debugger.active_stage_descriptor().unwrap();
    assert_eq!(descriptor.kind, StageKind::BlockUpdate);
    assert_eq!(descriptor.depth, 4);

    debugger.pop_stage(StageKind::BlockUpdate).unwrap();
    debugger.pop_stage(StageKind::ScheduledTick).unwrap();
    debugger.pop_stage(StageKind::World).unwrap();
    debugger.on_tick_end().unwrap();
    assert!(debugger.tree().is_empty());
}

#[test]
fn mismatched_pop_is_fatal_and_preserves_the_tree() {
    let mut debugger = started();
    debugger.on_tick_begin();
    debugger.push_stage(StageKind::World).unwrap();

    let err = debugger.pop_stage(StageKind::Entity).unwrap_err();
    assert!(matches!(err, ConsistencyError::KindMismatch { .. }));
    // The failed pop must not have removed anything.
    assert_eq!(debugger.tree().depth(), 2);
}

#[test]
fn active_stages_snapshot_is_root_first() {
    let mut debugger = started();
    debugger.on_tick_begin();
    debugger.push_stage(StageKind::World).unwrap();
    debugger.push_stage(StageKind::Entity).unwrap();

    let kinds: Vec<StageKind> = debugger
        .tree()
        .active_stages()
        .iter()
        .map(|stage| stage.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![StageKind::ServerRoot, StageKind::World, StageKind::Entity]
    );
}

#[test]
fn with_stage_pops_even_when_the_closure_reports_failure() {
    let mut debugger = started();
    debugger.on_tick_begin();

    let result: Result<(), &str> = debugger
        .with_stage(StageKind::World, |_| Err("world tick failed"))
        .unwrap();
    assert!(result.is_err());
    assert_eq!(debugger.tree().depth(), 1);
    debugger.on_tick_end().unwrap();
}

#[test]
fn raw_tree_rejects_interleaved_instrumentation() {
    let mut tree = StageTree::new();
    let root = tree.push(NewStage::root(StageKind::ServerRoot)).unwrap();
    tree.push(NewStage::child_of(root, StageKind::World)).unwrap();

    // A push declaring the root as parent while the world stage is active
    // means two instrumentation points interleaved.
    let err = tree
        .push(NewStage::child_of(root, StageKind::ScheduledTick))
        .unwrap_err();
    assert!(matches!(err, ConsistencyError::ParentMismatch { .. }));
}

#[test]
fn popped_stages_land_in_history() {
    let mut debugger = started();
    debugger.on_tick_begin();
    debugger.push_stage(StageKind::World).unwrap();
    debugger.pop_stage(StageKind::World).unwrap();
    debugger.on_tick_end().unwrap();

    let kinds: Vec<StageKind> = debugger
        .tree()
        .history()
        .iter()
        .map(|stage| stage.kind)
        .collect();
    assert_eq!(kinds, vec![StageKind::World, StageKind::ServerRoot]);
}
