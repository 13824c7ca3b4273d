//! Integration tests for breakpoint persistence across sessions.

use tempfile::TempDir;
use tickscope::{
    BreakpointStore, CellPos, MutationKind, ServerDebugger, SessionStore,
};

#[test]
fn save_then_load_reproduces_the_set() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let mut store = BreakpointStore::new();
    let a = store.add(CellPos::new(3, 4, 5), MutationKind::StateChange, Some("diode".into()));
    let b = store.add(CellPos::new(0, 64, 0), MutationKind::ScheduledTick, None);
    store.set_enabled(b, false);
    store.save(&session).unwrap();

    let mut restored = BreakpointStore::new();
    let loaded = restored.load(&session).unwrap();
    assert_eq!(loaded, 2);

    let restored_a = restored.get(a).unwrap();
    assert_eq!(restored_a.pos, CellPos::new(3, 4, 5));
    assert_eq!(restored_a.kind, MutationKind::StateChange);
    assert!(restored_a.enabled);
    assert_eq!(restored_a.name.as_deref(), Some("diode"));

    let restored_b = restored.get(b).unwrap();
    assert!(!restored_b.enabled);
}

#[test]
fn loading_an_empty_session_leaves_the_store_empty() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let mut store = BreakpointStore::new();
    assert_eq!(store.load(&session).unwrap(), 0);
    assert!(store.is_empty());
}

#[test]
fn malformed_entry_is_skipped_and_the_rest_load() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let mut store = BreakpointStore::new();
    store.add(CellPos::new(1, 2, 3), MutationKind::StateChange, None);
    store.save(&session).unwrap();
    session.put_raw(999, b"{ not json").unwrap();

    let mut restored = BreakpointStore::new();
    let loaded = restored.load(&session).unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(restored.len(), 1);
}

#[test]
fn id_allocation_continues_past_loaded_ids() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let mut store = BreakpointStore::new();
    let first = store.add(CellPos::new(0, 0, 0), MutationKind::StateChange, None);
    store.save(&session).unwrap();

    let mut restored = BreakpointStore::new();
    restored.load(&session).unwrap();
    let next = restored.add(CellPos::new(9, 9, 9), MutationKind::ScheduledTick, None);
    assert!(next > first);
}

#[test]
fn debugger_lifecycle_persists_across_restart() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let mut debugger = ServerDebugger::default();
    debugger.start(Some(&session)).unwrap();
    debugger
        .breakpoints_mut()
        .add(CellPos::new(3, 4, 5), MutationKind::StateChange, None);
    debugger.stop(Some(&session)).unwrap();

    // Simulated restart on the same session.
    let mut debugger = ServerDebugger::default();
    debugger.start(Some(&session)).unwrap();
    assert_eq!(debugger.breakpoints().len(), 1);
    let restored = debugger.breakpoints().iter().next().unwrap();
    assert_eq!(restored.pos, CellPos::new(3, 4, 5));
}

#[test]
fn forward_compatible_entries_with_unknown_fields_still_load() {
    let session_dir = TempDir::new().unwrap();
    let session = SessionStore::open(session_dir.path()).unwrap();

    let raw = br#"{"id":7,"pos":{"x":1,"y":2,"z":3},"kind":"scheduled_tick","enabled":true,"added_in_v2":"ignored"}"#;
    session.put_raw(7, raw).unwrap();

    let mut store = BreakpointStore::new();
    assert_eq!(store.load(&session).unwrap(), 1);
}
