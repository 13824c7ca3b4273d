//! Breakpoint Store
//!
//! Persisted watch conditions. A breakpoint names a cell position and a
//! mutation kind; when a fired event matches an enabled breakpoint, the
//! server freezes and observers are notified. The set survives restarts via
//! the session store.

pub mod persistence;

pub use persistence::SessionStore;

use crate::error::StorageError;
use crate::event::{MutationEvent, MutationKind};
use crate::types::{BreakpointId, CellPos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One persisted watch condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: BreakpointId,
    pub pos: CellPos,
    pub kind: MutationKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Breakpoint {
    /// Whether this breakpoint matches a fired event: enabled, same target
    /// cell, same mutation kind.
    pub fn matches(&self, event: &MutationEvent) -> bool {
        self.enabled && self.pos == event.pos() && self.kind == event.kind()
    }
}

/// In-memory set of breakpoints, keyed by stable id.
#[derive(Debug)]
pub struct BreakpointStore {
    entries: BTreeMap<BreakpointId, Breakpoint>,
    next_id: u32,
}

impl Default for BreakpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakpointStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a new enabled breakpoint and return its id.
    pub fn add(&mut self, pos: CellPos, kind: MutationKind, name: Option<String>) -> BreakpointId {
        let id = BreakpointId(self.next_id);
        self.next_id += 1;
        let breakpoint = Breakpoint {
            id,
            pos,
            kind,
            enabled: true,
            name,
        };
        debug!(%id, %pos, %kind, "breakpoint added");
        self.entries.insert(id, breakpoint);
        id
    }

    pub fn remove(&mut self, id: BreakpointId) -> Option<Breakpoint> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: BreakpointId) -> Option<&Breakpoint> {
        self.entries.get(&id)
    }

    /// Returns false if the id is unknown.
    pub fn set_enabled(&mut self, id: BreakpointId, enabled: bool) -> bool {
        match self.entries.get_mut(&id) {
            Some(breakpoint) => {
                breakpoint.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enabled breakpoints matching a fired event.
    ///
    /// The common case is an empty store; short-circuit before touching any
    /// condition so the hot path stays cheap.
    pub fn evaluate(&self, event: &MutationEvent) -> Vec<&Breakpoint> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        self.entries
            .values()
            .filter(|breakpoint| breakpoint.matches(event))
            .collect()
    }

    /// Restore the set from the session store.
    ///
    /// Absent data leaves the store empty. A malformed entry is skipped with
    /// a warning; losing one breakpoint is preferable to losing the whole
    /// debugging session. Returns the number of breakpoints loaded.
    pub fn load(&mut self, session: &SessionStore) -> Result<usize, StorageError> {
        self.entries.clear();
        let mut highest = 0;
        for entry in session.read_entries()? {
            let (key, raw) = entry?;
            match serde_json::from_slice::<Breakpoint>(&raw) {
                Ok(breakpoint) => {
                    highest = highest.max(breakpoint.id.0);
                    self.entries.insert(breakpoint.id, breakpoint);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "skipping malformed breakpoint entry");
                }
            }
        }
        self.next_id = highest + 1;
        debug!(count = self.entries.len(), "breakpoints loaded from session");
        Ok(self.entries.len())
    }

    /// Persist the current set to the session store, replacing whatever was
    /// there. Called at minimum on server stop.
    pub fn save(&self, session: &SessionStore) -> Result<(), StorageError> {
        session.replace_entries(self.entries.values())?;
        debug!(count = self.entries.len(), "breakpoints saved to session");
        Ok(())
    }
}
