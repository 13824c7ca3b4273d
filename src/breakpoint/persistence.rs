//! Session-backed persistence for breakpoint definitions.

use crate::breakpoint::Breakpoint;
use crate::error::StorageError;
use sled;
use std::path::Path;

const BREAKPOINT_PREFIX: &str = "bp:";

/// Opaque handle to one simulation session's persisted debugger state.
///
/// Backed by a sled database in the session directory. Values are JSON so
/// the format stays forward compatible: unknown fields are ignored on
/// decode, and a malformed entry costs only that entry.
pub struct SessionStore {
    db: sled::Db,
}

impl SessionStore {
    /// Open (or create) the session's debugger database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// The underlying sled database, for advanced operations.
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    fn key_for(id: u32) -> String {
        format!("{BREAKPOINT_PREFIX}{id:08}")
    }

    /// Raw persisted breakpoint entries as (key, bytes) pairs.
    pub(crate) fn read_entries(
        &self,
    ) -> Result<impl Iterator<Item = Result<(String, Vec<u8>), StorageError>> + '_, StorageError>
    {
        Ok(self.db.scan_prefix(BREAKPOINT_PREFIX).map(|entry| {
            let (key, value) = entry?;
            Ok((
                String::from_utf8_lossy(&key).into_owned(),
                value.to_vec(),
            ))
        }))
    }

    /// Replace all persisted breakpoint entries with the given set, then
    /// flush to disk.
    pub(crate) fn replace_entries<'a>(
        &self,
        breakpoints: impl Iterator<Item = &'a Breakpoint>,
    ) -> Result<(), StorageError> {
        let stale: Vec<_> = self
            .db
            .scan_prefix(BREAKPOINT_PREFIX)
            .keys()
            .collect::<Result<_, _>>()?;
        for key in stale {
            self.db.remove(key)?;
        }
        for breakpoint in breakpoints {
            let key = Self::key_for(breakpoint.id.0);
            let value = serde_json::to_vec(breakpoint)?;
            self.db.insert(key.as_bytes(), value)?;
        }
        self.db.flush()?;
        Ok(())
    }

    /// Write a raw entry. Test and recovery tooling only; normal persistence
    /// goes through `BreakpointStore::save`.
    pub fn put_raw(&self, id: u32, value: &[u8]) -> Result<(), StorageError> {
        self.db.insert(Self::key_for(id).as_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }
}
