//! Global status flags and the task admission check.
//!
//! One `GlobalStatus` is owned by each server instance and passed explicitly
//! to the components that need it, so multiple instances (e.g. in tests) do
//! not interfere. All reads and writes happen on the simulation thread; no
//! cross-thread synchronization is needed for these paths.

use std::fmt;
use tracing::{debug, warn};

/// Independent boolean status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    /// The server instance is running.
    Started,
    /// Queued simulation work is not admitted for execution.
    Frozen,
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFlag::Started => write!(f, "started"),
            StatusFlag::Frozen => write!(f, "frozen"),
        }
    }
}

/// Run/pause state for one server instance.
///
/// State machine: `{not started} -> STARTED -> STARTED+FROZEN -> STARTED ->
/// {not started}`. `Frozen` is never observable without `Started`.
#[derive(Debug, Default)]
pub struct GlobalStatus {
    started: bool,
    frozen: bool,
}

impl GlobalStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag. Setting `Frozen` while not started violates the state
    /// machine and is ignored with a warning.
    pub fn set(&mut self, flag: StatusFlag) {
        match flag {
            StatusFlag::Started => self.started = true,
            StatusFlag::Frozen => {
                if !self.started {
                    warn!("ignoring freeze request: server is not started");
                    return;
                }
                self.frozen = true;
            }
        }
        debug!(%flag, "status flag set");
    }

    /// Clear a flag. Clearing `Started` also clears `Frozen` in the same
    /// step so the server is never left wedged.
    pub fn clear(&mut self, flag: StatusFlag) {
        match flag {
            StatusFlag::Started => {
                self.started = false;
                self.frozen = false;
            }
            StatusFlag::Frozen => self.frozen = false,
        }
        debug!(%flag, "status flag cleared");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Admission check for one queued unit of simulation work.
    ///
    /// Returns `true` while frozen, meaning "treat as already satisfied and
    /// skip normal execution". The host's polling loop keeps spinning (so
    /// network and administrative processing stays responsive) but stops
    /// advancing simulation state until unfrozen. This is intentionally a
    /// cooperative pause, never a blocking sleep. Opaque in the task type.
    pub fn can_execute<T>(&self, _task: &T) -> bool {
        self.frozen
    }
}
