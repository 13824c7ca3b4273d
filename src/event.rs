//! Domain mutation events.
//!
//! Domain code constructs a `MutationEvent` describing an about-to-happen
//! mutation and fires it through the debugger *before* committing the
//! mutation, so observers always see "about to change" state, never
//! "already changed". The set of watched mutation kinds is a closed enum so
//! breakpoint evaluation can match exhaustively.

use crate::types::{CellPos, CellState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One about-to-happen state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEvent {
    /// A cell's packed state is about to be replaced.
    StateChange {
        pos: CellPos,
        before: CellState,
        after: CellState,
    },
    /// A cell is about to receive an update from a neighboring cell.
    NeighborUpdate { pos: CellPos, source: CellPos },
    /// A scheduled tick is about to run at a cell.
    ScheduledTick { pos: CellPos },
}

impl MutationEvent {
    /// The cell the mutation targets.
    pub fn pos(&self) -> CellPos {
        match self {
            MutationEvent::StateChange { pos, .. }
            | MutationEvent::NeighborUpdate { pos, .. }
            | MutationEvent::ScheduledTick { pos } => *pos,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            MutationEvent::StateChange { .. } => MutationKind::StateChange,
            MutationEvent::NeighborUpdate { .. } => MutationKind::NeighborUpdate,
            MutationEvent::ScheduledTick { .. } => MutationKind::ScheduledTick,
        }
    }
}

/// Fieldless mirror of `MutationEvent`, used as a breakpoint condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    StateChange,
    NeighborUpdate,
    ScheduledTick,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::StateChange => write!(f, "state_change"),
            MutationKind::NeighborUpdate => write!(f, "neighbor_update"),
            MutationKind::ScheduledTick => write!(f, "scheduled_tick"),
        }
    }
}
