//! Tick Stage Tree
//!
//! Represents one tick's work as an explicit tree of nested stages. The host
//! pushes a stage when it enters a sub-phase (world tick, scheduled ticks,
//! block updates, ...) and pops it when the sub-phase completes. Keeping this
//! as an explicit stack, rather than implicit call-stack state, lets a freeze
//! snapshot "where we are" and hand it to remote clients without any stack
//! unwinding support from the host.

pub mod tree;

pub use tree::StageTree;

use crate::types::StageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of stage kinds the host instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Root of every tick; pushed at tick begin, popped at tick end.
    ServerRoot,
    /// One world's per-tick work.
    World,
    /// Scheduled tick processing for one world.
    ScheduledTick,
    /// A cascading block update.
    BlockUpdate,
    /// A queued block event.
    BlockEvent,
    /// Entity ticking.
    Entity,
    /// Network packet processing interleaved with the tick.
    Network,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::ServerRoot => "server_root",
            StageKind::World => "world",
            StageKind::ScheduledTick => "scheduled_tick",
            StageKind::BlockUpdate => "block_update",
            StageKind::BlockEvent => "block_event",
            StageKind::Entity => "entity",
            StageKind::Network => "network",
        };
        write!(f, "{name}")
    }
}

/// One nested unit of tick work, owned by the tree.
///
/// `children` reflects exactly the stages pushed while this stage was the
/// active leaf and not yet popped.
#[derive(Debug, Clone)]
pub struct Stage {
    pub id: StageId,
    pub kind: StageKind,
    pub parent: Option<StageId>,
    pub children: Vec<StageId>,
    pub detail: Option<String>,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}[{}]({})", self.kind, self.id, detail),
            None => write!(f, "{}[{}]", self.kind, self.id),
        }
    }
}

/// Serializable snapshot of a stage, used in interrupt wire messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub id: StageId,
    pub kind: StageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Depth in the active stack at snapshot time (root = 1).
    pub depth: usize,
}

/// A push request: the stage to create plus the parent the caller believes
/// is active. The tree rejects the push if the declared parent does not match
/// the actual leaf, which guards against interleaved or out-of-order
/// instrumentation in the host.
#[derive(Debug, Clone)]
pub struct NewStage {
    pub kind: StageKind,
    pub parent: Option<StageId>,
    pub detail: Option<String>,
}

impl NewStage {
    /// A root stage; only valid to push into an empty tree.
    pub fn root(kind: StageKind) -> Self {
        Self {
            kind,
            parent: None,
            detail: None,
        }
    }

    /// A child of the given stage, which must be the active leaf at push time.
    pub fn child_of(parent: StageId, kind: StageKind) -> Self {
        Self {
            kind,
            parent: Some(parent),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
