//! Stack-of-stages tracker for one execution context.

use crate::error::ConsistencyError;
use crate::stage::{NewStage, Stage, StageDescriptor, StageKind};
use crate::types::StageId;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Owns the stack of active stages for one server instance.
///
/// The stack is never empty during tick execution and exactly empty between
/// ticks. Push appends as a child of the current leaf; pop must name the kind
/// being removed and fails loudly on a mismatch. Not shared across contexts;
/// all mutation happens on the simulation thread.
pub struct StageTree {
    nodes: HashMap<StageId, Stage>,
    active: Vec<StageId>,
    history: Vec<Stage>,
    history_limit: usize,
    next_id: u64,
}

impl StageTree {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            active: Vec::new(),
            history: Vec::new(),
            history_limit,
            next_id: 1,
        }
    }

    /// Push a new stage as the leaf.
    ///
    /// The declared parent must match the actual current leaf (both `None`
    /// for a root push into an empty tree). A mismatch is a fatal
    /// consistency error: the host's instrumentation points fired out of
    /// order.
    pub fn push(&mut self, stage: NewStage) -> Result<StageId, ConsistencyError> {
        let active = self.active.last().copied();
        if stage.parent != active {
            return Err(ConsistencyError::ParentMismatch {
                declared: stage.parent,
                active,
            });
        }

        let id = StageId(self.next_id);
        self.next_id += 1;

        if let Some(parent_id) = active {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.push(id);
            }
        }

        let node = Stage {
            id,
            kind: stage.kind,
            parent: active,
            children: Vec::new(),
            detail: stage.detail,
        };
        debug!(depth = self.active.len() + 1, stage = %node, "stage tree: push");
        self.nodes.insert(id, node);
        self.active.push(id);
        Ok(id)
    }

    /// Pop the current leaf, which must be of the expected kind.
    ///
    /// Restores the leaf pointer to the popped stage's parent and detaches
    /// the popped stage from its parent's child list. The popped stage is
    /// retained in a bounded history for diagnostics.
    pub fn pop(&mut self, expected: StageKind) -> Result<Stage, ConsistencyError> {
        let leaf_id = match self.active.last() {
            Some(id) => *id,
            None => return Err(ConsistencyError::PopOnEmpty),
        };
        let actual = self
            .nodes
            .get(&leaf_id)
            .map(|stage| stage.kind)
            .ok_or(ConsistencyError::PopOnEmpty)?;
        if actual != expected {
            // A mismatched pop must not mutate anything.
            return Err(ConsistencyError::KindMismatch { expected, actual });
        }

        let stage = self
            .nodes
            .remove(&leaf_id)
            .ok_or(ConsistencyError::PopOnEmpty)?;
        self.active.pop();
        if let Some(parent_id) = stage.parent {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|child| *child != leaf_id);
            }
        }
        debug!(depth = self.active.len(), stage = %stage, "stage tree: pop");

        self.history.push(stage.clone());
        if self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
        Ok(stage)
    }

    /// Forcibly empty the tree. Tick-boundary recovery only, not normal
    /// operation. Returns how many active stages were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.active.len();
        debug!(discarded, "stage tree: clear");
        self.active.clear();
        self.nodes.clear();
        self.history.clear();
        discarded
    }

    /// The current leaf, if any.
    pub fn active_stage(&self) -> Option<&Stage> {
        self.active.last().map(|id| &self.nodes[id])
    }

    /// Snapshot of the active stack, root first.
    pub fn active_stages(&self) -> Vec<&Stage> {
        self.active.iter().map(|id| &self.nodes[id]).collect()
    }

    /// Wire-ready snapshot of the current leaf.
    pub fn active_descriptor(&self) -> Option<StageDescriptor> {
        self.active_stage().map(|stage| StageDescriptor {
            id: stage.id,
            kind: stage.kind,
            detail: stage.detail.clone(),
            depth: self.active.len(),
        })
    }

    pub fn get(&self, id: StageId) -> Option<&Stage> {
        self.nodes.get(&id)
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Recently popped stages, oldest first, bounded by the history limit.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }
}

impl Default for StageTree {
    fn default() -> Self {
        Self::new()
    }
}
