//! Server-side debugger context.
//!
//! `ServerDebugger` owns the stage tree, breakpoint store, status flags, and
//! interrupt broadcaster for one server instance. It is passed explicitly to
//! every collaborator that needs it, so multiple instances (e.g. in tests)
//! never interfere. All methods are called from the simulation thread.

use crate::breakpoint::{BreakpointStore, SessionStore};
use crate::config::{DebuggerConfig, Side};
use crate::error::{ConsistencyError, DebugError};
use crate::event::MutationEvent;
use crate::interrupt::{Interrupt, InterruptBroadcaster, InterruptSink};
use crate::stage::{NewStage, StageDescriptor, StageKind, StageTree};
use crate::status::{GlobalStatus, StatusFlag};
use crate::types::StageId;
use tracing::{debug, error, info};

/// Armed step-over / step-into state.
#[derive(Default)]
struct StepState {
    over_until: Option<StageId>,
    over_callback: Option<Box<dyn FnOnce()>>,
    into_armed: bool,
    into_callback: Option<Box<dyn FnOnce()>>,
}

impl StepState {
    fn armed(&self) -> bool {
        self.into_armed || self.over_until.is_some()
    }

    fn reset(&mut self) {
        self.over_until = None;
        self.over_callback = None;
        self.into_armed = false;
        self.into_callback = None;
    }
}

/// Debugging state for one running server instance.
pub struct ServerDebugger {
    config: DebuggerConfig,
    status: GlobalStatus,
    tree: StageTree,
    breakpoints: BreakpointStore,
    broadcaster: InterruptBroadcaster,
    step: StepState,
    ticks: u64,
}

impl ServerDebugger {
    pub fn new(config: DebuggerConfig) -> Self {
        let tree = StageTree::with_history_limit(config.history_limit);
        Self {
            config,
            status: GlobalStatus::new(),
            tree,
            breakpoints: BreakpointStore::new(),
            broadcaster: InterruptBroadcaster::new(),
            step: StepState::default(),
            ticks: 0,
        }
    }

    /// Whether instrumentation hooks should do anything on this context.
    fn instrumenting(&self) -> bool {
        self.config.enabled && self.config.side == Side::Server
    }

    // ---- lifecycle -------------------------------------------------------

    /// Start the server instance: restore persisted breakpoints (if a
    /// session is given) and set `Started`.
    pub fn start(&mut self, session: Option<&SessionStore>) -> Result<(), DebugError> {
        if let Some(session) = session {
            let loaded = self.breakpoints.load(session)?;
            info!(loaded, "restored breakpoints from session");
        }
        self.status.set(StatusFlag::Started);
        Ok(())
    }

    /// Stop the server instance: persist breakpoints so in-progress
    /// debugging setup survives a restart, cancel armed steps, and clear
    /// `Started` (which clears `Frozen` with it).
    pub fn stop(&mut self, session: Option<&SessionStore>) -> Result<(), DebugError> {
        if let Some(session) = session {
            self.breakpoints.save(session)?;
        }
        self.step.reset();
        self.status.clear(StatusFlag::Started);
        Ok(())
    }

    // ---- tick boundary hooks --------------------------------------------

    /// Called once at the point the host begins per-tick work.
    ///
    /// A non-empty tree here means the previous tick did not cleanly unwind.
    /// That is logged as an anomaly and the tree is forcibly cleared; server
    /// availability wins over debugger precision. Every tick begin then
    /// broadcasts a tree-reset interrupt and pushes the root stage.
    pub fn on_tick_begin(&mut self) {
        if !self.instrumenting() {
            return;
        }
        self.ticks += 1;

        if !self.tree.is_empty() {
            let stages: Vec<String> = self
                .tree
                .active_stages()
                .iter()
                .map(|stage| stage.to_string())
                .collect();
            error!(?stages, "stage tree not empty at tick begin; clearing");
            if self.step.armed() {
                self.step.reset();
                self.status.clear(StatusFlag::Frozen);
            }
            self.tree.clear();
        }

        self.broadcaster.broadcast(&Interrupt::tree_reset());
        if let Err(err) = self.tree.push(NewStage::root(StageKind::ServerRoot)) {
            error!(error = %err, "root stage push failed on empty tree");
        }
    }

    /// Called once at the point the host finishes per-tick bookkeeping.
    ///
    /// Pops the root stage; any stage left active afterwards (or a leaf that
    /// is not the root) is a fatal consistency error.
    pub fn on_tick_end(&mut self) -> Result<(), ConsistencyError> {
        if !self.instrumenting() {
            return Ok(());
        }
        self.tree.pop(StageKind::ServerRoot)?;
        if !self.tree.is_empty() {
            return Err(ConsistencyError::TreeNotEmpty {
                remaining: self.tree.depth(),
            });
        }
        Ok(())
    }

    // ---- stage hooks -----------------------------------------------------

    /// Enter a sub-phase of the current tick.
    pub fn push_stage(&mut self, kind: StageKind) -> Result<(), ConsistencyError> {
        self.push_stage_inner(kind, None)
    }

    /// Enter a sub-phase with a human-readable detail (world name, cell
    /// position, ...).
    pub fn push_stage_detail(
        &mut self,
        kind: StageKind,
        detail: impl Into<String>,
    ) -> Result<(), ConsistencyError> {
        self.push_stage_inner(kind, Some(detail.into()))
    }

    fn push_stage_inner(
        &mut self,
        kind: StageKind,
        detail: Option<String>,
    ) -> Result<(), ConsistencyError> {
        if !self.instrumenting() {
            return Ok(());
        }
        let mut stage = match self.tree.active_stage() {
            Some(parent) => NewStage::child_of(parent.id, kind),
            None => NewStage::root(kind),
        };
        stage.detail = detail;
        self.tree.push(stage)?;

        // World-provider pushes do not count as a step-into target.
        if self.step.into_armed && kind != StageKind::World {
            self.step.into_armed = false;
            if let Some(callback) = self.step.into_callback.take() {
                callback();
            }
            debug!(stage = ?self.tree.active_descriptor(), "step into hit");
            self.freeze("step-into");
            let interrupt = Interrupt::new(None, self.tree.active_descriptor(), false);
            self.broadcaster.broadcast(&interrupt);
        }
        Ok(())
    }

    /// Leave the current sub-phase, which must be of the given kind.
    pub fn pop_stage(&mut self, kind: StageKind) -> Result<(), ConsistencyError> {
        if !self.instrumenting() {
            return Ok(());
        }
        let popped = self.tree.pop(kind)?;

        if self.step.over_until == Some(popped.id) {
            self.step.over_until = None;
            if let Some(callback) = self.step.over_callback.take() {
                callback();
            }
            debug!(stage = %popped, "step over hit");
            self.freeze("step-over");
            let descriptor = StageDescriptor {
                id: popped.id,
                kind: popped.kind,
                detail: popped.detail.clone(),
                depth: self.tree.depth() + 1,
            };
            let interrupt = Interrupt::new(None, Some(descriptor), false);
            self.broadcaster.broadcast(&interrupt);
        }
        Ok(())
    }

    /// Push, run the closure, pop. The pop runs even when the closure's
    /// result is an error value; stage accounting must stay balanced.
    pub fn with_stage<R>(
        &mut self,
        kind: StageKind,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, ConsistencyError> {
        self.push_stage(kind)?;
        let out = f(&mut *self);
        self.pop_stage(kind)?;
        Ok(out)
    }

    // ---- mutation hook ---------------------------------------------------

    /// Fire a mutation event, strictly before the mutation is committed.
    ///
    /// No-op unless instrumentation is enabled, this is the authoritative
    /// server side, and the server is started. On one or more breakpoint
    /// matches this freezes the server and broadcasts exactly one interrupt
    /// per firing, carrying the first match's id and the currently active
    /// stage.
    pub fn fire(&mut self, event: &MutationEvent) {
        if !self.instrumenting() || !self.status.is_started() {
            return;
        }
        let first = {
            let matched = self.breakpoints.evaluate(event);
            if matched.is_empty() {
                return;
            }
            matched[0].id
        };

        info!(
            breakpoint = %first,
            pos = %event.pos(),
            kind = %event.kind(),
            "breakpoint hit; freezing"
        );
        self.status.set(StatusFlag::Frozen);
        let interrupt = Interrupt::new(Some(first), self.tree.active_descriptor(), false);
        self.broadcaster.broadcast(&interrupt);
    }

    // ---- freeze control --------------------------------------------------

    /// Freeze the server. Queued simulation work stops being admitted while
    /// the host loop keeps polling.
    pub fn freeze(&mut self, reason: &str) {
        info!(reason, "freezing server");
        self.status.set(StatusFlag::Frozen);
    }

    /// Clear the freeze and notify observers that the server is resuming.
    /// Admission resumes on the host's next poll.
    pub fn unfreeze(&mut self) {
        if !self.status.is_frozen() {
            return;
        }
        info!("unfreezing server");
        self.status.clear(StatusFlag::Frozen);
        self.broadcaster.broadcast(&Interrupt::resume());
    }

    /// Arm a step-over on the currently active stage and resume. When that
    /// exact stage is popped the callback runs and the server re-freezes.
    /// Returns false (and arms nothing) when no stage is active.
    pub fn step_over(&mut self, callback: impl FnOnce() + 'static) -> bool {
        let target = match self.tree.active_stage() {
            Some(stage) => stage.id,
            None => return false,
        };
        self.step.over_until = Some(target);
        self.step.over_callback = Some(Box::new(callback));
        self.step.into_armed = false;
        self.step.into_callback = None;
        self.status.clear(StatusFlag::Frozen);
        true
    }

    /// Arm a step-into and resume. The next pushed stage (world-provider
    /// pushes excepted) runs the callback and re-freezes the server.
    pub fn step_into(&mut self, callback: impl FnOnce() + 'static) {
        self.step.over_until = None;
        self.step.over_callback = None;
        self.step.into_armed = true;
        self.step.into_callback = Some(Box::new(callback));
        self.status.clear(StatusFlag::Frozen);
    }

    // ---- queries ---------------------------------------------------------

    /// Admission check for one queued unit of simulation work. True means
    /// "treat as already satisfied; skip normal execution".
    pub fn can_execute<T>(&self, task: &T) -> bool {
        self.status.can_execute(task)
    }

    pub fn is_frozen(&self) -> bool {
        self.status.is_frozen()
    }

    pub fn is_started(&self) -> bool {
        self.status.is_started()
    }

    /// Ticks instrumented since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn active_stage_descriptor(&self) -> Option<StageDescriptor> {
        self.tree.active_descriptor()
    }

    pub fn tree(&self) -> &StageTree {
        &self.tree
    }

    pub fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    pub fn breakpoints_mut(&mut self) -> &mut BreakpointStore {
        &mut self.breakpoints
    }

    pub fn add_sink(&mut self, sink: Box<dyn InterruptSink>) {
        self.broadcaster.add_sink(sink);
    }

    pub fn remove_sink(&mut self, name: &str) -> bool {
        self.broadcaster.remove_sink(name)
    }

    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }
}

impl Default for ServerDebugger {
    fn default() -> Self {
        Self::new(DebuggerConfig::default())
    }
}
