//! Tickscope: Tick-Stage Debugging Instrumentation
//!
//! Instruments a tick-based simulation server so external debugging clients
//! can freeze execution at well-defined points, inspect the nested structure
//! of the current tick's work, and be notified when watched state mutations
//! occur. The host's tick loop, task queue, world storage, and network
//! transport stay outside this crate; it plugs in through a small set of
//! hooks (`on_tick_begin`/`on_tick_end`, stage push/pop, `fire`,
//! `can_execute`) on an explicitly owned [`server::ServerDebugger`].

pub mod breakpoint;
pub mod config;
pub mod error;
pub mod event;
pub mod interrupt;
pub mod logging;
pub mod server;
pub mod stage;
pub mod status;
pub mod types;

pub use breakpoint::{Breakpoint, BreakpointStore, SessionStore};
pub use config::{DebuggerConfig, Side};
pub use error::{ConsistencyError, DebugError, StorageError};
pub use event::{MutationEvent, MutationKind};
pub use interrupt::{Interrupt, InterruptBroadcaster, InterruptSink, SinkError};
pub use server::ServerDebugger;
pub use stage::{NewStage, Stage, StageDescriptor, StageKind, StageTree};
pub use status::{GlobalStatus, StatusFlag};
pub use types::{BreakpointId, CellPos, CellState, StageId};
