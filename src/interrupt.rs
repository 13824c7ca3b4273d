//! Interrupt notifications and their fan-out to observing clients.

use crate::stage::StageDescriptor;
use crate::types::BreakpointId;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Wire message sent to every connected observing client when the server
/// freezes, resets its stage tree, or resumes. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    /// RFC3339 timestamp with millisecond precision.
    pub ts: String,
    /// The breakpoint that triggered the freeze, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<BreakpointId>,
    /// Snapshot of the stage active when the freeze triggered; `None` for
    /// tree-reset notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageDescriptor>,
    /// True when the server is resuming rather than freezing.
    pub resuming: bool,
}

impl Interrupt {
    pub fn new(
        breakpoint: Option<BreakpointId>,
        stage: Option<StageDescriptor>,
        resuming: bool,
    ) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            breakpoint,
            stage,
            resuming,
        }
    }

    /// The per-tick "tree reset" notification: no originating stage.
    pub fn tree_reset() -> Self {
        Self::new(None, None, false)
    }

    pub fn resume() -> Self {
        Self::new(None, None, true)
    }
}

/// Failure to deliver to one client.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("client disconnected")]
    Disconnected,
    #[error("send failed: {0}")]
    Send(String),
}

/// One connected observing client. The connection-management collaborator
/// implements this; the core never manages connections itself.
pub trait InterruptSink {
    /// Stable identifier for logging and removal.
    fn name(&self) -> &str;

    /// Deliver one serialized interrupt.
    fn send(&mut self, payload: &[u8]) -> Result<(), SinkError>;
}

/// Serializes each interrupt once and fans it out to every registered sink.
#[derive(Default)]
pub struct InterruptBroadcaster {
    sinks: Vec<Box<dyn InterruptSink>>,
}

impl InterruptBroadcaster {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn InterruptSink>) {
        self.sinks.push(sink);
    }

    pub fn remove_sink(&mut self, name: &str) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|sink| sink.name() != name);
        self.sinks.len() != before
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Broadcast one interrupt to all sinks. Delivery is best-effort per
    /// client: a failing sink is skipped, not treated as an error for the
    /// others. Returns the number of successful deliveries.
    pub fn broadcast(&mut self, interrupt: &Interrupt) -> usize {
        if self.sinks.is_empty() {
            return 0;
        }
        let payload = match serde_json::to_vec(interrupt) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "interrupt serialization failed; dropping broadcast");
                return 0;
            }
        };
        let mut delivered = 0;
        for sink in &mut self.sinks {
            match sink.send(&payload) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    debug!(client = sink.name(), error = %err, "skipping interrupt delivery");
                }
            }
        }
        delivered
    }
}
