//! Shared helpers for integration tests.

use std::cell::RefCell;
use std::rc::Rc;
use tickscope::{Interrupt, InterruptSink, SinkError};

/// Sink that records every delivered interrupt, decoded from the wire.
pub struct RecordingSink {
    name: String,
    received: Rc<RefCell<Vec<Interrupt>>>,
    connected: bool,
}

impl RecordingSink {
    /// Returns the sink and a shared handle to its received interrupts.
    pub fn new(name: &str) -> (Box<Self>, Rc<RefCell<Vec<Interrupt>>>) {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Box::new(Self {
            name: name.to_string(),
            received: Rc::clone(&received),
            connected: true,
        });
        (sink, received)
    }

    /// A sink that always reports the client as disconnected.
    pub fn disconnected(name: &str) -> Box<Self> {
        Box::new(Self {
            name: name.to_string(),
            received: Rc::new(RefCell::new(Vec::new())),
            connected: false,
        })
    }
}

impl InterruptSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), SinkError> {
        if !self.connected {
            return Err(SinkError::Disconnected);
        }
        let interrupt: Interrupt =
            serde_json::from_slice(payload).map_err(|e| SinkError::Send(e.to_string()))?;
        self.received.borrow_mut().push(interrupt);
        Ok(())
    }
}
