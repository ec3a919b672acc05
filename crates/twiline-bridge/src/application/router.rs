//! SignalRouter: frames inbound chunks and dispatches decoded signals.
//!
//! The routing table is keyed by sender reference.  One socket chunk may
//! contain several newline-separated records; each record is parsed and
//! routed independently, so one malformed record never poisons its
//! neighbors.
//!
//! Per-record rules:
//! - An error envelope is logged and ends processing of that record.
//! - A signal without a sender cannot be routed and is dropped with a log.
//! - A signal from a reference that is not configured is dropped with an
//!   informational log; the bus carries traffic for the whole building, not
//!   just the bridged devices, so this is expected.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{error, info};

use twiline_core::{parse_line, split_chunk};

use crate::application::accessories::Accessory;

/// Faults while assembling the routing table.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("accessory '{name}' has an empty reference")]
    EmptyReference { name: String },

    #[error("duplicate accessory reference '{0}'")]
    DuplicateReference(String),
}

/// Dispatch table from sender reference to accessory.
#[derive(Default)]
pub struct SignalRouter {
    accessories: HashMap<String, Accessory>,
}

impl SignalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an accessory to the table.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if the reference is empty or already taken.
    pub fn register(&mut self, accessory: Accessory) -> Result<(), RouterError> {
        let reference = accessory.reference().to_string();
        if reference.is_empty() {
            return Err(RouterError::EmptyReference {
                name: accessory.name().to_string(),
            });
        }
        if self.accessories.contains_key(&reference) {
            return Err(RouterError::DuplicateReference(reference));
        }
        self.accessories.insert(reference, accessory);
        Ok(())
    }

    /// Number of registered accessories.
    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }

    /// Looks an accessory up by reference.
    pub fn get(&self, reference: &str) -> Option<&Accessory> {
        self.accessories.get(reference)
    }

    /// Mutable lookup, for driving control intents from outside.
    pub fn get_mut(&mut self, reference: &str) -> Option<&mut Accessory> {
        self.accessories.get_mut(reference)
    }

    /// Splits a raw socket chunk into records and dispatches each one.
    pub fn dispatch_chunk(&mut self, chunk: &str) {
        for line in split_chunk(chunk) {
            self.dispatch_line(line);
        }
    }

    /// Parses and routes a single record.
    pub fn dispatch_line(&mut self, line: &str) {
        let message = match parse_line(line) {
            Ok(message) => message,
            Err(e) => {
                error!("discarding malformed record: {e}; record was: {line}");
                return;
            }
        };

        if let Some(notice) = message.error {
            error!("bus reported an error: {}", notice.message);
            return;
        }

        let Some(signal) = message.signal else {
            return;
        };
        let Some(sender) = signal.sender.as_deref() else {
            error!("dropping signal without sender: {:?}", signal.signal_type);
            return;
        };
        match self.accessories.get_mut(sender) {
            Some(accessory) => accessory.handle_signal(&signal),
            None => info!("signal from {sender}: known to the bus, not to this configuration"),
        }
    }

    /// Queues a state query for every stateful accessory.
    ///
    /// Called after each (re)connect so the cached states converge with the
    /// bus; the pacer spreads the resulting burst out on the wire.
    pub fn poll_all(&self) {
        for accessory in self.accessories.values() {
            accessory.request_state();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
