//! Application layer: accessory state machines and inbound signal routing.
//!
//! The accessories depend only on the [`MessageWriter`] trait and on the
//! protocol types from `twiline-core`; the transport implementation is
//! injected at construction time, so every state machine is unit-testable
//! with a recording writer.
//!
//! # Sub-modules
//!
//! - **`accessories`** – The per-device translators between bus signals and
//!   home-automation state (lights, scenes, stateless switches, windows,
//!   blinds).
//!
//! - **`router`** – Frames raw socket chunks into records and dispatches each
//!   decoded signal to the accessory addressed by its sender reference.

pub mod accessories;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

use twiline_core::TwilineMessage;

/// Outbound seam the accessories write through.
///
/// The production implementation is the pacer in front of the TCP client;
/// test implementations record the messages.  Writes are fire-and-forget:
/// queueing never fails and delivery problems surface on the transport side.
pub trait MessageWriter: Send + Sync {
    /// Queues one message for transmission to the bus.
    fn write_message(&self, message: &TwilineMessage);
}
