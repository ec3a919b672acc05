//! # twiline-core
//!
//! Shared library for the TWILINE TCP bridge containing the signal model,
//! the line-delimited JSON wire codec, and the position/device domain.
//!
//! This crate is pure data and logic: it has no dependency on sockets,
//! timers, or the async runtime.  The bridge application builds on top of it.
//!
//! # Architecture overview
//!
//! TWILINE is a proprietary building-automation bus reachable through a
//! plain TCP socket.  Every event on that socket is one JSON object per
//! line: either a *signal* (a device reported state, or the bridge commands
//! a device) or an *error* notification.  This crate defines:
//!
//! - **`protocol`** – The typed signal vocabulary ([`SignalType`],
//!   [`MotorState`], [`Command`]), the [`Signal`]/[`TwilineMessage`] wire
//!   envelope, the outbound [`MessageBuilder`], and the line framing and
//!   parsing helpers in [`protocol::wire`].
//!
//! - **`domain`** – Position normalization for motorized devices (the bus
//!   reports positions in a raw motor frame which is mirrored for inverted
//!   devices such as blinds) and the device descriptor/validation types the
//!   routing table is built from.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `twiline_core::Signal` instead of `twiline_core::protocol::signal::Signal`.
pub use domain::device::{validate_devices, AccessoryKind, DeviceDescriptor, DeviceListError};
pub use domain::position::PositionState;
pub use protocol::signal::{
    Command, ErrorNotice, MessageBuilder, MotorState, Signal, SignalType, TwilineMessage,
};
pub use protocol::wire::{encode_line, parse_line, split_chunk, WireError};
