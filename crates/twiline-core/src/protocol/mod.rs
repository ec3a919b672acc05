//! The TWILINE wire protocol: typed signals and the line-delimited JSON codec.

pub mod signal;
pub mod wire;

pub use signal::{
    Command, ErrorNotice, MessageBuilder, MotorState, Signal, SignalType, TwilineMessage,
};
pub use wire::{encode_line, parse_line, split_chunk, WireError};
