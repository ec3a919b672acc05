//! Position normalization for motorized devices.
//!
//! Positions visible to the user are *normalized*: 0–100 with 100 meaning
//! fully open, regardless of how the motor frame is wired.  An *inverted*
//! device (a blind, as opposed to a window) reports the mirror of that frame
//! on the bus.  Translation between the two frames happens here and only
//! here:
//!
//! ```text
//! raw = inverted ? 100 - normalized : normalized
//! ```
//!
//! Motor states map to a travel direction in the normalized frame.  Opening
//! a window means the motor moves *down* while the user-visible position
//! *increases*; the inverted frame swaps the two moving mappings.

use crate::protocol::signal::MotorState;

/// Direction of travel in the normalized frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Stopped,
    Increasing,
    Decreasing,
}

/// Converts a raw bus position into the normalized frame.
///
/// Inputs above 100 are clamped; the bus never legitimately reports them.
pub fn from_raw(raw: u8, inverted: bool) -> u8 {
    let clamped = raw.min(100);
    if inverted {
        100 - clamped
    } else {
        clamped
    }
}

/// Converts a normalized position into the raw bus frame.
///
/// The mapping is its own inverse, so this is [`from_raw`] applied to a
/// normalized value.
pub fn to_raw(normalized: u8, inverted: bool) -> u8 {
    from_raw(normalized, inverted)
}

/// Maps a raw motor state to the normalized travel direction.
///
/// The [`MotorState`] enum is closed, so an unknown raw value can never
/// reach this function: it is rejected when the wire record is parsed.
pub fn travel_direction(motor: MotorState, inverted: bool) -> PositionState {
    match motor {
        MotorState::Stopped => PositionState::Stopped,
        MotorState::MovingUp => {
            if inverted {
                PositionState::Increasing
            } else {
                PositionState::Decreasing
            }
        }
        MotorState::MovingDown | MotorState::MovingDown2 => {
            if inverted {
                PositionState::Decreasing
            } else {
                PositionState::Increasing
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
