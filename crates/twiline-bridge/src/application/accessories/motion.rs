//! MotionAccessory: motorized windows and blinds.
//!
//! All positions held here are normalized (0 to 100, 100 fully open); the
//! raw bus frame appears only at the edges, translated through
//! [`position::from_raw`]/[`position::to_raw`].  A window reports in the
//! normalized frame directly, a blind reports the mirror of it.
//!
//! A `BLINDS_POSITION` report may carry a position, a motor state, or both;
//! the two fields update independently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use twiline_core::domain::position;
use twiline_core::{Command, MessageBuilder, PositionState, Signal, SignalType};

use crate::application::accessories::{StateChange, StateEvent};
use crate::application::MessageWriter;

/// Position state machine for one motorized reference.
pub struct MotionAccessory {
    reference: String,
    name: String,
    inverted: bool,
    current_position: u8,
    target_position: u8,
    state: PositionState,
    writer: Arc<dyn MessageWriter>,
    events: mpsc::UnboundedSender<StateEvent>,
}

impl MotionAccessory {
    pub fn new(
        reference: String,
        name: String,
        inverted: bool,
        writer: Arc<dyn MessageWriter>,
        events: mpsc::UnboundedSender<StateEvent>,
    ) -> Self {
        Self {
            reference,
            name,
            inverted,
            current_position: 0,
            target_position: 0,
            state: PositionState::Stopped,
            writer,
            events,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies a position report.  Only `BLINDS_POSITION` signals carry
    /// motion state; everything else is ignored.
    pub fn handle_signal(&mut self, signal: &Signal) {
        if signal.signal_type != SignalType::BlindsPosition {
            debug!(
                reference = %self.reference,
                "ignoring signal without position data: {:?}", signal.signal_type
            );
            return;
        }

        if let Some(raw) = signal.position {
            self.current_position = position::from_raw(raw, self.inverted);
            let _ = self.events.send(StateEvent::new(
                &self.reference,
                StateChange::CurrentPosition(self.current_position),
            ));
        }

        if let Some(motor) = signal.motor {
            self.state = position::travel_direction(motor, self.inverted);
            let _ = self.events.send(StateEvent::new(
                &self.reference,
                StateChange::PositionState(self.state),
            ));
        }
    }

    /// Drives toward a normalized target position.
    ///
    /// A target equal to the current position means "stay here", which on a
    /// possibly-moving motor is a stop command rather than a drive command.
    pub fn set_target_position(&mut self, target: u8) {
        self.target_position = target.min(100);
        let message = if self.target_position != self.current_position {
            MessageBuilder::new(SignalType::BlindsStart)
                .receiver(self.reference.as_str())
                .command(Command::DriveToPosition)
                .end_position(position::to_raw(self.target_position, self.inverted))
                .build()
        } else {
            MessageBuilder::new(SignalType::BlindsStop)
                .receiver(self.reference.as_str())
                .build()
        };
        self.writer.write_message(&message);
    }

    /// Returns the cached normalized position and queues a refresh query.
    pub fn current_position(&self) -> u8 {
        self.request_state();
        self.current_position
    }

    /// Returns the last requested target and queues a refresh query.
    pub fn target_position(&self) -> u8 {
        self.request_state();
        self.target_position
    }

    /// Returns the cached travel direction and queues a refresh query.
    pub fn position_state(&self) -> PositionState {
        self.request_state();
        self.state
    }

    /// Queues a `SEND_ME_STATE` for this reference.
    pub fn request_state(&self) {
        self.writer.write_message(
            &MessageBuilder::new(SignalType::SendMeState)
                .receiver(self.reference.as_str())
                .build(),
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
