//! Typed representation of the TWILINE signal vocabulary.
//!
//! Every record on the bus socket is one JSON object: either
//! `{"signal":{...}}` or `{"error":{"message":"..."}}`.  A signal always
//! carries a `type`; all other fields are optional and *absence is
//! significant*: an omitted `position` is not position zero.  Inbound
//! signals carry a `sender` (the bus device that originated them); outbound
//! signals carry a `receiver` (the device they are addressed to).

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Signal types ──────────────────────────────────────────────────────────────

/// All signal type strings defined by the TWILINE protocol.
///
/// The serialized form is the exact wire string (e.g. `"BLINDS_POSITION"`);
/// an unknown string fails deserialization of the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "TOGGLE")]
    Toggle,
    #[serde(rename = "DIMMER_START")]
    DimmerStart,
    #[serde(rename = "DIMMER_STOP")]
    DimmerStop,
    #[serde(rename = "BLINDS_START")]
    BlindsStart,
    #[serde(rename = "BLINDS_STOP")]
    BlindsStop,
    #[serde(rename = "BLINDS_POSITION")]
    BlindsPosition,
    #[serde(rename = "VALUE_SET")]
    ValueSet,
    #[serde(rename = "SCENE_SHOW")]
    SceneShow,
    #[serde(rename = "SCENE_TOGGLE")]
    SceneToggle,
    #[serde(rename = "SEND_ME_STATE")]
    SendMeState,
    #[serde(rename = "RMLED_STATE")]
    RmLedState,
    #[serde(rename = "SCENE_ADJUSTING")]
    SceneAdjusting,
    #[serde(rename = "SCENE_SAVE")]
    SceneSave,
    #[serde(rename = "SCENE_INFO")]
    SceneInfo,
}

// ── Motor states ──────────────────────────────────────────────────────────────

/// Raw motor state reported by a motorized device in a `BLINDS_POSITION`
/// signal.
///
/// The set is closed: any other string on the wire is rejected while the
/// record is parsed, so translation code never has to guess a direction for
/// an unknown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorState {
    #[serde(rename = "STOPPED")]
    Stopped,
    #[serde(rename = "MOVING_UP")]
    MovingUp,
    #[serde(rename = "MOVING_DOWN")]
    MovingDown,
    #[serde(rename = "MOVING_DOWN_2")]
    MovingDown2,
}

// ── Drive commands ────────────────────────────────────────────────────────────

/// Error returned when a wire command value is outside 1–10.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command value: {0}")]
pub struct UnknownCommand(pub u8);

/// Drive and button commands carried by outbound `BLINDS_START` signals.
///
/// On the wire a command is a small integer (1–10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Command {
    DriveUp = 1,
    DriveDown = 2,
    DriveDown2 = 3,
    ButtonPressUp = 4,
    ButtonPressDown = 5,
    ButtonPressDown2 = 6,
    DriveToPosition = 7,
    SingleButtonToggle = 8,
    OpenSlats = 9,
    CloseSlats = 10,
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = UnknownCommand;

    fn try_from(value: u8) -> Result<Self, UnknownCommand> {
        match value {
            1 => Ok(Command::DriveUp),
            2 => Ok(Command::DriveDown),
            3 => Ok(Command::DriveDown2),
            4 => Ok(Command::ButtonPressUp),
            5 => Ok(Command::ButtonPressDown),
            6 => Ok(Command::ButtonPressDown2),
            7 => Ok(Command::DriveToPosition),
            8 => Ok(Command::SingleButtonToggle),
            9 => Ok(Command::OpenSlats),
            10 => Ok(Command::CloseSlats),
            other => Err(UnknownCommand(other)),
        }
    }
}

// ── Signal and envelope ───────────────────────────────────────────────────────

/// One protocol event, inbound (bus → bridge) or outbound (bridge → bus).
///
/// Positions here are in the *raw* bus frame (0–100); the normalization for
/// inverted devices happens in `domain::position`, never at the wire layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// The signal kind; the only required field.
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// Device reference that originated an inbound signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Device reference targeted by an outbound signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Raw (un-inverted) position percentage, 0–100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
    /// Raw motor state of a motorized device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motor: Option<MotorState>,
    /// Drive/button command, outbound only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    /// Raw-frame target percentage for drive-to-position commands.
    #[serde(rename = "endPosition", skip_serializing_if = "Option::is_none")]
    pub end_position: Option<u8>,
}

impl Signal {
    /// Creates a signal of the given type with every optional field absent.
    pub fn new(signal_type: SignalType) -> Self {
        Self {
            signal_type,
            sender: None,
            receiver: None,
            position: None,
            motor: None,
            command: None,
            end_position: None,
        }
    }
}

/// Error notification from the bus: `{"error":{"message":"..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub message: String,
}

/// The wire envelope: exactly one of `signal` or `error` is populated on a
/// well-formed record.  A record with neither is malformed and is rejected
/// by [`crate::protocol::wire::parse_line`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilineMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Signal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorNotice>,
}

impl TwilineMessage {
    /// Wraps a signal in the wire envelope.
    pub fn from_signal(signal: Signal) -> Self {
        Self {
            signal: Some(signal),
            error: None,
        }
    }
}

// ── Outbound message builder ──────────────────────────────────────────────────

/// Fluent accumulator for outbound messages.
///
/// The signal type is required, so it is a constructor argument rather than
/// a setter; a message without a type is unrepresentable instead of being a
/// runtime failure.
///
/// # Examples
///
/// ```rust
/// use twiline_core::{Command, MessageBuilder, SignalType};
///
/// let message = MessageBuilder::new(SignalType::BlindsStart)
///     .receiver("W_EG_KITCHEN")
///     .command(Command::DriveToPosition)
///     .end_position(80)
///     .build();
/// assert!(message.signal.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    signal: Signal,
}

impl MessageBuilder {
    /// Starts a message of the given signal type.
    pub fn new(signal_type: SignalType) -> Self {
        Self {
            signal: Signal::new(signal_type),
        }
    }

    /// Sets the device reference the message is addressed to.
    pub fn receiver(mut self, receiver: impl Into<String>) -> Self {
        self.signal.receiver = Some(receiver.into());
        self
    }

    /// Sets the drive/button command.
    pub fn command(mut self, command: Command) -> Self {
        self.signal.command = Some(command);
        self
    }

    /// Sets the raw-frame target position for drive-to-position commands.
    pub fn end_position(mut self, end_position: u8) -> Self {
        self.signal.end_position = Some(end_position);
        self
    }

    /// Produces the immutable wire envelope.
    pub fn build(self) -> TwilineMessage {
        TwilineMessage::from_signal(self.signal)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_type_serializes_to_exact_wire_strings() {
        let cases = [
            (SignalType::On, "\"ON\""),
            (SignalType::Off, "\"OFF\""),
            (SignalType::BlindsStart, "\"BLINDS_START\""),
            (SignalType::BlindsPosition, "\"BLINDS_POSITION\""),
            (SignalType::SceneToggle, "\"SCENE_TOGGLE\""),
            (SignalType::SendMeState, "\"SEND_ME_STATE\""),
            (SignalType::RmLedState, "\"RMLED_STATE\""),
            (SignalType::SceneInfo, "\"SCENE_INFO\""),
        ];
        for (signal_type, expected) in cases {
            assert_eq!(serde_json::to_string(&signal_type).unwrap(), expected);
        }
    }

    #[test]
    fn test_motor_state_round_trips_through_wire_strings() {
        for (state, wire) in [
            (MotorState::Stopped, "\"STOPPED\""),
            (MotorState::MovingUp, "\"MOVING_UP\""),
            (MotorState::MovingDown, "\"MOVING_DOWN\""),
            (MotorState::MovingDown2, "\"MOVING_DOWN_2\""),
        ] {
            assert_eq!(serde_json::to_string(&state).unwrap(), wire);
            let parsed: MotorState = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_unknown_motor_state_string_is_rejected() {
        let result: Result<MotorState, _> = serde_json::from_str("\"MOVING_SIDEWAYS\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_command_serializes_as_integer() {
        assert_eq!(
            serde_json::to_string(&Command::DriveToPosition).unwrap(),
            "7"
        );
        assert_eq!(serde_json::to_string(&Command::DriveUp).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Command::CloseSlats).unwrap(), "10");
    }

    #[test]
    fn test_command_deserializes_all_defined_values() {
        for value in 1..=10u8 {
            let command: Command = serde_json::from_str(&value.to_string()).unwrap();
            assert_eq!(u8::from(command), value);
        }
    }

    #[test]
    fn test_command_outside_range_is_rejected() {
        assert_eq!(Command::try_from(0), Err(UnknownCommand(0)));
        assert_eq!(Command::try_from(11), Err(UnknownCommand(11)));
        let result: Result<Command, _> = serde_json::from_str("42");
        assert!(result.is_err());
    }

    #[test]
    fn test_signal_omits_absent_optional_fields() {
        let signal = Signal::new(SignalType::Toggle);
        assert_eq!(
            serde_json::to_string(&signal).unwrap(),
            r#"{"type":"TOGGLE"}"#
        );
    }

    #[test]
    fn test_signal_with_absent_position_is_not_position_zero() {
        let json = r#"{"type":"BLINDS_POSITION","sender":"W1","motor":"STOPPED"}"#;
        let signal: Signal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.position, None);
        assert_eq!(signal.motor, Some(MotorState::Stopped));
    }

    #[test]
    fn test_builder_produces_expected_wire_record() {
        let message = MessageBuilder::new(SignalType::BlindsStart)
            .receiver("W1")
            .command(Command::DriveToPosition)
            .end_position(80)
            .build();
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"signal":{"type":"BLINDS_START","receiver":"W1","command":7,"endPosition":80}}"#
        );
    }

    #[test]
    fn test_builder_minimal_message_carries_only_type_and_receiver() {
        let message = MessageBuilder::new(SignalType::SendMeState)
            .receiver("L1")
            .build();
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"signal":{"type":"SEND_ME_STATE","receiver":"L1"}}"#
        );
    }

    #[test]
    fn test_inbound_signal_parses_sender_and_position() {
        let json = r#"{"signal":{"type":"BLINDS_POSITION","sender":"W1","position":30}}"#;
        let message: TwilineMessage = serde_json::from_str(json).unwrap();
        let signal = message.signal.unwrap();
        assert_eq!(signal.sender.as_deref(), Some("W1"));
        assert_eq!(signal.position, Some(30));
        assert_eq!(signal.signal_type, SignalType::BlindsPosition);
    }

    #[test]
    fn test_error_envelope_parses_message_text() {
        let json = r#"{"error":{"message":"bus overload"}}"#;
        let message: TwilineMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.error.unwrap().message, "bus overload");
        assert!(message.signal.is_none());
    }
}
