//! Accessory state machines: the translators between bus signals and
//! home-automation state.
//!
//! Each configured TWILINE reference is represented by exactly one
//! [`Accessory`].  Inbound signals mutate the accessory's cached state and
//! surface as [`StateEvent`]s on a channel; control intents from the
//! home-automation side turn into outbound messages through the injected
//! [`MessageWriter`](crate::application::MessageWriter).
//!
//! Reads are poll-and-cache: a getter queues a `SEND_ME_STATE` for the device
//! and returns the cached value immediately.  The authoritative answer
//! arrives later as a fresh inbound signal.

pub mod binary;
pub mod motion;
pub mod stateless;

pub use binary::BinaryAccessory;
pub use motion::MotionAccessory;
pub use stateless::StatelessSwitchAccessory;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use twiline_core::{AccessoryKind, DeviceDescriptor, PositionState, Signal};

use crate::application::MessageWriter;

/// Tunables shared by all accessories.
#[derive(Debug, Clone)]
pub struct AccessorySettings {
    /// How long a stateless switch stays "pressed" before the automatic
    /// release message.
    pub switch_press_duration: Duration,
}

impl Default for AccessorySettings {
    fn default() -> Self {
        Self {
            switch_press_duration: Duration::from_millis(500),
        }
    }
}

/// A single observable state change of one accessory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// On/off state of a light, scene, or momentary switch press echo.
    On(bool),
    /// Normalized position, 0 to 100 with 100 fully open.
    CurrentPosition(u8),
    /// Travel direction in the normalized frame.
    PositionState(PositionState),
}

/// A state change tagged with the reference it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEvent {
    pub reference: String,
    pub change: StateChange,
}

impl StateEvent {
    pub(crate) fn new(reference: &str, change: StateChange) -> Self {
        Self {
            reference: reference.to_string(),
            change,
        }
    }
}

/// The closed set of accessory state machines.
///
/// The set of device kinds is fixed by the bus, so this is an enum rather
/// than a trait object: dispatch stays exhaustive and adding a kind is a
/// compile error until every match arm handles it.
pub enum Accessory {
    Binary(BinaryAccessory),
    StatelessSwitch(StatelessSwitchAccessory),
    Motion(MotionAccessory),
}

impl Accessory {
    /// Builds the accessory for a configured device.
    ///
    /// Kind mapping: lights and scenes are binary (scenes use the scene
    /// signal pair for control), switches are stateless, windows and blinds
    /// are motorized with the blind reporting positions in the mirrored
    /// frame.
    pub fn from_descriptor(
        descriptor: &DeviceDescriptor,
        writer: Arc<dyn MessageWriter>,
        events: mpsc::UnboundedSender<StateEvent>,
        settings: &AccessorySettings,
    ) -> Self {
        let reference = descriptor.reference.clone();
        let name = descriptor.name.clone();
        match descriptor.kind {
            AccessoryKind::Light => {
                Accessory::Binary(BinaryAccessory::light(reference, name, writer, events))
            }
            AccessoryKind::Scene => {
                Accessory::Binary(BinaryAccessory::scene(reference, name, writer, events))
            }
            AccessoryKind::Switch => Accessory::StatelessSwitch(StatelessSwitchAccessory::new(
                reference,
                name,
                settings.switch_press_duration,
                writer,
                events,
            )),
            AccessoryKind::Window => Accessory::Motion(MotionAccessory::new(
                reference, name, false, writer, events,
            )),
            AccessoryKind::Blind => Accessory::Motion(MotionAccessory::new(
                reference, name, true, writer, events,
            )),
        }
    }

    /// The TWILINE reference this accessory answers to.
    pub fn reference(&self) -> &str {
        match self {
            Accessory::Binary(a) => a.reference(),
            Accessory::StatelessSwitch(a) => a.reference(),
            Accessory::Motion(a) => a.reference(),
        }
    }

    /// Human-readable name from the configuration.
    pub fn name(&self) -> &str {
        match self {
            Accessory::Binary(a) => a.name(),
            Accessory::StatelessSwitch(a) => a.name(),
            Accessory::Motion(a) => a.name(),
        }
    }

    /// Applies one inbound signal addressed to this accessory.
    pub fn handle_signal(&mut self, signal: &Signal) {
        match self {
            Accessory::Binary(a) => a.handle_signal(signal),
            Accessory::StatelessSwitch(a) => a.handle_signal(signal),
            Accessory::Motion(a) => a.handle_signal(signal),
        }
    }

    /// Queues a state query for this accessory, if it carries state.
    ///
    /// Stateless switches have nothing to report and stay silent.
    pub fn request_state(&self) {
        match self {
            Accessory::Binary(a) => a.request_state(),
            Accessory::StatelessSwitch(_) => {}
            Accessory::Motion(a) => a.request_state(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingWriter;
    use twiline_core::AccessoryKind;

    fn descriptor(kind: AccessoryKind) -> DeviceDescriptor {
        DeviceDescriptor {
            reference: "X1".to_string(),
            name: "Test device".to_string(),
            kind,
        }
    }

    #[test]
    fn test_descriptor_kinds_map_to_the_expected_state_machines() {
        let writer = Arc::new(RecordingWriter::default());
        let (events, _rx) = mpsc::unbounded_channel();
        let settings = AccessorySettings::default();

        let cases = [
            (AccessoryKind::Light, "binary"),
            (AccessoryKind::Scene, "binary"),
            (AccessoryKind::Switch, "stateless"),
            (AccessoryKind::Window, "motion"),
            (AccessoryKind::Blind, "motion"),
        ];
        for (kind, expected) in cases {
            let accessory = Accessory::from_descriptor(
                &descriptor(kind),
                writer.clone() as Arc<dyn MessageWriter>,
                events.clone(),
                &settings,
            );
            let actual = match accessory {
                Accessory::Binary(_) => "binary",
                Accessory::StatelessSwitch(_) => "stateless",
                Accessory::Motion(_) => "motion",
            };
            assert_eq!(actual, expected, "kind {kind:?}");
        }
    }

    #[test]
    fn test_request_state_is_silent_for_stateless_switches() {
        let writer = Arc::new(RecordingWriter::default());
        let (events, _rx) = mpsc::unbounded_channel();
        let settings = AccessorySettings::default();

        let accessory = Accessory::from_descriptor(
            &descriptor(AccessoryKind::Switch),
            writer.clone() as Arc<dyn MessageWriter>,
            events,
            &settings,
        );
        accessory.request_state();

        assert!(writer.written().is_empty());
    }

    #[test]
    fn test_request_state_polls_stateful_accessories() {
        let writer = Arc::new(RecordingWriter::default());
        let (events, _rx) = mpsc::unbounded_channel();
        let settings = AccessorySettings::default();

        let accessory = Accessory::from_descriptor(
            &descriptor(AccessoryKind::Light),
            writer.clone() as Arc<dyn MessageWriter>,
            events,
            &settings,
        );
        accessory.request_state();

        assert_eq!(
            writer.written_lines(),
            vec![r#"{"signal":{"type":"SEND_ME_STATE","receiver":"X1"}}"#]
        );
    }
}
