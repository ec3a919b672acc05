//! BinaryAccessory: on/off devices (lights and scene triggers).
//!
//! Lights are controlled with the plain `ON`/`OFF` pair.  A scene is shaped
//! like a light on the home-automation side but is controlled with the scene
//! pair: `SCENE_SHOW` activates it, `SCENE_TOGGLE` deactivates it.  Inbound
//! state reports use `ON`/`OFF` for both.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use twiline_core::{MessageBuilder, Signal, SignalType};

use crate::application::accessories::{StateChange, StateEvent};
use crate::application::MessageWriter;

/// On/off state machine for one light or scene reference.
pub struct BinaryAccessory {
    reference: String,
    name: String,
    scene: bool,
    on: bool,
    writer: Arc<dyn MessageWriter>,
    events: mpsc::UnboundedSender<StateEvent>,
}

impl BinaryAccessory {
    /// Creates a light controlled with the `ON`/`OFF` pair.
    pub fn light(
        reference: String,
        name: String,
        writer: Arc<dyn MessageWriter>,
        events: mpsc::UnboundedSender<StateEvent>,
    ) -> Self {
        Self {
            reference,
            name,
            scene: false,
            on: false,
            writer,
            events,
        }
    }

    /// Creates a scene controlled with the `SCENE_SHOW`/`SCENE_TOGGLE` pair.
    pub fn scene(
        reference: String,
        name: String,
        writer: Arc<dyn MessageWriter>,
        events: mpsc::UnboundedSender<StateEvent>,
    ) -> Self {
        Self {
            reference,
            name,
            scene: true,
            on: false,
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

    /// Applies an inbound state report.  Signal types other than `ON` and
    /// `OFF` carry no binary state and are ignored.
    pub fn handle_signal(&mut self, signal: &Signal) {
        match signal.signal_type {
            SignalType::On => self.on = true,
            SignalType::Off => self.on = false,
            _ => {
                debug!(
                    reference = %self.reference,
                    "ignoring signal without binary state: {:?}", signal.signal_type
                );
                return;
            }
        }
        let _ = self
            .events
            .send(StateEvent::new(&self.reference, StateChange::On(self.on)));
    }

    /// Drives the device to the requested state.
    pub fn set_on(&mut self, value: bool) {
        self.on = value;
        let signal_type = match (self.scene, value) {
            (false, true) => SignalType::On,
            (false, false) => SignalType::Off,
            (true, true) => SignalType::SceneShow,
            (true, false) => SignalType::SceneToggle,
        };
        self.writer.write_message(
            &MessageBuilder::new(signal_type)
                .receiver(self.reference.as_str())
                .build(),
        );
    }

    /// Returns the cached state and queues a refresh query.
    pub fn is_on(&self) -> bool {
        self.request_state();
        self.on
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingWriter;

    fn make_light() -> (
        BinaryAccessory,
        Arc<RecordingWriter>,
        mpsc::UnboundedReceiver<StateEvent>,
    ) {
        let writer = Arc::new(RecordingWriter::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let accessory = BinaryAccessory::light(
            "L1".to_string(),
            "Kitchen light".to_string(),
            writer.clone() as Arc<dyn MessageWriter>,
            tx,
        );
        (accessory, writer, rx)
    }

    fn make_scene() -> (BinaryAccessory, Arc<RecordingWriter>) {
        let writer = Arc::new(RecordingWriter::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let accessory = BinaryAccessory::scene(
            "S1".to_string(),
            "Dinner scene".to_string(),
            writer.clone() as Arc<dyn MessageWriter>,
            tx,
        );
        (accessory, writer)
    }

    fn signal(signal_type: SignalType) -> Signal {
        let mut s = Signal::new(signal_type);
        s.sender = Some("L1".to_string());
        s
    }

    #[test]
    fn test_on_signal_sets_state_and_emits_event() {
        // Arrange
        let (mut light, _writer, mut rx) = make_light();

        // Act
        light.handle_signal(&signal(SignalType::On));

        // Assert
        assert!(light.on);
        assert_eq!(
            rx.try_recv().unwrap(),
            StateEvent::new("L1", StateChange::On(true))
        );
    }

    #[test]
    fn test_off_signal_clears_state_and_emits_event() {
        // Arrange
        let (mut light, _writer, mut rx) = make_light();
        light.handle_signal(&signal(SignalType::On));
        rx.try_recv().unwrap();

        // Act
        light.handle_signal(&signal(SignalType::Off));

        // Assert
        assert!(!light.on);
        assert_eq!(
            rx.try_recv().unwrap(),
            StateEvent::new("L1", StateChange::On(false))
        );
    }

    #[test]
    fn test_unrelated_signal_emits_no_event() {
        let (mut light, _writer, mut rx) = make_light();
        light.handle_signal(&signal(SignalType::BlindsPosition));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_light_set_on_writes_the_plain_pair() {
        let (mut light, writer, _rx) = make_light();

        light.set_on(true);
        light.set_on(false);

        assert_eq!(
            writer.written_lines(),
            vec![
                r#"{"signal":{"type":"ON","receiver":"L1"}}"#,
                r#"{"signal":{"type":"OFF","receiver":"L1"}}"#,
            ]
        );
    }

    #[test]
    fn test_scene_set_on_writes_the_scene_pair() {
        let (mut scene, writer) = make_scene();

        scene.set_on(true);
        scene.set_on(false);

        assert_eq!(
            writer.written_lines(),
            vec![
                r#"{"signal":{"type":"SCENE_SHOW","receiver":"S1"}}"#,
                r#"{"signal":{"type":"SCENE_TOGGLE","receiver":"S1"}}"#,
            ]
        );
    }

    #[test]
    fn test_is_on_returns_cache_and_queues_a_state_query() {
        let (mut light, writer, _rx) = make_light();
        light.handle_signal(&signal(SignalType::On));

        assert!(light.is_on());
        assert_eq!(
            writer.written_lines(),
            vec![r#"{"signal":{"type":"SEND_ME_STATE","receiver":"L1"}}"#]
        );
    }
}
