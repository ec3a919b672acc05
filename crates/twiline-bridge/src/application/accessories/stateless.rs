//! StatelessSwitchAccessory: momentary push buttons on the bus.
//!
//! A TWILINE switch input has no persistent state; "turning it on" means
//! pressing it.  The accessory writes `ON` immediately and schedules the
//! releasing `OFF` after the configured press duration, so the bus sees a
//! button press rather than a latched state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::debug;

use twiline_core::{MessageBuilder, Signal, SignalType};

use crate::application::accessories::{StateChange, StateEvent};
use crate::application::MessageWriter;

/// Momentary switch for one reference.
pub struct StatelessSwitchAccessory {
    reference: String,
    name: String,
    press_duration: Duration,
    writer: Arc<dyn MessageWriter>,
    events: mpsc::UnboundedSender<StateEvent>,
}

impl StatelessSwitchAccessory {
    pub fn new(
        reference: String,
        name: String,
        press_duration: Duration,
        writer: Arc<dyn MessageWriter>,
        events: mpsc::UnboundedSender<StateEvent>,
    ) -> Self {
        Self {
            reference,
            name,
            press_duration,
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

    /// Forwards `ON`/`OFF` echoes from the bus as transient events.  The
    /// accessory itself stays stateless.
    pub fn handle_signal(&mut self, signal: &Signal) {
        let echoed = match signal.signal_type {
            SignalType::On => true,
            SignalType::Off => false,
            _ => return,
        };
        let _ = self
            .events
            .send(StateEvent::new(&self.reference, StateChange::On(echoed)));
    }

    /// Presses the button: writes `ON` now and the releasing `OFF` after the
    /// press duration.  Requesting "off" is a no-op since there is nothing
    /// to release that the timer does not already release.
    pub fn set_on(&self, value: bool) {
        if !value {
            return;
        }
        self.writer.write_message(
            &MessageBuilder::new(SignalType::On)
                .receiver(self.reference.as_str())
                .build(),
        );

        let writer = Arc::clone(&self.writer);
        let reference = self.reference.clone();
        let press_duration = self.press_duration;
        tokio::spawn(async move {
            time::sleep(press_duration).await;
            debug!(reference = %reference, "releasing switch press");
            writer.write_message(
                &MessageBuilder::new(SignalType::Off)
                    .receiver(reference.as_str())
                    .build(),
            );
        });
    }

    /// A momentary switch always reads as not pressed.
    pub fn is_on(&self) -> bool {
        false
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingWriter;

    fn make_switch(
        press_duration: Duration,
    ) -> (
        StatelessSwitchAccessory,
        Arc<RecordingWriter>,
        mpsc::UnboundedReceiver<StateEvent>,
    ) {
        let writer = Arc::new(RecordingWriter::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let accessory = StatelessSwitchAccessory::new(
            "T1".to_string(),
            "Hall button".to_string(),
            press_duration,
            writer.clone() as Arc<dyn MessageWriter>,
            tx,
        );
        (accessory, writer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_writes_on_then_off_after_the_press_duration() {
        // Arrange
        let (switch, writer, _rx) = make_switch(Duration::from_millis(500));

        // Act
        switch.set_on(true);

        // Assert – the press is immediate, the release is not
        assert_eq!(
            writer.written_lines(),
            vec![r#"{"signal":{"type":"ON","receiver":"T1"}}"#]
        );

        time::sleep(Duration::from_millis(499)).await;
        assert_eq!(writer.written().len(), 1);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(
            writer.written_lines(),
            vec![
                r#"{"signal":{"type":"ON","receiver":"T1"}}"#,
                r#"{"signal":{"type":"OFF","receiver":"T1"}}"#,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requesting_off_writes_nothing() {
        let (switch, writer, _rx) = make_switch(Duration::from_millis(500));

        switch.set_on(false);
        time::sleep(Duration::from_secs(1)).await;

        assert!(writer.written().is_empty());
    }

    #[tokio::test]
    async fn test_reads_are_always_not_pressed() {
        let (switch, _writer, _rx) = make_switch(Duration::from_millis(500));
        assert!(!switch.is_on());
    }

    #[tokio::test]
    async fn test_bus_echo_surfaces_as_transient_event() {
        let (mut switch, _writer, mut rx) = make_switch(Duration::from_millis(500));

        let mut signal = Signal::new(SignalType::On);
        signal.sender = Some("T1".to_string());
        switch.handle_signal(&signal);

        assert_eq!(
            rx.try_recv().unwrap(),
            StateEvent::new("T1", StateChange::On(true))
        );
    }
}
