//! Shared test doubles for the application layer.

use std::sync::Mutex;

use twiline_core::{encode_line, TwilineMessage};

use crate::application::MessageWriter;

/// Records every message written through it.
#[derive(Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<TwilineMessage>>,
}

impl RecordingWriter {
    /// Everything written so far, in order.
    pub fn written(&self) -> Vec<TwilineMessage> {
        self.written.lock().unwrap().clone()
    }

    /// The written messages as wire lines, for exact-string assertions.
    pub fn written_lines(&self) -> Vec<String> {
        self.written()
            .iter()
            .map(|m| encode_line(m).unwrap())
            .collect()
    }
}

impl MessageWriter for RecordingWriter {
    fn write_message(&self, message: &TwilineMessage) {
        self.written.lock().unwrap().push(message.clone());
    }
}
