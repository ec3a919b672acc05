//! Line framing and JSON codec for the bus socket.
//!
//! Wire format: newline-delimited UTF-8 JSON, one [`TwilineMessage`] per
//! line.  Outbound records are written as the bare single-line object
//! without a trailing newline, matching what the bus controller accepts.
//!
//! Chunks read from the socket are split independently: a record split
//! across two reads is *not* reassembled, each fragment fails to parse and
//! is dropped by the dispatcher.  The bus controller writes whole lines per
//! segment in practice; the limitation is pinned by a test in this crate's
//! `tests/wire_format.rs`.

use thiserror::Error;

use crate::protocol::signal::TwilineMessage;

/// Errors produced while parsing or encoding wire records.
#[derive(Debug, Error)]
pub enum WireError {
    /// The line is not valid JSON or does not match the envelope shape.
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope carries neither a signal nor an error.
    #[error("message carries neither a signal nor an error")]
    EmptyEnvelope,
}

/// Splits a raw socket chunk into trimmed, non-empty candidate records.
pub fn split_chunk(chunk: &str) -> impl Iterator<Item = &str> {
    chunk.split('\n').map(str::trim).filter(|line| !line.is_empty())
}

/// Parses one line as a [`TwilineMessage`].
///
/// # Errors
///
/// Returns [`WireError::Json`] for malformed JSON and
/// [`WireError::EmptyEnvelope`] when the object carries neither a `signal`
/// nor an `error` member.
pub fn parse_line(line: &str) -> Result<TwilineMessage, WireError> {
    let message: TwilineMessage = serde_json::from_str(line)?;
    if message.signal.is_none() && message.error.is_none() {
        return Err(WireError::EmptyEnvelope);
    }
    Ok(message)
}

/// Encodes a message as a single-line JSON record.
///
/// # Errors
///
/// Returns [`WireError::Json`] if serialization fails.
pub fn encode_line(message: &TwilineMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(message)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
