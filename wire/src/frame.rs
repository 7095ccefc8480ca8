//! Frame — the universal message envelope.
//!
//! DESIGN
//! ======
//! Every message on the wire is a Frame: one JSON text per WebSocket text
//! message. Both sides route on the full `syscall` name and treat `data` as
//! opaque until the typed [`crate::Event`] layer parses it. Frames are
//! one-way notifications; there is no response correlation and no delivery
//! status.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use board::object::now_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Why a frame or its payload could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a valid JSON frame.
    #[error("failed to decode frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The syscall is not part of the protocol.
    #[error("unknown syscall: {0}")]
    UnknownSyscall(String),
    /// The syscall is known but its payload has the wrong shape.
    #[error("invalid payload for {syscall}: {source}")]
    InvalidPayload {
        syscall: String,
        source: serde_json::Error,
    },
}

/// The universal message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<Uuid>,
    /// Originating user. The relay stamps this on broadcasts so receivers
    /// can attribute cursor and edit traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Uuid>,
    /// Namespaced operation name, e.g. `"object:create"`.
    pub syscall: String,
    /// Payload, parsed on demand by the event layer.
    pub data: Value,
}

impl Frame {
    /// Create a frame. Entry point for every syscall.
    pub fn new(syscall: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            ts: now_ms(),
            board_id: None,
            from: None,
            syscall: syscall.into(),
            data,
        }
    }

    #[must_use]
    pub fn with_board_id(mut self, board_id: Uuid) -> Self {
        self.board_id = Some(board_id);
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: Uuid) -> Self {
        self.from = Some(from);
        self
    }
}

/// Encode a frame as one JSON text message.
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    // A Frame of Value fields cannot fail to serialize.
    serde_json::to_string(frame).unwrap_or_default()
}

/// Decode one JSON text message into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed input.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(text)?)
}
