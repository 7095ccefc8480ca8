//! Shared frame model and JSON codec for realtime WS transport.
//!
//! This crate owns the wire representation used by both `relay` and `sync`.
//! A [`Frame`] is the untyped envelope (id, timestamp, routing fields, JSON
//! payload); an [`Event`] is the typed view of the payload for a known
//! syscall. The protocol is fire-and-forget: there are no request ids to
//! correlate and no ack frames.

pub mod event;
pub mod frame;

pub use event::Event;
pub use frame::{CodecError, Frame, decode_frame, encode_frame};
