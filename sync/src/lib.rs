//! Client-side sync engine: one shared [`board::session::Session`] kept
//! converged with a relay over WebSocket.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | Optimistic local edits, connection loop, reconnect |
//! | [`merge`] | Inbound frame handling: remote merges and presence |
//!
//! Local edits apply to the shared session at submit time and are mirrored
//! to the wire afterwards; they are never rolled back, and a disconnect
//! only pauses mirroring until the reconnect loop re-publishes. The UI
//! reads board state through [`SyncHandle::read`].

pub mod client;
pub mod merge;

pub use client::{ConnectionStatus, LocalEdit, SyncClient, SyncConfig, SyncHandle, spawn};
