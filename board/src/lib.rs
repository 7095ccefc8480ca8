//! Canvas state engine for the collaborative whiteboard.
//!
//! This crate owns the shared board document: the object store, its undo/redo
//! history, the eraser's stroke-splitting algorithm, connector anchor
//! resolution, and the workspace permission index. It performs no I/O — the
//! `sync` and `relay` crates drive it from the network, and a rendering
//! surface reads it to paint the scene.
//!
//! All mutation flows through [`session::Session`], the per-board owner of
//! every component. Local edits are permission-checked, recorded in history,
//! and returned as [`session::Action`]s for the caller to mirror onto the
//! wire. Remote merges enter through separate `apply_*` methods that bypass
//! history, so only the client that made an edit can undo it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Per-board session: local edits, remote merges, undo/redo |
//! | [`store`] | In-memory object store |
//! | [`history`] | Bounded linear undo/redo stack |
//! | [`eraser`] | Erase-gesture segmentation (stroke splitting) |
//! | [`connector`] | Connector anchor resolution and path recompute |
//! | [`region`] | Workspace regions and the spatial permission index |
//! | [`object`] | Board object types and the kind-tagged payload union |
//! | [`geom`] | Points, bounding boxes, and the pan/zoom viewport |
//! | [`snapshot`] | Board export/import serialization contract |
//! | [`consts`] | Shared numeric constants (history capacity, zoom floor) |

pub mod connector;
pub mod consts;
pub mod eraser;
pub mod geom;
pub mod history;
pub mod object;
pub mod region;
pub mod session;
pub mod snapshot;
pub mod store;
