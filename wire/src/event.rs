//! Typed view of frame payloads.
//!
//! Syscalls come in imperative/past-tense pairs: a client sends the
//! imperative (`object:create`), the relay applies it and rebroadcasts the
//! past tense (`object:created`) to everyone else. `board:publish` and
//! `board:sync` are the join handshake; `region:sync` replaces the full
//! region set; cursor traffic is presence only and never stored.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use board::object::{CanvasObject, ObjectId, PartialObject};
use board::region::{RegionId, WorkspaceRegion};
use board::session::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frame::{CodecError, Frame};

// =============================================================================
// SYSCALLS
// =============================================================================

pub const BOARD_PUBLISH: &str = "board:publish";
pub const BOARD_SYNC: &str = "board:sync";
pub const OBJECT_CREATE: &str = "object:create";
pub const OBJECT_CREATED: &str = "object:created";
pub const OBJECT_UPDATE: &str = "object:update";
pub const OBJECT_UPDATED: &str = "object:updated";
pub const OBJECT_DELETE: &str = "object:delete";
pub const OBJECT_DELETED: &str = "object:deleted";
pub const REGION_CREATE: &str = "region:create";
pub const REGION_CREATED: &str = "region:created";
pub const REGION_UPDATE: &str = "region:update";
pub const REGION_UPDATED: &str = "region:updated";
pub const REGION_DELETE: &str = "region:delete";
pub const REGION_DELETED: &str = "region:deleted";
pub const REGION_SYNC: &str = "region:sync";
pub const CURSOR_MOVE: &str = "cursor:move";
pub const CURSOR_UPDATE: &str = "cursor:update";
pub const GATEWAY_ERROR: &str = "gateway:error";

// =============================================================================
// PAYLOAD SHAPES
// =============================================================================

#[derive(Serialize, Deserialize)]
struct ObjectsPayload {
    objects: Vec<CanvasObject>,
}

#[derive(Serialize, Deserialize)]
struct ObjectPayload {
    object: CanvasObject,
}

#[derive(Serialize, Deserialize)]
struct UpdatePayload {
    id: ObjectId,
    changes: PartialObject,
}

#[derive(Serialize, Deserialize)]
struct IdPayload {
    id: ObjectId,
}

#[derive(Serialize, Deserialize)]
struct RegionPayload {
    region: WorkspaceRegion,
}

#[derive(Serialize, Deserialize)]
struct RegionsPayload {
    regions: Vec<WorkspaceRegion>,
}

#[derive(Serialize, Deserialize)]
struct CursorPayload {
    x: f64,
    y: f64,
}

#[derive(Serialize, Deserialize)]
struct ErrorPayload {
    message: String,
}

// =============================================================================
// EVENT
// =============================================================================

/// A decoded protocol message. Imperative variants flow client-to-relay;
/// past-tense variants flow relay-to-client.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Full local object set, offered to the relay on connect.
    Publish { objects: Vec<CanvasObject> },
    /// Full board object set, merged add-if-absent by the receiver.
    Sync { objects: Vec<CanvasObject> },
    ObjectCreate { object: CanvasObject },
    ObjectCreated { object: CanvasObject },
    ObjectUpdate { id: ObjectId, changes: PartialObject },
    ObjectUpdated { id: ObjectId, changes: PartialObject },
    ObjectDelete { id: ObjectId },
    ObjectDeleted { id: ObjectId },
    RegionCreate { region: WorkspaceRegion },
    RegionCreated { region: WorkspaceRegion },
    RegionUpdate { region: WorkspaceRegion },
    RegionUpdated { region: WorkspaceRegion },
    RegionDelete { id: RegionId },
    RegionDeleted { id: RegionId },
    /// Full region set, replacing the receiver's index.
    RegionSync { regions: Vec<WorkspaceRegion> },
    CursorMove { x: f64, y: f64 },
    CursorUpdate { x: f64, y: f64 },
    /// Relay-to-sender notice that an inbound frame was dropped.
    GatewayError { message: String },
}

impl Event {
    /// Parse a frame's payload by its syscall.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownSyscall`] for syscalls outside the
    /// protocol and [`CodecError::InvalidPayload`] when the payload does not
    /// match the syscall's shape.
    pub fn from_frame(frame: &Frame) -> Result<Self, CodecError> {
        let syscall = frame.syscall.as_str();
        let data = frame.data.clone();
        match syscall {
            BOARD_PUBLISH => {
                let p: ObjectsPayload = parse(syscall, data)?;
                Ok(Self::Publish { objects: p.objects })
            }
            BOARD_SYNC => {
                let p: ObjectsPayload = parse(syscall, data)?;
                Ok(Self::Sync { objects: p.objects })
            }
            OBJECT_CREATE => {
                let p: ObjectPayload = parse(syscall, data)?;
                Ok(Self::ObjectCreate { object: p.object })
            }
            OBJECT_CREATED => {
                let p: ObjectPayload = parse(syscall, data)?;
                Ok(Self::ObjectCreated { object: p.object })
            }
            OBJECT_UPDATE => {
                let p: UpdatePayload = parse(syscall, data)?;
                Ok(Self::ObjectUpdate { id: p.id, changes: p.changes })
            }
            OBJECT_UPDATED => {
                let p: UpdatePayload = parse(syscall, data)?;
                Ok(Self::ObjectUpdated { id: p.id, changes: p.changes })
            }
            OBJECT_DELETE => {
                let p: IdPayload = parse(syscall, data)?;
                Ok(Self::ObjectDelete { id: p.id })
            }
            OBJECT_DELETED => {
                let p: IdPayload = parse(syscall, data)?;
                Ok(Self::ObjectDeleted { id: p.id })
            }
            REGION_CREATE => {
                let p: RegionPayload = parse(syscall, data)?;
                Ok(Self::RegionCreate { region: p.region })
            }
            REGION_CREATED => {
                let p: RegionPayload = parse(syscall, data)?;
                Ok(Self::RegionCreated { region: p.region })
            }
            REGION_UPDATE => {
                let p: RegionPayload = parse(syscall, data)?;
                Ok(Self::RegionUpdate { region: p.region })
            }
            REGION_UPDATED => {
                let p: RegionPayload = parse(syscall, data)?;
                Ok(Self::RegionUpdated { region: p.region })
            }
            REGION_DELETE => {
                let p: IdPayload = parse(syscall, data)?;
                Ok(Self::RegionDelete { id: p.id })
            }
            REGION_DELETED => {
                let p: IdPayload = parse(syscall, data)?;
                Ok(Self::RegionDeleted { id: p.id })
            }
            REGION_SYNC => {
                let p: RegionsPayload = parse(syscall, data)?;
                Ok(Self::RegionSync { regions: p.regions })
            }
            CURSOR_MOVE => {
                let p: CursorPayload = parse(syscall, data)?;
                Ok(Self::CursorMove { x: p.x, y: p.y })
            }
            CURSOR_UPDATE => {
                let p: CursorPayload = parse(syscall, data)?;
                Ok(Self::CursorUpdate { x: p.x, y: p.y })
            }
            GATEWAY_ERROR => {
                let p: ErrorPayload = parse(syscall, data)?;
                Ok(Self::GatewayError { message: p.message })
            }
            other => Err(CodecError::UnknownSyscall(other.to_owned())),
        }
    }

    /// Build the outbound frame for this event.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        let (syscall, data) = match self {
            Self::Publish { objects } => (BOARD_PUBLISH, to_value(&ObjectsPayload { objects })),
            Self::Sync { objects } => (BOARD_SYNC, to_value(&ObjectsPayload { objects })),
            Self::ObjectCreate { object } => (OBJECT_CREATE, to_value(&ObjectPayload { object })),
            Self::ObjectCreated { object } => (OBJECT_CREATED, to_value(&ObjectPayload { object })),
            Self::ObjectUpdate { id, changes } => {
                (OBJECT_UPDATE, to_value(&UpdatePayload { id, changes }))
            }
            Self::ObjectUpdated { id, changes } => {
                (OBJECT_UPDATED, to_value(&UpdatePayload { id, changes }))
            }
            Self::ObjectDelete { id } => (OBJECT_DELETE, to_value(&IdPayload { id })),
            Self::ObjectDeleted { id } => (OBJECT_DELETED, to_value(&IdPayload { id })),
            Self::RegionCreate { region } => (REGION_CREATE, to_value(&RegionPayload { region })),
            Self::RegionCreated { region } => (REGION_CREATED, to_value(&RegionPayload { region })),
            Self::RegionUpdate { region } => (REGION_UPDATE, to_value(&RegionPayload { region })),
            Self::RegionUpdated { region } => (REGION_UPDATED, to_value(&RegionPayload { region })),
            Self::RegionDelete { id } => (REGION_DELETE, to_value(&IdPayload { id })),
            Self::RegionDeleted { id } => (REGION_DELETED, to_value(&IdPayload { id })),
            Self::RegionSync { regions } => (REGION_SYNC, to_value(&RegionsPayload { regions })),
            Self::CursorMove { x, y } => (CURSOR_MOVE, to_value(&CursorPayload { x, y })),
            Self::CursorUpdate { x, y } => (CURSOR_UPDATE, to_value(&CursorPayload { x, y })),
            Self::GatewayError { message } => (GATEWAY_ERROR, to_value(&ErrorPayload { message })),
        };
        Frame::new(syscall, data)
    }

    /// The imperative event mirroring a locally applied mutation.
    #[must_use]
    pub fn from_action(action: Action) -> Self {
        match action {
            Action::ObjectCreated(object) => Self::ObjectCreate { object },
            Action::ObjectUpdated { id, changes } => Self::ObjectUpdate { id, changes },
            Action::ObjectDeleted { id } => Self::ObjectDelete { id },
            Action::RegionCreated(region) => Self::RegionCreate { region },
            Action::RegionUpdated(region) => Self::RegionUpdate { region },
            Action::RegionDeleted { id } => Self::RegionDelete { id },
        }
    }

    /// The past-tense counterpart the relay broadcasts for an imperative
    /// mutation, or `None` for events that are not rebroadcast as-is.
    #[must_use]
    pub fn into_broadcast(self) -> Option<Self> {
        match self {
            Self::ObjectCreate { object } => Some(Self::ObjectCreated { object }),
            Self::ObjectUpdate { id, changes } => Some(Self::ObjectUpdated { id, changes }),
            Self::ObjectDelete { id } => Some(Self::ObjectDeleted { id }),
            Self::RegionCreate { region } => Some(Self::RegionCreated { region }),
            Self::RegionUpdate { region } => Some(Self::RegionUpdated { region }),
            Self::RegionDelete { id } => Some(Self::RegionDeleted { id }),
            Self::CursorMove { x, y } => Some(Self::CursorUpdate { x, y }),
            _ => None,
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(syscall: &str, data: Value) -> Result<T, CodecError> {
    serde_json::from_value(data).map_err(|source| CodecError::InvalidPayload {
        syscall: syscall.to_owned(),
        source,
    })
}

fn to_value<T: Serialize>(payload: &T) -> Value {
    // Payload structs of serde types cannot fail to serialize.
    serde_json::to_value(payload).unwrap_or(Value::Null)
}
