//! Board object model: drawable entities and the kind-tagged payload union.
//!
//! Every drawable on the board is a [`CanvasObject`]: an id, a bounding box,
//! a creation timestamp, and a [`Payload`] carrying the kind-specific data.
//! Objects are immutable value types — mutation always replaces the stored
//! value, never edits in place, so history snapshots stay cheap to retain.
//!
//! [`PartialObject`] is the sparse-update companion used on the wire for
//! incremental edits: only present fields are applied.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{Bounds, Point};

/// Unique identifier for a board object.
///
/// All creation paths — including eraser fragments — mint random v4 ids, so
/// concurrent creation by two clients in the same millisecond cannot collide.
pub type ObjectId = Uuid;

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// The kind of a board object. Matches the wire `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Freehand polyline.
    Stroke,
    /// Filled geometric shape.
    Shape,
    /// Free-standing text.
    Text,
    /// Sticky note.
    Sticky,
    /// Image placeholder.
    Image,
    /// Video placeholder.
    Video,
    /// Audio placeholder.
    Audio,
    /// Line anchored to two objects.
    Connector,
}

/// Geometric shape variants for [`ShapeData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Diamond,
    Star,
}

/// A named attachment point on an object's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    Top,
    Right,
    Bottom,
    Left,
    Center,
}

/// One endpoint of a connector: the referenced object and the anchor
/// position on its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorAnchor {
    pub object_id: ObjectId,
    pub position: AnchorPosition,
}

/// Freehand stroke: an ordered point list plus style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeData {
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

/// Geometric shape with fill and outline style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    pub shape: ShapeKind,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

/// Free-standing text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
    pub color: String,
    pub font_size: f64,
}

/// Sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyData {
    pub text: String,
    pub color: String,
}

/// Media placeholder. Upload handling lives outside the engine; the payload
/// only carries an opaque source reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    pub source: String,
}

/// Connector between two anchored objects. `start` and `end` are the last
/// resolved concrete points; the resolver rewrites them when an endpoint
/// object moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorData {
    pub source: ConnectorAnchor,
    pub target: ConnectorAnchor,
    pub start: Point,
    pub end: Point,
    pub color: String,
    pub width: f64,
}

/// Kind-specific object data, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Stroke(StrokeData),
    Shape(ShapeData),
    Text(TextData),
    Sticky(StickyData),
    Image(MediaData),
    Video(MediaData),
    Audio(MediaData),
    Connector(ConnectorData),
}

impl Payload {
    /// The object kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Stroke(_) => ObjectKind::Stroke,
            Self::Shape(_) => ObjectKind::Shape,
            Self::Text(_) => ObjectKind::Text,
            Self::Sticky(_) => ObjectKind::Sticky,
            Self::Image(_) => ObjectKind::Image,
            Self::Video(_) => ObjectKind::Video,
            Self::Audio(_) => ObjectKind::Audio,
            Self::Connector(_) => ObjectKind::Connector,
        }
    }
}

/// A board object as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Axis-aligned bounding box in board coordinates. A stroke's box is
    /// always the min/max hull of its point list.
    pub bounds: Bounds,
    /// Milliseconds since the Unix epoch at creation.
    pub created_at: i64,
    /// Kind-specific data, flattened so the wire carries a flat `kind` tag.
    #[serde(flatten)]
    pub payload: Payload,
}

impl CanvasObject {
    /// Create an object with a fresh id and the current timestamp. Stroke
    /// bounds are recomputed from the point list regardless of the argument.
    #[must_use]
    pub fn new(bounds: Bounds, payload: Payload) -> Self {
        let bounds = match &payload {
            Payload::Stroke(data) => Bounds::from_points(data.points.iter().copied()),
            _ => bounds,
        };
        Self { id: Uuid::new_v4(), bounds, created_at: now_ms(), payload }
    }

    /// The object's kind, derived from its payload.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }
}

/// Sparse update for a board object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialObject {
    /// New x position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Full replacement payload, if the kind-specific data changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl PartialObject {
    /// Sparse update that moves an object to a new position.
    #[must_use]
    pub fn moved_to(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Sparse update carrying every field of `obj`, for mirroring a full
    /// replacement value onto the wire.
    #[must_use]
    pub fn from_object(obj: &CanvasObject) -> Self {
        Self {
            x: Some(obj.bounds.x),
            y: Some(obj.bounds.y),
            width: Some(obj.bounds.width),
            height: Some(obj.bounds.height),
            payload: Some(obj.payload.clone()),
        }
    }

    /// Merge this update onto an object, returning the replacement value.
    ///
    /// Moving a stroke translates its points along with the box, and stroke
    /// bounds are re-hulled afterwards so the point-list invariant holds.
    #[must_use]
    pub fn apply_to(&self, obj: &CanvasObject) -> CanvasObject {
        let mut next = obj.clone();
        if let Some(payload) = &self.payload {
            next.payload = payload.clone();
        }
        let dx = self.x.map_or(0.0, |x| x - obj.bounds.x);
        let dy = self.y.map_or(0.0, |y| y - obj.bounds.y);
        if let Some(x) = self.x {
            next.bounds.x = x;
        }
        if let Some(y) = self.y {
            next.bounds.y = y;
        }
        if let Some(width) = self.width {
            next.bounds.width = width.max(0.0);
        }
        if let Some(height) = self.height {
            next.bounds.height = height.max(0.0);
        }
        if let Payload::Stroke(data) = &mut next.payload {
            if self.payload.is_none() && (dx != 0.0 || dy != 0.0) {
                for pt in &mut data.points {
                    pt.x += dx;
                    pt.y += dy;
                }
            }
            next.bounds = Bounds::from_points(data.points.iter().copied());
        }
        next
    }
}
