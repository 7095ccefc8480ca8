//! Workspace regions: rectangular access-control zones and the spatial
//! permission index.
//!
//! Regions may overlap freely — there is no canonical priority among them.
//! Permission at a point is the *union* across containing regions: one
//! `editor` grant is enough, even when an overlapping region only grants
//! `viewer`. Points covered by no region are editable by everyone
//! (default-open). Both behaviors are preserved deliberately; see DESIGN.md.

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a workspace region.
pub type RegionId = Uuid;

/// A user id as attributed to permission grants and history actions.
pub type UserId = Uuid;

/// Region bounds, normalized so `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRegionBounds")]
pub struct RegionBounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Unnormalized mirror of [`RegionBounds`] used to normalize corner order on
/// deserialization.
#[derive(Deserialize)]
struct RawRegionBounds {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl From<RawRegionBounds> for RegionBounds {
    fn from(raw: RawRegionBounds) -> Self {
        Self::new(raw.x1, raw.y1, raw.x2, raw.y2)
    }
}

impl RegionBounds {
    /// Construct bounds from any two opposite corners.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1: x1.min(x2), y1: y1.min(y2), x2: x1.max(x2), y2: y1.max(y2) }
    }

    /// Whether the point lies inside the region (edges inclusive).
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Who a permission grant applies to: a specific user or everyone (`"*"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Subject {
    /// Wildcard — every user.
    Any,
    /// One specific user.
    User(UserId),
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Any => "*".to_owned(),
            Subject::User(id) => id.to_string(),
        }
    }
}

impl TryFrom<String> for Subject {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "*" {
            return Ok(Self::Any);
        }
        Ok(Self::User(value.parse()?))
    }
}

/// Role granted to a subject within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Editor,
    Viewer,
    None,
}

/// One permission grant on a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub subject: Subject,
    pub role: Role,
}

/// A rectangular, permission-scoped sub-area of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRegion {
    pub id: RegionId,
    pub name: String,
    /// Presentation only.
    pub color: String,
    pub bounds: RegionBounds,
    pub permissions: Vec<Permission>,
    /// A locked region cannot be moved or resized by drag.
    pub is_locked: bool,
    /// Render as redacted for users with no access. A rendering concern
    /// only; the engine never consults it.
    pub obscure_no_access: bool,
}

impl WorkspaceRegion {
    /// Whether this region grants `editor` to the user, directly or via the
    /// wildcard subject.
    #[must_use]
    pub fn grants_edit(&self, user: UserId) -> bool {
        self.permissions.iter().any(|p| {
            p.role == Role::Editor && (p.subject == Subject::Any || p.subject == Subject::User(user))
        })
    }
}

/// The spatial permission index: region CRUD plus point queries.
#[derive(Debug, Default)]
pub struct RegionIndex {
    regions: HashMap<RegionId, WorkspaceRegion>,
}

impl RegionIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self { regions: HashMap::new() }
    }

    /// Insert or replace a region. Plain CRUD — overlapping bounds carry no
    /// consistency constraint.
    pub fn insert(&mut self, region: WorkspaceRegion) {
        self.regions.insert(region.id, region);
    }

    /// Remove a region by id, returning it if present.
    pub fn remove(&mut self, id: &RegionId) -> Option<WorkspaceRegion> {
        self.regions.remove(id)
    }

    /// Return a reference to a region by id.
    #[must_use]
    pub fn get(&self, id: &RegionId) -> Option<&WorkspaceRegion> {
        self.regions.get(id)
    }

    /// Iterate over all regions in arbitrary order.
    pub fn all(&self) -> impl Iterator<Item = &WorkspaceRegion> {
        self.regions.values()
    }

    /// Replace the full region set (the `region:sync` merge).
    pub fn replace_all(&mut self, regions: Vec<WorkspaceRegion>) {
        self.regions.clear();
        for region in regions {
            self.regions.insert(region.id, region);
        }
    }

    /// All regions whose bounds contain the point.
    #[must_use]
    pub fn regions_at(&self, x: f64, y: f64) -> Vec<&WorkspaceRegion> {
        self.regions.values().filter(|r| r.bounds.contains(x, y)).collect()
    }

    /// Whether `user` may edit at the point. Default-open when no region
    /// contains it; otherwise the union across containing regions — at least
    /// one `editor` grant permits editing.
    #[must_use]
    pub fn can_edit_at(&self, user: UserId, x: f64, y: f64) -> bool {
        let containing = self.regions_at(x, y);
        if containing.is_empty() {
            return true;
        }
        containing.iter().any(|r| r.grants_edit(user))
    }

    /// Number of regions in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if the index holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
