//! Per-board session: the single owner of store, history, regions, and
//! viewport.
//!
//! DESIGN
//! ======
//! The session replaces what the original product kept as one process-wide
//! reactive store: every component is an explicit field, constructed per
//! board, and everything that mutates the board goes through a session
//! method. There are two disjoint entry families:
//!
//! - **Local edits** (`create_object`, `update_object`, `delete_object`,
//!   `erase_at`, region CRUD, `undo`, `redo`): permission-checked against
//!   the region index, recorded in history where undoable, followed by a
//!   connector recompute when bounds changed, and returned as [`Action`]s
//!   for the sync layer to mirror onto the wire.
//! - **Remote merges** (`apply_created`, `apply_updated`, `apply_deleted`,
//!   `merge_sync`, region appliers): store writes that bypass history
//!   entirely, so remote edits never become locally undoable. They return
//!   nothing — every peer recomputes connectors locally, so re-broadcasting
//!   derived updates would only echo.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::connector;
use crate::eraser;
use crate::geom::{Point, Viewport};
use crate::history::{self, HistoryAction, HistoryEntry, HistoryStack};
use crate::object::{CanvasObject, ObjectId, PartialObject};
use crate::region::{RegionId, RegionIndex, UserId, WorkspaceRegion};
use crate::store::ObjectStore;

/// A locally-applied mutation that must be mirrored to the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated(CanvasObject),
    ObjectUpdated { id: ObjectId, changes: PartialObject },
    ObjectDeleted { id: ObjectId },
    RegionCreated(WorkspaceRegion),
    RegionUpdated(WorkspaceRegion),
    RegionDeleted { id: RegionId },
}

/// Why a local edit was refused. Refusals never mutate any state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("editing denied at ({x}, {y}) by workspace permissions")]
    EditDenied { x: f64, y: f64 },
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("region not found: {0}")]
    RegionNotFound(RegionId),
    #[error("region is locked and cannot be moved or resized: {0}")]
    RegionLocked(RegionId),
}

/// Everything one client knows about one board.
pub struct Session {
    pub store: ObjectStore,
    pub history: HistoryStack,
    pub regions: RegionIndex,
    pub viewport: Viewport,
    /// The local user, attributed to history entries and permission checks.
    pub user_id: UserId,
}

impl Session {
    /// Create an empty session for a user.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            store: ObjectStore::new(),
            history: HistoryStack::default(),
            regions: RegionIndex::new(),
            viewport: Viewport::default(),
            user_id,
        }
    }

    // --- Local edits ---

    /// Create an object locally.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EditDenied`] when the permission index
    /// refuses the object's center point.
    pub fn create_object(&mut self, object: CanvasObject) -> Result<Vec<Action>, SessionError> {
        self.check_edit(object.bounds.center())?;

        self.store.put(object.clone());
        self.record(HistoryAction::Add { object: object.clone() });

        let mut actions = vec![Action::ObjectCreated(object)];
        actions.extend(self.resolve_connectors());
        Ok(actions)
    }

    /// Apply a sparse update to an object locally. The full before and after
    /// values are recorded, not the diff.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ObjectNotFound`] for unknown ids and
    /// [`SessionError::EditDenied`] when either the current or the target
    /// position is not editable by this user.
    pub fn update_object(&mut self, id: ObjectId, changes: &PartialObject) -> Result<Vec<Action>, SessionError> {
        let before = self
            .store
            .get(&id)
            .cloned()
            .ok_or(SessionError::ObjectNotFound(id))?;
        let after = changes.apply_to(&before);

        // Moving out of a region needs edit rights in it, and moving into
        // one needs rights there too.
        self.check_edit(before.bounds.center())?;
        self.check_edit(after.bounds.center())?;

        self.store.put(after.clone());
        self.record(HistoryAction::Update { before, after });

        let mut actions = vec![Action::ObjectUpdated { id, changes: changes.clone() }];
        actions.extend(self.resolve_connectors());
        Ok(actions)
    }

    /// Delete an object locally.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ObjectNotFound`] or
    /// [`SessionError::EditDenied`].
    pub fn delete_object(&mut self, id: ObjectId) -> Result<Vec<Action>, SessionError> {
        let object = self
            .store
            .get(&id)
            .cloned()
            .ok_or(SessionError::ObjectNotFound(id))?;
        self.check_edit(object.bounds.center())?;

        self.store.delete(&id);
        self.record(HistoryAction::Delete { object });

        let mut actions = vec![Action::ObjectDeleted { id }];
        actions.extend(self.resolve_connectors());
        Ok(actions)
    }

    /// Apply one erase sample. All deletions and fragment creations of the
    /// sample form a single `Multi` history entry, so one undo restores the
    /// pre-erase state exactly. A sample that touches nothing records no
    /// history and returns no actions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EditDenied`] when the erase point itself is
    /// not editable.
    pub fn erase_at(&mut self, center: Point, radius: f64) -> Result<Vec<Action>, SessionError> {
        self.check_edit(center)?;

        let outcome = eraser::erase_at(&self.store, center, radius);
        if outcome.is_empty() {
            return Ok(Vec::new());
        }

        let mut actions = Vec::new();
        for obj in &outcome.deleted {
            self.store.delete(&obj.id);
            actions.push(Action::ObjectDeleted { id: obj.id });
        }
        for obj in &outcome.created {
            self.store.put(obj.clone());
            actions.push(Action::ObjectCreated(obj.clone()));
        }
        self.record(HistoryAction::Multi { deleted: outcome.deleted, created: outcome.created });

        actions.extend(self.resolve_connectors());
        Ok(actions)
    }

    // --- Undo / redo ---

    /// Undo the most recent local action. Returns the mutations to mirror,
    /// or nothing when there is no history to step back — never an error.
    pub fn undo(&mut self) -> Vec<Action> {
        let Some(action) = self.history.undo() else {
            return Vec::new();
        };
        history::apply_inverse(&action, &mut self.store);
        let mut actions = inverse_actions(&action);
        actions.extend(self.resolve_connectors());
        actions
    }

    /// Reapply the most recently undone local action. No-op at the end of
    /// the log.
    pub fn redo(&mut self) -> Vec<Action> {
        let Some(action) = self.history.redo() else {
            return Vec::new();
        };
        history::apply_forward(&action, &mut self.store);
        let mut actions = forward_actions(&action);
        actions.extend(self.resolve_connectors());
        actions
    }

    /// Whether `undo` would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether `redo` would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Region CRUD (local) ---

    /// Create a workspace region. Plain CRUD; overlap is unconstrained.
    pub fn create_region(&mut self, region: WorkspaceRegion) -> Vec<Action> {
        self.regions.insert(region.clone());
        vec![Action::RegionCreated(region)]
    }

    /// Update a workspace region.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RegionNotFound`] for unknown ids and
    /// [`SessionError::RegionLocked`] when the update would move or resize a
    /// locked region.
    pub fn update_region(&mut self, region: WorkspaceRegion) -> Result<Vec<Action>, SessionError> {
        let existing = self
            .regions
            .get(&region.id)
            .ok_or(SessionError::RegionNotFound(region.id))?;
        if existing.is_locked && existing.bounds != region.bounds {
            return Err(SessionError::RegionLocked(region.id));
        }

        self.regions.insert(region.clone());
        Ok(vec![Action::RegionUpdated(region)])
    }

    /// Delete a workspace region.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RegionNotFound`] for unknown ids.
    pub fn delete_region(&mut self, id: RegionId) -> Result<Vec<Action>, SessionError> {
        self.regions
            .remove(&id)
            .ok_or(SessionError::RegionNotFound(id))?;
        Ok(vec![Action::RegionDeleted { id }])
    }

    // --- Remote merges (never recorded in history) ---

    /// Apply a remote broadcast: object created.
    pub fn apply_created(&mut self, object: CanvasObject) {
        self.store.put(object);
        self.resolve_connectors_silent();
    }

    /// Apply a remote broadcast: object updated. Unknown ids are tolerated
    /// and skipped — the next full-board sync repairs the gap.
    pub fn apply_updated(&mut self, id: &ObjectId, changes: &PartialObject) {
        let Some(before) = self.store.get(id) else {
            return;
        };
        let after = changes.apply_to(before);
        self.store.put(after);
        self.resolve_connectors_silent();
    }

    /// Apply a remote broadcast: object deleted.
    pub fn apply_deleted(&mut self, id: &ObjectId) {
        self.store.delete(id);
        self.resolve_connectors_silent();
    }

    /// Merge a full-board snapshot by add-if-absent: objects already present
    /// locally are never overwritten. Returns the number of objects added.
    pub fn merge_sync(&mut self, objects: Vec<CanvasObject>) -> usize {
        let added = self.store.merge_absent(objects);
        if added > 0 {
            self.resolve_connectors_silent();
        }
        added
    }

    /// Apply a remote region create or update.
    pub fn apply_region_saved(&mut self, region: WorkspaceRegion) {
        self.regions.insert(region);
    }

    /// Apply a remote region delete.
    pub fn apply_region_deleted(&mut self, id: &RegionId) {
        self.regions.remove(id);
    }

    /// Replace the full region set from a `region:sync` broadcast.
    pub fn replace_regions(&mut self, regions: Vec<WorkspaceRegion>) {
        self.regions.replace_all(regions);
    }

    // --- Queries ---

    /// The full local object set, for `board:publish` on connect.
    #[must_use]
    pub fn publish_set(&self) -> Vec<CanvasObject> {
        self.store.snapshot()
    }

    /// Whether this user may edit at a board point.
    #[must_use]
    pub fn can_edit_at(&self, x: f64, y: f64) -> bool {
        self.regions.can_edit_at(self.user_id, x, y)
    }

    // --- Internals ---

    fn check_edit(&self, point: Point) -> Result<(), SessionError> {
        if self.regions.can_edit_at(self.user_id, point.x, point.y) {
            return Ok(());
        }
        Err(SessionError::EditDenied { x: point.x, y: point.y })
    }

    fn record(&mut self, action: HistoryAction) {
        self.history.push(HistoryEntry::new(action, self.user_id));
    }

    /// Recompute connector paths after a bounds-changing mutation, write the
    /// replacements back, and return the updates to mirror.
    fn resolve_connectors(&mut self) -> Vec<Action> {
        let updated = connector::recompute_paths(&self.store);
        let mut actions = Vec::with_capacity(updated.len());
        for obj in updated {
            let changes = PartialObject::from_object(&obj);
            let id = obj.id;
            self.store.put(obj);
            actions.push(Action::ObjectUpdated { id, changes });
        }
        actions
    }

    /// Connector recompute for remote merges: written back locally but not
    /// mirrored, because every peer derives the same result.
    fn resolve_connectors_silent(&mut self) {
        for obj in connector::recompute_paths(&self.store) {
            self.store.put(obj);
        }
    }
}

/// Actions mirroring the inverse (undo direction) of a history action.
fn inverse_actions(action: &HistoryAction) -> Vec<Action> {
    match action {
        HistoryAction::Add { object } => vec![Action::ObjectDeleted { id: object.id }],
        HistoryAction::Update { before, .. } => vec![Action::ObjectUpdated {
            id: before.id,
            changes: PartialObject::from_object(before),
        }],
        HistoryAction::Delete { object } => vec![Action::ObjectCreated(object.clone())],
        HistoryAction::Multi { deleted, created } => {
            let mut actions: Vec<Action> = created
                .iter()
                .map(|obj| Action::ObjectDeleted { id: obj.id })
                .collect();
            actions.extend(deleted.iter().map(|obj| Action::ObjectCreated(obj.clone())));
            actions
        }
    }
}

/// Actions mirroring the forward (redo direction) of a history action.
fn forward_actions(action: &HistoryAction) -> Vec<Action> {
    match action {
        HistoryAction::Add { object } => vec![Action::ObjectCreated(object.clone())],
        HistoryAction::Update { after, .. } => vec![Action::ObjectUpdated {
            id: after.id,
            changes: PartialObject::from_object(after),
        }],
        HistoryAction::Delete { object } => vec![Action::ObjectDeleted { id: object.id }],
        HistoryAction::Multi { deleted, created } => {
            let mut actions: Vec<Action> = deleted
                .iter()
                .map(|obj| Action::ObjectDeleted { id: obj.id })
                .collect();
            actions.extend(created.iter().map(|obj| Action::ObjectCreated(obj.clone())));
            actions
        }
    }
}
