//! Undo/redo history: a bounded linear action log with a cursor.
//!
//! Actions carry full before/after object values, never diffs, so applying
//! an inverse is a plain store write with no reconstruction. Pushing after an
//! undo discards the redo branch (standard redo-discard semantics), and
//! exceeding capacity silently evicts the single oldest entry — capacity
//! overflow never rejects a new action.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use uuid::Uuid;

use crate::consts::HISTORY_CAPACITY;
use crate::object::{CanvasObject, now_ms};
use crate::store::ObjectStore;

/// One undoable unit.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// An object was created.
    Add { object: CanvasObject },
    /// An object was replaced. Both full values are retained.
    Update { before: CanvasObject, after: CanvasObject },
    /// An object was deleted.
    Delete { object: CanvasObject },
    /// A composite mutation: one eraser sample, cut, paste, duplicate, or
    /// multi-delete. One undo restores the whole set exactly.
    Multi {
        deleted: Vec<CanvasObject>,
        created: Vec<CanvasObject>,
    },
}

/// A history action plus its attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    /// Milliseconds since the Unix epoch when the action was recorded.
    pub ts: i64,
    /// User who performed the action.
    pub actor_id: Uuid,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(action: HistoryAction, actor_id: Uuid) -> Self {
        Self { action, ts: now_ms(), actor_id }
    }
}

/// Apply the inverse of an action to the store (the undo direction).
pub fn apply_inverse(action: &HistoryAction, store: &mut ObjectStore) {
    match action {
        HistoryAction::Add { object } => {
            store.delete(&object.id);
        }
        HistoryAction::Update { before, .. } => {
            store.put(before.clone());
        }
        HistoryAction::Delete { object } => {
            store.put(object.clone());
        }
        HistoryAction::Multi { deleted, created } => {
            for obj in created {
                store.delete(&obj.id);
            }
            for obj in deleted {
                store.put(obj.clone());
            }
        }
    }
}

/// Apply the forward effect of an action to the store (the redo direction).
pub fn apply_forward(action: &HistoryAction, store: &mut ObjectStore) {
    match action {
        HistoryAction::Add { object } => {
            store.put(object.clone());
        }
        HistoryAction::Update { after, .. } => {
            store.put(after.clone());
        }
        HistoryAction::Delete { object } => {
            store.delete(&object.id);
        }
        HistoryAction::Multi { deleted, created } => {
            for obj in deleted {
                store.delete(&obj.id);
            }
            for obj in created {
                store.put(obj.clone());
            }
        }
    }
}

/// Bounded linear undo/redo stack.
///
/// `cursor` counts applied entries: `entries[..cursor]` have been applied,
/// `entries[cursor..]` are the redo branch.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    /// Create an empty stack retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::new(), cursor: 0, capacity: capacity.max(1) }
    }

    /// Record a new action: prune the redo branch, append, and evict the
    /// oldest entry if over capacity. Eviction makes the deepest undo state
    /// permanently unreachable; that loss is accepted rather than refusing
    /// the push.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step the cursor back and return the action to invert. `None` when
    /// there is nothing to undo — never an error.
    pub fn undo(&mut self) -> Option<HistoryAction> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].action.clone())
    }

    /// Step the cursor forward and return the action to reapply. `None` at
    /// the end of the log.
    pub fn redo(&mut self) -> Option<HistoryAction> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let action = self.entries[self.cursor].action.clone();
        self.cursor += 1;
        Some(action)
    }

    /// Whether `undo` would do anything. Callers use this to disable
    /// affordances, since `undo` itself silently no-ops.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether `redo` would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all history, e.g. when the board is cleared or replaced by an
    /// import.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
