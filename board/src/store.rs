//! In-memory object store: the map of live canvas objects.
//!
//! The store is a plain map with no validation and no side effects. Whether a
//! mutation is recorded in history is the caller's decision — the session
//! records local edits and skips recording for remote merges. Dependent
//! recomputation (the connector resolver) is likewise invoked explicitly by
//! callers after bounds-changing mutations, never automatically.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use crate::object::{CanvasObject, ObjectId};

/// The map of live board objects, keyed by id.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectId, CanvasObject>,
}

impl ObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new() }
    }

    /// Return a reference to an object by id.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.get(id)
    }

    /// Insert or replace an object. An existing object with the same id is
    /// overwritten — objects are immutable values, so replacement is the only
    /// form of mutation.
    pub fn put(&mut self, obj: CanvasObject) {
        self.objects.insert(obj.id, obj);
    }

    /// Remove an object by id, returning it if it was present.
    pub fn delete(&mut self, id: &ObjectId) -> Option<CanvasObject> {
        self.objects.remove(id)
    }

    /// Iterate over all live objects in arbitrary order.
    pub fn all(&self) -> impl Iterator<Item = &CanvasObject> {
        self.objects.values()
    }

    /// All objects sorted by `(created_at, id)` for deterministic snapshots
    /// and publishes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanvasObject> {
        let mut objs: Vec<CanvasObject> = self.objects.values().cloned().collect();
        objs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        objs
    }

    /// Bulk add-if-absent merge: objects already present locally are never
    /// overwritten. First-writer-wins on join, not last-writer-wins. Returns
    /// the number of objects actually added.
    pub fn merge_absent(&mut self, objects: Vec<CanvasObject>) -> usize {
        let mut added = 0;
        for obj in objects {
            if !self.objects.contains_key(&obj.id) {
                self.objects.insert(obj.id, obj);
                added += 1;
            }
        }
        added
    }

    /// Replace all objects with a full snapshot.
    pub fn load(&mut self, objects: Vec<CanvasObject>) {
        self.objects.clear();
        for obj in objects {
            self.objects.insert(obj.id, obj);
        }
    }

    /// Number of objects currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
