//! Connector anchor resolution and path recompute.
//!
//! Connectors reference their endpoint objects by id and anchor position.
//! After any bounds-changing mutation the session calls [`recompute_paths`],
//! which resolves every connector's anchors against the *current* bounds of
//! the referenced objects and returns replacement values only for connectors
//! whose resolved points actually differ from the stored ones. The
//! structural-equality short-circuit keeps redundant store writes — and the
//! broadcast traffic they would mirror — off the wire.
//!
//! A connector whose endpoint object no longer exists is left stale: its
//! last-known points are kept and it is never auto-deleted, since the
//! geometry stays visually coherent until the next successful resolve.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use crate::geom::{Bounds, Point};
use crate::object::{AnchorPosition, CanvasObject, ConnectorAnchor, Payload};
use crate::store::ObjectStore;

/// Resolve an anchor position to a concrete point on a bounding box.
#[must_use]
pub fn resolve_anchor(position: AnchorPosition, bounds: Bounds) -> Point {
    let center = bounds.center();
    match position {
        AnchorPosition::Top => Point::new(center.x, bounds.y),
        AnchorPosition::Right => Point::new(bounds.x + bounds.width, center.y),
        AnchorPosition::Bottom => Point::new(center.x, bounds.y + bounds.height),
        AnchorPosition::Left => Point::new(bounds.x, center.y),
        AnchorPosition::Center => center,
    }
}

/// Resolve one anchor against the store, falling back to the last-known
/// point when the referenced object is gone.
fn resolve_or_stale(store: &ObjectStore, anchor: ConnectorAnchor, stale: Point) -> Point {
    store
        .get(&anchor.object_id)
        .map_or(stale, |obj| resolve_anchor(anchor.position, obj.bounds))
}

/// Scan every connector and return replacement objects for those whose
/// resolved endpoints changed. Pure: the store is not mutated; the caller
/// writes the replacements back and mirrors them to the wire.
#[must_use]
pub fn recompute_paths(store: &ObjectStore) -> Vec<CanvasObject> {
    let mut updated = Vec::new();

    for obj in store.all() {
        let Payload::Connector(data) = &obj.payload else {
            continue;
        };

        let start = resolve_or_stale(store, data.source, data.start);
        let end = resolve_or_stale(store, data.target, data.end);
        if start == data.start && end == data.end {
            continue;
        }

        let mut next = obj.clone();
        if let Payload::Connector(next_data) = &mut next.payload {
            next_data.start = start;
            next_data.end = end;
        }
        next.bounds = Bounds::from_points([start, end]);
        updated.push(next);
    }

    updated
}
