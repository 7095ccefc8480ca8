#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::geom::Bounds;
use crate::object::{AnchorPosition, ConnectorAnchor, ConnectorData, Payload, StickyData, StrokeData};
use crate::region::{Permission, RegionBounds, Role, Subject};

fn session() -> Session {
    Session::new(Uuid::new_v4())
}

fn sticky_at(x: f64, y: f64) -> CanvasObject {
    CanvasObject::new(
        Bounds::new(x, y, 100.0, 80.0),
        Payload::Sticky(StickyData { text: "note".into(), color: "#FFEB3B".into() }),
    )
}

fn stroke(points: Vec<Point>) -> CanvasObject {
    CanvasObject::new(
        Bounds::from_points(points.iter().copied()),
        Payload::Stroke(StrokeData { points, color: "#1F1A17".into(), width: 2.0 }),
    )
}

fn region(perms: Vec<Permission>, bounds: RegionBounds) -> WorkspaceRegion {
    WorkspaceRegion {
        id: Uuid::new_v4(),
        name: "zone".into(),
        color: "#4B9FD9".into(),
        bounds,
        permissions: perms,
        is_locked: false,
        obscure_no_access: false,
    }
}

// =============================================================
// Local edits
// =============================================================

#[test]
fn create_stores_records_and_mirrors() {
    let mut s = session();
    let obj = sticky_at(0.0, 0.0);

    let actions = s.create_object(obj.clone()).unwrap();
    assert_eq!(actions, vec![Action::ObjectCreated(obj.clone())]);
    assert_eq!(s.store.get(&obj.id), Some(&obj));
    assert!(s.can_undo());
}

#[test]
fn update_replaces_value_and_keeps_both_sides() {
    let mut s = session();
    let obj = sticky_at(0.0, 0.0);
    let id = obj.id;
    s.create_object(obj).unwrap();

    let changes = PartialObject::moved_to(500.0, 500.0);
    let actions = s.update_object(id, &changes).unwrap();
    assert_eq!(actions, vec![Action::ObjectUpdated { id, changes }]);
    assert_eq!(s.store.get(&id).unwrap().bounds.x, 500.0);

    // Undo restores the previous full value.
    s.undo();
    assert_eq!(s.store.get(&id).unwrap().bounds.x, 0.0);
}

#[test]
fn update_unknown_object_is_an_error() {
    let mut s = session();
    let err = s
        .update_object(Uuid::new_v4(), &PartialObject::moved_to(1.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, SessionError::ObjectNotFound(_)));
}

#[test]
fn delete_then_undo_restores_exact_value() {
    let mut s = session();
    let obj = sticky_at(10.0, 10.0);
    let id = obj.id;
    s.create_object(obj.clone()).unwrap();

    let actions = s.delete_object(id).unwrap();
    assert_eq!(actions, vec![Action::ObjectDeleted { id }]);
    assert!(s.store.get(&id).is_none());

    let undo_actions = s.undo();
    assert_eq!(undo_actions, vec![Action::ObjectCreated(obj.clone())]);
    assert_eq!(s.store.get(&id), Some(&obj));
}

// =============================================================
// Undo / redo scenarios
// =============================================================

#[test]
fn undo_redo_add_add_scenario() {
    // push(add A), push(add B), undo -> only A; redo -> A and B again.
    let mut s = session();
    let a = sticky_at(0.0, 0.0);
    let b = sticky_at(200.0, 0.0);
    s.create_object(a.clone()).unwrap();
    s.create_object(b.clone()).unwrap();

    s.undo();
    assert_eq!(s.store.len(), 1);
    assert!(s.store.get(&a.id).is_some());
    assert!(s.store.get(&b.id).is_none());

    s.redo();
    assert_eq!(s.store.len(), 2);
    assert!(s.store.get(&b.id).is_some());
}

#[test]
fn undo_beyond_history_is_a_silent_noop() {
    let mut s = session();
    assert!(s.undo().is_empty());
    assert!(s.redo().is_empty());
    assert!(!s.can_undo());
    assert!(!s.can_redo());
}

#[test]
fn round_trip_law_over_mixed_sequence() {
    let mut s = session();
    let seed = sticky_at(0.0, 0.0);
    s.create_object(seed.clone()).unwrap();
    let before = s.store.snapshot();
    let history_len_before = s.history.len();

    let extra = sticky_at(300.0, 0.0);
    s.create_object(extra.clone()).unwrap();
    s.update_object(seed.id, &PartialObject::moved_to(50.0, 50.0)).unwrap();
    s.delete_object(extra.id).unwrap();

    let applied = s.history.len() - history_len_before;
    for _ in 0..applied {
        s.undo();
    }
    assert_eq!(s.store.snapshot(), before);
}

// =============================================================
// Eraser integration
// =============================================================

#[test]
fn erase_records_single_multi_and_undo_restores() {
    let mut s = session();
    let original = stroke(vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(20.0, 0.0),
    ]);
    s.create_object(original.clone()).unwrap();
    let before = s.store.snapshot();
    let history_before = s.history.len();

    let actions = s.erase_at(Point::new(10.0, 0.0), 2.0).unwrap();
    // One delete plus one fragment create.
    assert_eq!(actions.len(), 2);
    assert!(matches!(actions[0], Action::ObjectDeleted { id } if id == original.id));
    assert!(matches!(actions[1], Action::ObjectCreated(_)));
    assert_eq!(s.history.len(), history_before + 1);

    // A single undo restores the pre-erase state exactly.
    s.undo();
    assert_eq!(s.store.snapshot(), before);
}

#[test]
fn erase_touching_nothing_records_nothing() {
    let mut s = session();
    s.create_object(stroke(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])).unwrap();
    let history_before = s.history.len();

    let actions = s.erase_at(Point::new(1000.0, 1000.0), 2.0).unwrap();
    assert!(actions.is_empty());
    assert_eq!(s.history.len(), history_before);
}

// =============================================================
// Connector tracking
// =============================================================

#[test]
fn moving_endpoint_emits_connector_update() {
    let mut s = session();
    let a = sticky_at(0.0, 0.0);
    let b = sticky_at(300.0, 0.0);
    s.create_object(a.clone()).unwrap();
    s.create_object(b.clone()).unwrap();

    let conn = CanvasObject::new(
        Bounds::new(0.0, 0.0, 0.0, 0.0),
        Payload::Connector(ConnectorData {
            source: ConnectorAnchor { object_id: a.id, position: AnchorPosition::Right },
            target: ConnectorAnchor { object_id: b.id, position: AnchorPosition::Left },
            start: Point::new(0.0, 0.0),
            end: Point::new(0.0, 0.0),
            color: "#1F1A17".into(),
            width: 1.0,
        }),
    );
    let create_actions = s.create_object(conn.clone()).unwrap();
    // Creation itself resolves the dangling initial points.
    assert!(create_actions.len() >= 2);

    let actions = s.update_object(a.id, &PartialObject::moved_to(-100.0, 0.0)).unwrap();
    let connector_updates: Vec<&Action> = actions
        .iter()
        .filter(|act| matches!(act, Action::ObjectUpdated { id, .. } if *id == conn.id))
        .collect();
    assert_eq!(connector_updates.len(), 1);

    let Payload::Connector(data) = &s.store.get(&conn.id).unwrap().payload else {
        panic!("expected connector payload");
    };
    assert_eq!(data.start, Point::new(0.0, 40.0));
}

// =============================================================
// Permissions
// =============================================================

#[test]
fn edit_denied_inside_foreign_region() {
    let mut s = session();
    s.create_region(region(
        vec![Permission { subject: Subject::User(Uuid::new_v4()), role: Role::Editor }],
        RegionBounds::new(0.0, 0.0, 1000.0, 1000.0),
    ));

    let err = s.create_object(sticky_at(100.0, 100.0)).unwrap_err();
    assert!(matches!(err, SessionError::EditDenied { .. }));
    assert!(s.store.is_empty());
    assert!(!s.can_undo());
}

#[test]
fn edit_allowed_outside_all_regions() {
    let mut s = session();
    s.create_region(region(
        vec![Permission { subject: Subject::User(Uuid::new_v4()), role: Role::Editor }],
        RegionBounds::new(0.0, 0.0, 10.0, 10.0),
    ));
    assert!(s.create_object(sticky_at(5000.0, 5000.0)).is_ok());
}

#[test]
fn union_semantics_through_session() {
    let mut s = session();
    let me = s.user_id;
    s.create_region(region(
        vec![Permission { subject: Subject::User(me), role: Role::Editor }],
        RegionBounds::new(0.0, 0.0, 1000.0, 1000.0),
    ));
    s.create_region(region(
        vec![Permission { subject: Subject::User(me), role: Role::Viewer }],
        RegionBounds::new(0.0, 0.0, 1000.0, 1000.0),
    ));
    assert!(s.can_edit_at(500.0, 500.0));
    assert!(s.create_object(sticky_at(100.0, 100.0)).is_ok());
}

#[test]
fn moving_into_denied_region_is_refused() {
    let mut s = session();
    let obj = sticky_at(2000.0, 2000.0);
    let id = obj.id;
    s.create_object(obj).unwrap();

    s.create_region(region(
        vec![Permission { subject: Subject::User(Uuid::new_v4()), role: Role::Editor }],
        RegionBounds::new(0.0, 0.0, 1000.0, 1000.0),
    ));

    let err = s.update_object(id, &PartialObject::moved_to(100.0, 100.0)).unwrap_err();
    assert!(matches!(err, SessionError::EditDenied { .. }));
    assert_eq!(s.store.get(&id).unwrap().bounds.x, 2000.0);
}

// =============================================================
// Region CRUD
// =============================================================

#[test]
fn locked_region_refuses_move() {
    let mut s = session();
    let mut locked = region(vec![], RegionBounds::new(0.0, 0.0, 100.0, 100.0));
    locked.is_locked = true;
    s.create_region(locked.clone());

    let mut moved = locked.clone();
    moved.bounds = RegionBounds::new(50.0, 50.0, 150.0, 150.0);
    let err = s.update_region(moved).unwrap_err();
    assert!(matches!(err, SessionError::RegionLocked(_)));

    // Non-geometry changes still go through.
    let mut renamed = locked;
    renamed.name = "renamed".into();
    assert!(s.update_region(renamed).is_ok());
}

#[test]
fn delete_region_requires_existence() {
    let mut s = session();
    let err = s.delete_region(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, SessionError::RegionNotFound(_)));
}

// =============================================================
// Remote merges
// =============================================================

#[test]
fn remote_edits_bypass_history() {
    let mut s = session();
    let obj = sticky_at(0.0, 0.0);
    s.apply_created(obj.clone());
    s.apply_updated(&obj.id, &PartialObject::moved_to(50.0, 50.0));
    assert_eq!(s.store.get(&obj.id).unwrap().bounds.x, 50.0);
    assert!(!s.can_undo());

    s.apply_deleted(&obj.id);
    assert!(s.store.is_empty());
    assert!(!s.can_undo());
}

#[test]
fn remote_update_of_unknown_object_is_tolerated() {
    let mut s = session();
    s.apply_updated(&Uuid::new_v4(), &PartialObject::moved_to(1.0, 1.0));
    assert!(s.store.is_empty());
}

#[test]
fn merge_sync_is_add_if_absent() {
    // Client joins with 3 local objects; the server syncs 2 different ones:
    // the merged store has 5, and no local object is overwritten.
    let mut s = session();
    let locals = [sticky_at(0.0, 0.0), sticky_at(100.0, 0.0), sticky_at(200.0, 0.0)];
    for obj in &locals {
        s.create_object(obj.clone()).unwrap();
    }

    let remote = vec![sticky_at(300.0, 0.0), sticky_at(400.0, 0.0)];
    let added = s.merge_sync(remote);
    assert_eq!(added, 2);
    assert_eq!(s.store.len(), 5);
    for obj in &locals {
        assert_eq!(s.store.get(&obj.id), Some(obj));
    }
}

#[test]
fn remote_region_lifecycle() {
    let mut s = session();
    let r = region(vec![], RegionBounds::new(0.0, 0.0, 10.0, 10.0));
    s.apply_region_saved(r.clone());
    assert_eq!(s.regions.get(&r.id), Some(&r));

    s.replace_regions(vec![]);
    assert!(s.regions.is_empty());

    s.apply_region_saved(r.clone());
    s.apply_region_deleted(&r.id);
    assert!(s.regions.is_empty());
}

// =============================================================
// Publish
// =============================================================

#[test]
fn publish_set_reflects_store() {
    let mut s = session();
    assert!(s.publish_set().is_empty());
    s.create_object(sticky_at(0.0, 0.0)).unwrap();
    assert_eq!(s.publish_set().len(), 1);
}
