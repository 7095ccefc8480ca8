use board::geom::Bounds;
use board::object::{CanvasObject, PartialObject, Payload, StickyData};
use board::region::{Permission, RegionBounds, Role, Subject, WorkspaceRegion};
use uuid::Uuid;
use wire::event;

use super::*;

fn client() -> SyncClient {
    SyncClient::new(SyncConfig {
        url: "ws://127.0.0.1:3000/ws".to_owned(),
        board_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
    })
}

fn sticky_at(x: f64, y: f64) -> CanvasObject {
    CanvasObject::new(
        Bounds::new(x, y, 100.0, 80.0),
        Payload::Sticky(StickyData { text: "note".into(), color: "#FFEB3B".into() }),
    )
}

// =============================================================
// Optimistic apply
// =============================================================

#[test]
fn create_applies_locally_then_mirrors() {
    let mut c = client();
    let obj = sticky_at(0.0, 0.0);
    let id = obj.id;

    let frames = c.apply_local(LocalEdit::CreateObject(obj));
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].syscall, event::OBJECT_CREATE);
    assert_eq!(frames[0].from, Some(c.session.user_id));
    assert!(c.session.store.get(&id).is_some());
}

#[test]
fn update_and_delete_mirror_in_issue_order() {
    let mut c = client();
    let obj = sticky_at(0.0, 0.0);
    let id = obj.id;
    c.apply_local(LocalEdit::CreateObject(obj));

    let frames = c.apply_local(LocalEdit::UpdateObject {
        id,
        changes: PartialObject::moved_to(50.0, 50.0),
    });
    assert_eq!(frames[0].syscall, event::OBJECT_UPDATE);

    let frames = c.apply_local(LocalEdit::DeleteObject { id });
    assert_eq!(frames[0].syscall, event::OBJECT_DELETE);
    assert!(c.session.store.is_empty());
}

#[test]
fn refused_edit_sends_nothing_and_mutates_nothing() {
    let mut c = client();
    c.session.create_region(WorkspaceRegion {
        id: Uuid::new_v4(),
        name: "zone".into(),
        color: "#4B9FD9".into(),
        bounds: RegionBounds::new(-1e6, -1e6, 1e6, 1e6),
        permissions: vec![Permission { subject: Subject::User(Uuid::new_v4()), role: Role::Editor }],
        is_locked: false,
        obscure_no_access: false,
    });

    let frames = c.apply_local(LocalEdit::CreateObject(sticky_at(0.0, 0.0)));
    assert!(frames.is_empty());
    assert!(c.session.store.is_empty());
}

#[test]
fn erase_mirrors_delete_and_fragment_create() {
    use board::geom::Point;
    use board::object::StrokeData;

    let mut c = client();
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(20.0, 0.0),
    ];
    let stroke = CanvasObject::new(
        Bounds::from_points(points.iter().copied()),
        Payload::Stroke(StrokeData { points, color: "#1F1A17".into(), width: 2.0 }),
    );
    c.apply_local(LocalEdit::CreateObject(stroke));

    let frames = c.apply_local(LocalEdit::EraseAt { x: 10.0, y: 0.0, radius: 2.0 });
    let syscalls: Vec<&str> = frames.iter().map(|f| f.syscall.as_str()).collect();
    assert_eq!(syscalls, vec![event::OBJECT_DELETE, event::OBJECT_CREATE]);
}

// =============================================================
// Undo / redo mirroring
// =============================================================

#[test]
fn undo_mirrors_inverse_traffic() {
    let mut c = client();
    let obj = sticky_at(0.0, 0.0);
    let id = obj.id;
    c.apply_local(LocalEdit::CreateObject(obj));

    let frames = c.apply_local(LocalEdit::Undo);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].syscall, event::OBJECT_DELETE);
    assert!(c.session.store.is_empty());

    let frames = c.apply_local(LocalEdit::Redo);
    assert_eq!(frames[0].syscall, event::OBJECT_CREATE);
    assert!(c.session.store.get(&id).is_some());
}

#[test]
fn undo_with_empty_history_sends_nothing() {
    let mut c = client();
    assert!(c.apply_local(LocalEdit::Undo).is_empty());
    assert!(c.apply_local(LocalEdit::Redo).is_empty());
}

// =============================================================
// Cursor and publish
// =============================================================

#[test]
fn cursor_move_mirrors_without_touching_the_store() {
    let mut c = client();
    let frames = c.apply_local(LocalEdit::MoveCursor { x: 10.0, y: 20.0 });
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].syscall, event::CURSOR_MOVE);
    assert!(c.session.store.is_empty());
    assert!(!c.session.can_undo());
}

#[test]
fn publish_frame_is_none_for_an_empty_store() {
    let c = client();
    assert!(c.publish_frame().is_none());
}

#[test]
fn publish_frame_carries_the_full_store() {
    let mut c = client();
    c.apply_local(LocalEdit::CreateObject(sticky_at(0.0, 0.0)));
    c.apply_local(LocalEdit::CreateObject(sticky_at(200.0, 0.0)));

    let frame = c.publish_frame().expect("non-empty store publishes");
    assert_eq!(frame.syscall, event::BOARD_PUBLISH);
    let wire::Event::Publish { objects } = wire::Event::from_frame(&frame).unwrap() else {
        panic!("expected publish event");
    };
    assert_eq!(objects.len(), 2);
}

// =============================================================
// Handle: submit-time apply and shared reads
// =============================================================

fn unreachable_config() -> SyncConfig {
    // Nothing listens on the discard port; connect attempts fail at once.
    SyncConfig {
        url: "ws://127.0.0.1:9/ws".to_owned(),
        board_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn submit_applies_locally_while_disconnected() {
    let (handle, task) = spawn(unreachable_config());
    let obj = sticky_at(0.0, 0.0);
    let id = obj.id;

    assert!(handle.submit(LocalEdit::CreateObject(obj.clone())));

    // The edit is live in the shared session before any socket ever opens,
    // and the handle can read it back.
    let stored = handle.read(|c| c.session.store.get(&id).cloned());
    assert_eq!(stored, Some(obj));
    assert!(handle.read(|c| c.session.can_undo()));
    assert_ne!(handle.read(|c| c.status), ConnectionStatus::Open);

    task.abort();
}

#[tokio::test]
async fn submit_fails_once_the_connection_task_exits() {
    let (handle, task) = spawn(unreachable_config());
    task.abort();
    let _ = task.await;
    assert!(!handle.submit(LocalEdit::MoveCursor { x: 0.0, y: 0.0 }));
}
