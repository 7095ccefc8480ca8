use uuid::Uuid;

use super::*;
use crate::geom::Bounds;
use crate::object::{Payload, StickyData};

fn sticky(text: &str) -> CanvasObject {
    CanvasObject::new(
        Bounds::new(0.0, 0.0, 100.0, 80.0),
        Payload::Sticky(StickyData { text: text.into(), color: "#FFEB3B".into() }),
    )
}

fn add_entry(obj: &CanvasObject) -> HistoryEntry {
    HistoryEntry::new(HistoryAction::Add { object: obj.clone() }, Uuid::new_v4())
}

// =============================================================
// Stack mechanics
// =============================================================

#[test]
fn empty_stack_has_nothing_to_step() {
    let mut stack = HistoryStack::new(10);
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
    assert!(stack.undo().is_none());
    assert!(stack.redo().is_none());
}

#[test]
fn push_enables_undo_only() {
    let mut stack = HistoryStack::new(10);
    stack.push(add_entry(&sticky("a")));
    assert!(stack.can_undo());
    assert!(!stack.can_redo());
}

#[test]
fn undo_then_redo_walks_the_cursor() {
    let mut stack = HistoryStack::new(10);
    let a = sticky("a");
    let b = sticky("b");
    stack.push(add_entry(&a));
    stack.push(add_entry(&b));

    let undone = stack.undo().unwrap();
    assert_eq!(undone, HistoryAction::Add { object: b.clone() });
    assert!(stack.can_redo());

    let redone = stack.redo().unwrap();
    assert_eq!(redone, HistoryAction::Add { object: b });
    assert!(!stack.can_redo());
}

#[test]
fn push_after_undo_discards_redo_branch() {
    let mut stack = HistoryStack::new(10);
    stack.push(add_entry(&sticky("a")));
    stack.push(add_entry(&sticky("b")));
    stack.undo();

    let c = sticky("c");
    stack.push(add_entry(&c));

    assert!(!stack.can_redo());
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.undo().unwrap(), HistoryAction::Add { object: c });
}

#[test]
fn capacity_evicts_oldest_and_clamps_cursor() {
    let mut stack = HistoryStack::new(2);
    let a = sticky("a");
    let b = sticky("b");
    let c = sticky("c");
    stack.push(add_entry(&a));
    stack.push(add_entry(&b));
    stack.push(add_entry(&c));

    assert_eq!(stack.len(), 2);
    // Only c and b are reachable; a's entry is gone for good.
    assert_eq!(stack.undo().unwrap(), HistoryAction::Add { object: c });
    assert_eq!(stack.undo().unwrap(), HistoryAction::Add { object: b });
    assert!(stack.undo().is_none());
}

#[test]
fn clear_drops_everything() {
    let mut stack = HistoryStack::new(10);
    stack.push(add_entry(&sticky("a")));
    stack.clear();
    assert!(stack.is_empty());
    assert!(!stack.can_undo());
}

// =============================================================
// Inverse / forward application
// =============================================================

#[test]
fn inverse_of_add_deletes() {
    let mut store = ObjectStore::new();
    let obj = sticky("a");
    store.put(obj.clone());

    apply_inverse(&HistoryAction::Add { object: obj.clone() }, &mut store);
    assert!(store.is_empty());

    apply_forward(&HistoryAction::Add { object: obj.clone() }, &mut store);
    assert_eq!(store.get(&obj.id), Some(&obj));
}

#[test]
fn inverse_of_update_restores_previous_value() {
    let mut store = ObjectStore::new();
    let before = sticky("before");
    let after = CanvasObject {
        payload: Payload::Sticky(StickyData { text: "after".into(), color: "#FFEB3B".into() }),
        ..before.clone()
    };
    store.put(after.clone());

    let action = HistoryAction::Update { before: before.clone(), after: after.clone() };
    apply_inverse(&action, &mut store);
    assert_eq!(store.get(&before.id), Some(&before));

    apply_forward(&action, &mut store);
    assert_eq!(store.get(&before.id), Some(&after));
}

#[test]
fn inverse_of_multi_restores_pre_erase_state() {
    let mut store = ObjectStore::new();
    let original = sticky("original");
    let frag_a = sticky("frag a");
    let frag_b = sticky("frag b");
    store.put(frag_a.clone());
    store.put(frag_b.clone());

    let action = HistoryAction::Multi {
        deleted: vec![original.clone()],
        created: vec![frag_a.clone(), frag_b.clone()],
    };
    apply_inverse(&action, &mut store);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&original.id), Some(&original));

    apply_forward(&action, &mut store);
    assert_eq!(store.len(), 2);
    assert!(store.get(&original.id).is_none());
    assert_eq!(store.get(&frag_a.id), Some(&frag_a));
}

// =============================================================
// Round-trip law
// =============================================================

#[test]
fn action_sequence_then_equal_undos_restores_store() {
    let mut store = ObjectStore::new();
    let mut stack = HistoryStack::new(50);
    let actor = Uuid::new_v4();

    let seed = sticky("seed");
    store.put(seed.clone());
    let before: Vec<CanvasObject> = store.snapshot();

    // Apply a mixed sequence, recording each action.
    let added = sticky("added");
    store.put(added.clone());
    stack.push(HistoryEntry::new(HistoryAction::Add { object: added.clone() }, actor));

    let seed_after = CanvasObject {
        payload: Payload::Sticky(StickyData { text: "edited".into(), color: "#FFEB3B".into() }),
        ..seed.clone()
    };
    store.put(seed_after.clone());
    stack.push(HistoryEntry::new(HistoryAction::Update { before: seed.clone(), after: seed_after }, actor));

    store.delete(&added.id);
    stack.push(HistoryEntry::new(HistoryAction::Delete { object: added }, actor));

    // Equal number of undos walks back to the exact pre-sequence content.
    for _ in 0..3 {
        let action = stack.undo().unwrap();
        apply_inverse(&action, &mut store);
    }
    assert_eq!(store.snapshot(), before);
}
