// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::model::{Node, NodeId, NodeKind, Point};

use super::{NodeChange, SceneCommand, UndoStack};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y).expect("point")
}

fn moved(id: &str, to: f64) -> SceneCommand {
    SceneCommand::MoveNode { node_id: nid(id), old: Point::ORIGIN, new: pt(to, to) }
}

fn text_edit(id: &str, old: &str, new: &str) -> SceneCommand {
    SceneCommand::EditNode {
        node_id: nid(id),
        old: NodeChange::Text(old.to_owned()),
        new: NodeChange::Text(new.to_owned()),
    }
}

#[fixture]
fn stack() -> UndoStack {
    UndoStack::new(0)
}

#[rstest]
fn push_then_step_back_and_forward(mut stack: UndoStack) {
    stack.push("Move item", moved("n:a", 10.0));
    stack.push("Move item", moved("n:b", 20.0));
    assert_eq!(stack.count(), 2);
    assert_eq!(stack.undo_text(), Some("Move item"));

    let undone = stack.step_back().expect("undo entry");
    assert_eq!(undone.commands(), &[moved("n:b", 20.0)]);
    assert!(stack.can_redo());
    assert_eq!(stack.index(), 1);

    let redone = stack.step_forward().expect("redo entry");
    assert_eq!(redone, undone);
    assert!(!stack.can_redo());
}

#[rstest]
fn push_discards_redo_tail(mut stack: UndoStack) {
    stack.push("one", moved("n:a", 1.0));
    stack.push("two", moved("n:a", 2.0));
    stack.step_back().expect("undo");

    stack.push("three", moved("n:a", 3.0));
    assert_eq!(stack.count(), 2);
    assert_eq!(stack.undo_text(), Some("three"));
    assert!(stack.redo_text().is_none());
}

#[rstest]
fn nested_macros_collapse_into_one_entry(mut stack: UndoStack) {
    stack.begin_macro("Move items");
    stack.push("Move item", moved("n:a", 1.0));
    stack.begin_macro("inner");
    stack.push("Move item", moved("n:b", 1.0));
    stack.end_macro();
    assert!(stack.is_in_macro());
    assert!(!stack.can_undo());
    stack.end_macro();

    assert_eq!(stack.count(), 1);
    assert_eq!(stack.undo_text(), Some("Move items"));
    assert_eq!(stack.entries()[0].commands().len(), 2);
}

#[rstest]
fn empty_macro_is_dropped(mut stack: UndoStack) {
    stack.begin_macro("nothing");
    stack.end_macro();
    assert_eq!(stack.count(), 0);
    assert!(stack.is_clean());

    // A stray close is ignored.
    stack.end_macro();
    assert!(!stack.is_in_macro());
}

#[rstest]
fn consecutive_text_edits_merge(mut stack: UndoStack) {
    stack.push("Edit text", text_edit("n:a", "", "H"));
    stack.push("Edit text", text_edit("n:a", "H", "He"));
    stack.push("Edit text", text_edit("n:a", "He", "Hey"));
    assert_eq!(stack.count(), 1);
    assert_eq!(stack.entries()[0].commands(), &[text_edit("n:a", "", "Hey")]);

    stack.push("Edit text", text_edit("n:b", "", "x"));
    assert_eq!(stack.count(), 2);
}

#[rstest]
fn edits_of_different_kinds_do_not_merge(mut stack: UndoStack) {
    stack.push("Edit text", text_edit("n:a", "", "H"));
    stack.push(
        "Resize item",
        SceneCommand::EditNode {
            node_id: nid("n:a"),
            old: NodeChange::Size(12),
            new: NodeChange::Size(14),
        },
    );
    assert_eq!(stack.count(), 2);
}

#[rstest]
fn clean_index_blocks_merging(mut stack: UndoStack) {
    stack.push("Edit text", text_edit("n:a", "", "H"));
    stack.set_clean();
    assert!(stack.is_clean());

    stack.push("Edit text", text_edit("n:a", "H", "He"));
    assert_eq!(stack.count(), 2);
    assert!(!stack.is_clean());

    stack.step_back().expect("undo");
    assert!(stack.is_clean());
}

#[rstest]
fn discarding_the_clean_state_forgets_it(mut stack: UndoStack) {
    stack.push("one", moved("n:a", 1.0));
    stack.push("two", moved("n:a", 2.0));
    stack.set_clean();
    stack.step_back().expect("undo");
    stack.push("three", moved("n:a", 3.0));
    assert!(!stack.is_clean());
    stack.step_back().expect("undo");
    assert!(!stack.is_clean());
}

#[rstest]
#[case(3, 3)]
#[case(1, 1)]
#[case(0, 5)]
fn undo_limit_drops_oldest_entries(#[case] limit: usize, #[case] expected: usize) {
    let mut stack = UndoStack::new(limit);
    for step in 0..5 {
        stack.push(format!("step {step}"), moved("n:a", step as f64));
    }
    assert_eq!(stack.count(), expected);
    assert_eq!(stack.undo_text(), Some("step 4"));
    assert_eq!(stack.index(), expected);
}

#[rstest]
fn lowering_the_limit_trims_existing_entries(mut stack: UndoStack) {
    for step in 0..4 {
        stack.push(format!("step {step}"), moved("n:a", step as f64));
    }
    stack.set_undo_limit(2);
    assert_eq!(stack.count(), 2);
    assert_eq!(stack.entries()[0].text(), "step 2");
}

#[rstest]
fn clear_resets_everything(mut stack: UndoStack) {
    stack.push("one", moved("n:a", 1.0));
    stack.begin_macro("open");
    stack.clear();
    assert_eq!(stack.count(), 0);
    assert!(!stack.is_in_macro());
    assert!(stack.is_clean());
    assert!(stack.step_back().is_none());
}

#[test]
fn inverse_swaps_insert_and_remove() {
    let node = Node::with_id(nid("n:a"), NodeKind::Event, Point::ORIGIN);
    let insert = SceneCommand::InsertNode { index: 2, node: node.clone(), connectors: Vec::new() };
    let remove = insert.inverse();
    assert_eq!(
        remove,
        SceneCommand::RemoveNode { index: 2, node, connectors: Vec::new() }
    );
    assert_eq!(remove.inverse(), insert);

    let edit = text_edit("n:a", "old", "new");
    assert_eq!(edit.inverse(), text_edit("n:a", "new", "old"));
}

#[test]
fn node_change_captures_and_applies() {
    let mut node = Node::new(NodeKind::Note, Point::ORIGIN);
    let change = NodeChange::Note { text: "remember".to_owned(), height: 140 };
    let before = change.capture(&node);
    change.apply(&mut node);
    assert_eq!(node.text(), "remember");
    assert_eq!(node.height(), 140);

    before.apply(&mut node);
    assert_eq!(node.text(), "");
    assert_eq!(node.height(), 100);
}
