// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};
use rstest::{fixture, rstest};

use super::testing::HeadlessTui;
use super::{addition_kind, next_pen, scene_key};
use crate::gateway::MemoryGateway;
use crate::model::fixtures::network_small;
use crate::model::{ConnectorId, NodeId, NodeKind, PenStyle, Point};
use crate::scene::{ItemRef, NetworkScene, SceneKey};

#[fixture]
fn tui() -> HeadlessTui<MemoryGateway> {
    let mut scene = NetworkScene::with_gateway(MemoryGateway::new());
    scene.set_diagram(network_small());
    HeadlessTui::new(scene, 120, 40)
}

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn center_cell(tui: &HeadlessTui<MemoryGateway>, node: &str) -> (u16, u16) {
    let center = tui.scene().node_item(&nid(node)).expect("node item").center();
    tui.cell_of(center)
}

fn empty_cell(tui: &HeadlessTui<MemoryGateway>) -> (u16, u16) {
    tui.cell_of(Point::new(500.0, 120.0).expect("point"))
}

#[rstest]
fn first_frame_shows_title_labels_and_key_hints(mut tui: HeadlessTui<MemoryGateway>) {
    let screen = tui.render();
    assert!(screen.contains("Small network"), "{screen}");
    assert!(screen.contains("Character"), "{screen}");
    assert!(screen.contains("plotnet"), "{screen}");
    assert!(screen.contains("undo/redo"), "{screen}");
}

#[rstest]
fn q_quits(mut tui: HeadlessTui<MemoryGateway>) {
    assert!(!tui.should_quit());
    assert!(tui.press(KeyCode::Char('q')));
    assert!(tui.should_quit());
}

#[rstest]
fn addition_key_then_click_places_item(mut tui: HeadlessTui<MemoryGateway>) {
    tui.press(KeyCode::Char('e'));
    assert!(tui.scene().is_addition_mode());
    assert!(tui.render().contains("[ADD event]"));

    let cell = empty_cell(&tui);
    tui.click(cell);

    assert!(!tui.scene().is_addition_mode());
    assert_eq!(tui.scene().document().expect("document").nodes().len(), 4);
    assert_eq!(tui.status(), Some("Added event"));
}

#[rstest]
fn escape_cancels_addition(mut tui: HeadlessTui<MemoryGateway>) {
    tui.press(KeyCode::Char('c'));
    tui.press(KeyCode::Esc);

    assert!(!tui.scene().is_addition_mode());
    assert_eq!(tui.status(), Some("Addition cancelled"));
}

#[rstest]
fn click_selects_and_escape_clears(mut tui: HeadlessTui<MemoryGateway>) {
    let hero = center_cell(&tui, "n:hero");
    tui.click(hero);
    assert_eq!(tui.scene().selected_items(), vec![ItemRef::Node(nid("n:hero"))]);

    tui.press(KeyCode::Esc);
    assert!(tui.scene().selected_items().is_empty());
}

#[rstest]
fn dragging_a_node_moves_it_and_undo_restores(mut tui: HeadlessTui<MemoryGateway>) {
    let (column, row) = center_cell(&tui, "n:hero");
    tui.mouse(MouseEventKind::Down(MouseButton::Left), (column, row));
    tui.mouse(MouseEventKind::Drag(MouseButton::Left), (column + 3, row));
    tui.mouse(MouseEventKind::Drag(MouseButton::Left), (column + 5, row));
    tui.mouse(MouseEventKind::Up(MouseButton::Left), (column + 5, row));

    assert_eq!(tui.status(), Some("Moved 1 item"));
    let moved = tui.scene().document().expect("document").node(&nid("n:hero")).expect("hero").pos();
    assert!(moved.x() > 0.0);
    assert_eq!(moved.y(), 0.0);

    tui.press(KeyCode::Char('u'));
    let restored =
        tui.scene().document().expect("document").node(&nid("n:hero")).expect("hero").pos();
    assert_eq!(restored, Point::ORIGIN);
}

#[rstest]
fn drag_released_off_canvas_still_commits(mut tui: HeadlessTui<MemoryGateway>) {
    let (column, row) = center_cell(&tui, "n:hero");
    tui.mouse(MouseEventKind::Down(MouseButton::Left), (column, row));
    tui.mouse(MouseEventKind::Drag(MouseButton::Left), (column + 4, row));
    tui.mouse(MouseEventKind::Up(MouseButton::Left), (0, 0));

    assert!(!tui.scene().is_dragging());
    assert_eq!(tui.scene().pointer(), None);
    assert_eq!(tui.status(), Some("Moved 1 item"));
    let moved = tui.scene().document().expect("document").node(&nid("n:hero")).expect("hero").pos();
    assert!(moved.x() > 0.0);

    tui.press(KeyCode::Char('u'));
    let restored =
        tui.scene().document().expect("document").node(&nid("n:hero")).expect("hero").pos();
    assert_eq!(restored, Point::ORIGIN);
}

#[rstest]
fn double_click_edits_event_text(mut tui: HeadlessTui<MemoryGateway>) {
    let call = center_cell(&tui, "n:call");
    tui.click(call);
    tui.mouse(MouseEventKind::Down(MouseButton::Left), call);
    tui.mouse(MouseEventKind::Up(MouseButton::Left), call);
    assert_eq!(tui.editor_text(), Some("Call to adventure"));

    for _ in 0.."adventure".len() {
        tui.press(KeyCode::Backspace);
    }
    tui.type_text("action");
    assert!(tui.render().contains("Call to action"));
    tui.press(KeyCode::Enter);

    let document = tui.scene().document().expect("document");
    assert_eq!(document.node(&nid("n:call")).expect("event").text(), "Call to action");
    assert_eq!(tui.editor_text(), None);
    assert_eq!(tui.scene().undo_stack().undo_text(), Some("Edit text"));
}

#[rstest]
fn slow_second_click_is_not_a_double_click(mut tui: HeadlessTui<MemoryGateway>) {
    let call = center_cell(&tui, "n:call");
    tui.click(call);
    tui.wait();
    tui.click(call);
    assert_eq!(tui.editor_text(), None);
}

#[rstest]
fn enter_on_character_reports_no_text(mut tui: HeadlessTui<MemoryGateway>) {
    let hero = center_cell(&tui, "n:hero");
    tui.click(hero);
    tui.press(KeyCode::Enter);

    assert_eq!(tui.editor_text(), None);
    assert_eq!(tui.status(), Some("character items have no text to edit"));
}

#[rstest]
fn escape_in_editor_discards_changes(mut tui: HeadlessTui<MemoryGateway>) {
    let call = center_cell(&tui, "n:call");
    tui.click(call);
    tui.press(KeyCode::Enter);
    tui.type_text("!!!");
    tui.press(KeyCode::Esc);

    let document = tui.scene().document().expect("document");
    assert_eq!(document.node(&nid("n:call")).expect("event").text(), "Call to adventure");
    assert_eq!(tui.status(), Some("Edit cancelled"));
    assert_eq!(tui.scene().selected_items(), vec![ItemRef::Node(nid("n:call"))]);
}

#[rstest]
fn copy_and_paste_at_pointer(mut tui: HeadlessTui<MemoryGateway>) {
    let hero = center_cell(&tui, "n:hero");
    tui.click(hero);
    assert!(tui.press_ctrl('c'));

    let target = empty_cell(&tui);
    tui.mouse(MouseEventKind::Moved, target);
    assert!(tui.press_ctrl('v'));

    let document = tui.scene().document().expect("document");
    assert_eq!(document.nodes().len(), 4);
    assert_eq!(document.nodes()[3].kind(), NodeKind::Character);
    assert_eq!(tui.status(), Some("Added character"));
}

#[rstest]
fn leaving_the_canvas_disables_paste(mut tui: HeadlessTui<MemoryGateway>) {
    let hero = center_cell(&tui, "n:hero");
    tui.click(hero);
    tui.press_ctrl('c');

    tui.mouse(MouseEventKind::Moved, (0, 0));
    assert_eq!(tui.scene().pointer(), None);
    tui.press_ctrl('v');
    assert_eq!(tui.scene().document().expect("document").nodes().len(), 3);
}

#[rstest]
fn delete_removes_selection_with_cascade(mut tui: HeadlessTui<MemoryGateway>) {
    let hero = center_cell(&tui, "n:hero");
    tui.click(hero);
    tui.press(KeyCode::Delete);

    let document = tui.scene().document().expect("document");
    assert_eq!(document.nodes().len(), 2);
    assert!(document.connectors().is_empty());

    tui.press(KeyCode::Char('u'));
    assert_eq!(tui.scene().document().expect("document").connectors().len(), 2);
    tui.press(KeyCode::Char('r'));
    assert!(tui.scene().document().expect("document").connectors().is_empty());
}

#[rstest]
fn p_cycles_pen_of_selected_connector(mut tui: HeadlessTui<MemoryGateway>) {
    let connector_id = ConnectorId::new("e:hero-mentor").expect("connector id");
    tui.press(KeyCode::Char('p'));
    assert_eq!(tui.status(), Some("Select a connector first"));

    tui.scene_mut().set_selected(&ItemRef::Connector(connector_id.clone()), true);
    tui.press(KeyCode::Char('p'));
    let pen = |tui: &HeadlessTui<MemoryGateway>| {
        tui.scene().document().expect("document").connector(&connector_id).expect("connector").pen()
    };
    assert_eq!(pen(&tui), PenStyle::Dash);

    tui.press_ctrl('z');
    assert_eq!(pen(&tui), PenStyle::Solid);
    tui.press_ctrl('y');
    assert_eq!(pen(&tui), PenStyle::Dash);
    tui.render();
}

#[rstest]
#[case(KeyCode::Esc, KeyModifiers::NONE, Some(SceneKey::Escape))]
#[case(KeyCode::Delete, KeyModifiers::NONE, Some(SceneKey::Delete))]
#[case(KeyCode::Backspace, KeyModifiers::NONE, Some(SceneKey::Backspace))]
#[case(KeyCode::Char('c'), KeyModifiers::CONTROL, Some(SceneKey::Copy))]
#[case(KeyCode::Char('v'), KeyModifiers::CONTROL, Some(SceneKey::Paste))]
#[case(KeyCode::Char('z'), KeyModifiers::CONTROL, Some(SceneKey::Undo))]
#[case(KeyCode::Char('u'), KeyModifiers::NONE, Some(SceneKey::Undo))]
#[case(KeyCode::Char('r'), KeyModifiers::NONE, Some(SceneKey::Redo))]
#[case(KeyCode::Char('c'), KeyModifiers::NONE, None)]
fn keys_map_to_scene_keys(
    #[case] code: KeyCode,
    #[case] modifiers: KeyModifiers,
    #[case] expected: Option<SceneKey>,
) {
    assert_eq!(scene_key(&KeyEvent::new(code, modifiers)), expected);
}

#[test]
fn addition_keys_cover_every_item_family() {
    let kinds: Vec<NodeKind> = "ecnimt".chars().filter_map(addition_kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Event,
            NodeKind::Character,
            NodeKind::Note,
            NodeKind::Icon,
            NodeKind::Image,
            NodeKind::Text
        ]
    );
    assert_eq!(addition_kind('x'), None);
}

#[test]
fn pen_cycle_returns_to_solid() {
    let mut pen = PenStyle::Solid;
    for _ in 0..4 {
        pen = next_pen(pen);
    }
    assert_eq!(pen, PenStyle::Solid);
}
