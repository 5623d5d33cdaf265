// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use proptest::prelude::*;

use plotnet::model::{cp_controlled, DiagramDocument, DiagramId, DiagramKind, NodeKind, Point};
use plotnet::scene::{ItemRef, NetworkScene, PointerEvent, SocketRef};
use plotnet::store::{DiagramFolder, FolderGateway};

fn point(x: f64, y: f64) -> Point {
    Point::new(x, y).expect("finite point")
}

fn open(folder: &DiagramFolder, id: &str) -> NetworkScene<FolderGateway> {
    let mut scene = NetworkScene::with_gateway(FolderGateway::new(folder.clone()));
    scene.set_diagram(DiagramDocument::new(
        DiagramId::new(id).expect("diagram id"),
        id,
        DiagramKind::CharacterNetwork,
    ));
    scene
}

#[test]
fn edits_persist_through_the_folder_and_reopen_identically() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let folder = DiagramFolder::new(tmp.path());

    let mut scene = open(&folder, "act-1");
    let hero = scene
        .add_new_item(point(0.0, 0.0), NodeKind::Character, "")
        .expect("add character")
        .expect("character placed");
    let letter = scene
        .add_new_item(point(400.0, 0.0), NodeKind::Event, "")
        .expect("add event")
        .expect("event placed");
    scene.set_node_text(&letter, "The letter arrives").expect("edit text");

    scene.start_link(SocketRef::new(hero.clone(), 90.0)).expect("start link");
    let connector_id = scene.link(SocketRef::new(letter.clone(), 90.0)).expect("link");
    assert!(scene.gateway().last_error().is_none());

    let reopened = open(&folder, "act-1");
    let document = reopened.document().expect("document");
    assert_eq!(document.nodes().len(), 2);
    assert_eq!(document.node(&letter).expect("event").text(), "The letter arrives");
    let connector = document.connector(&connector_id).expect("connector");
    assert!(connector.cp_controlled());
    assert_eq!(reopened.node_item(&hero).expect("hero item").connectors().count(), 1);
    assert!(reopened.connector_item(&connector_id).is_some());
    assert!(!reopened.undo_stack().can_undo());
}

#[test]
fn cascade_removal_persists_and_undo_restores_connectors() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let folder = DiagramFolder::new(tmp.path());

    let mut scene = open(&folder, "act-2");
    let ids: Vec<_> = [0.0, 300.0, 600.0]
        .into_iter()
        .map(|x| {
            scene
                .add_new_item(point(x, 0.0), NodeKind::Event, "")
                .expect("add event")
                .expect("event placed")
        })
        .collect();
    for pair in ids.windows(2) {
        scene.start_link(SocketRef::new(pair[0].clone(), 0.0)).expect("start link");
        scene.link(SocketRef::new(pair[1].clone(), 180.0)).expect("link");
    }

    assert!(scene.remove_item(&ItemRef::Node(ids[1].clone())));
    let stored = folder.load_document(&DiagramId::new("act-2").expect("id")).expect("load");
    let stored = stored.expect("stored document");
    assert_eq!(stored.nodes().len(), 2);
    assert!(stored.connectors().is_empty());

    assert!(scene.undo());
    let document = scene.document().expect("document");
    assert_eq!(document.connectors().len(), 2);
    assert!(document.dangling_connectors().is_empty());
    assert_eq!(scene.connector_items().count(), 2);
}

#[test]
fn copy_paste_lands_at_the_pointer_and_keeps_the_look() {
    let mut scene = NetworkScene::new();
    let mut document =
        DiagramDocument::new(DiagramId::new("paste").expect("id"), "Paste", DiagramKind::Mindmap);
    document.set_loaded(true);
    scene.set_diagram(document);

    let note = scene
        .add_new_item(point(0.0, 0.0), NodeKind::Note, "")
        .expect("add note")
        .expect("note placed");
    scene.set_node_color(&note, "#aa3366").expect("color");
    scene.set_selected(&ItemRef::Node(note.clone()), true);
    assert!(scene.copy());

    scene.mouse_move(PointerEvent::left(point(500.0, 250.0)));
    let pasted = scene.paste().expect("paste").expect("pasted node");
    let document = scene.document().expect("document");
    let node = document.node(&pasted).expect("pasted");
    assert_eq!(node.kind(), NodeKind::Note);
    assert_eq!(node.color(), "#aa3366");
    assert_ne!(pasted, note);
}

proptest! {
    #[test]
    fn linked_connectors_follow_the_arc_rule(
        source in prop::sample::select(vec![0.0, 45.0, 90.0, 135.0, 180.0, -135.0, -90.0, -45.0]),
        target in prop::sample::select(vec![0.0, 45.0, 90.0, 135.0, 180.0, -135.0, -90.0, -45.0]),
    ) {
        let mut scene = NetworkScene::new();
        let mut document =
            DiagramDocument::new(DiagramId::new("arcs").expect("id"), "Arcs", DiagramKind::Mindmap);
        document.set_loaded(true);
        scene.set_diagram(document);
        let a = scene.add_new_item(point(0.0, 0.0), NodeKind::Event, "").expect("add").expect("placed");
        let b = scene.add_new_item(point(400.0, 0.0), NodeKind::Event, "").expect("add").expect("placed");

        scene.start_link(SocketRef::new(a, source)).expect("start link");
        let connector_id = scene.link(SocketRef::new(b, target)).expect("link");

        let connector = scene.document().expect("document").connector(&connector_id).expect("connector").clone();
        prop_assert_eq!(connector.cp_controlled(), cp_controlled(source, target));
        let item = scene.connector_item(&connector_id).expect("item");
        prop_assert_eq!(item.cp_controlled(), connector.cp_controlled());
        if connector.cp_controlled() {
            prop_assert!(!item.route().is_linear());
        }
    }
}
