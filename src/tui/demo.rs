// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::gateway::MemoryGateway;
use crate::model::{
    CharacterId, Connector, DiagramDocument, DiagramId, DiagramKind, Node, NodeKind, Point,
};

/// An in-memory character network to try the editor without a diagram folder.
pub fn demo_gateway() -> (MemoryGateway, DiagramDocument) {
    let mut gateway = MemoryGateway::new();
    let mut document =
        DiagramDocument::new(DiagramId::generate(), "Demo network", DiagramKind::CharacterNetwork);

    let mut characters = Vec::new();
    for (name, x, y) in [("Ada", 0.0, 0.0), ("Brom", 360.0, 0.0), ("Cyra", 180.0, 320.0)] {
        let character_id = CharacterId::generate();
        gateway = gateway.with_character(character_id.clone(), name);
        let mut node = Node::new(NodeKind::Character, Point::finite_or_origin(x, y));
        node.set_character_id(Some(character_id));
        characters.push(node);
    }

    let mut inciting = Node::new(NodeKind::Event, Point::finite_or_origin(480.0, 220.0));
    inciting.set_text("The letter arrives");
    let mut note = Node::new(NodeKind::Note, Point::finite_or_origin(-60.0, 440.0));
    note.set_text("Double-click an event to edit it");

    let connectors = [
        Connector::new(characters[0].id().clone(), characters[1].id().clone(), 90.0, 90.0),
        Connector::new(characters[0].id().clone(), characters[2].id().clone(), -90.0, 135.0),
        Connector::new(characters[1].id().clone(), inciting.id().clone(), -45.0, 90.0),
    ];

    document.nodes_mut().extend(characters);
    document.nodes_mut().extend([inciting, note]);
    document.connectors_mut().extend(connectors);
    document.set_loaded(true);
    (gateway, document)
}

#[cfg(test)]
mod tests {
    use super::demo_gateway;
    use crate::gateway::DiagramGateway;
    use crate::scene::NetworkScene;

    #[test]
    fn demo_wires_every_connector_and_names_characters() {
        let (gateway, document) = demo_gateway();
        let mut scene = NetworkScene::with_gateway(gateway);
        scene.set_diagram(document);

        assert_eq!(scene.node_items().count(), 5);
        assert_eq!(scene.connector_items().count(), 3);
        let labels: Vec<&str> = scene.node_items().map(|item| item.label()).collect();
        assert!(labels.contains(&"Ada"));
        assert!(labels.contains(&"Cyra"));
        let document = scene.document().expect("document");
        let first = document.nodes()[0].character_id().expect("character");
        assert_eq!(scene.gateway().character(first).map(|c| c.name), Some("Ada".to_owned()));
    }
}
