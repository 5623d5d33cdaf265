// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::connector::Connector;
use super::document::{DiagramDocument, DiagramKind};
use super::geometry::Point;
use super::ids::{CharacterId, ConnectorId, DiagramId, NodeId};
use super::node::{Node, NodeKind};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn cid(value: &str) -> ConnectorId {
    ConnectorId::new(value).expect("connector id")
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y).expect("point")
}

/// Two characters and an event, linked hero -> mentor (top arc) and hero -> event.
pub(crate) fn network_small() -> DiagramDocument {
    let mut doc = DiagramDocument::new(
        DiagramId::new("d:small").expect("diagram id"),
        "Small network",
        DiagramKind::CharacterNetwork,
    );
    doc.set_loaded(true);

    let mut hero = Node::with_id(nid("n:hero"), NodeKind::Character, pt(0.0, 0.0));
    hero.set_character_id(Some(CharacterId::new("c:hero").expect("character id")));
    let mentor = Node::with_id(nid("n:mentor"), NodeKind::Character, pt(300.0, 0.0));
    let mut event = Node::with_id(nid("n:call"), NodeKind::Event, pt(150.0, 250.0));
    event.set_text("Call to adventure");

    doc.nodes_mut().extend([hero, mentor, event]);
    doc.connectors_mut().push(Connector::with_id(
        cid("e:hero-mentor"),
        nid("n:hero"),
        nid("n:mentor"),
        90.0,
        90.0,
    ));
    doc.connectors_mut().push(Connector::with_id(
        cid("e:hero-call"),
        nid("n:hero"),
        nid("n:call"),
        -90.0,
        90.0,
    ));

    doc
}

/// A `rows` x `cols` grid of event nodes, each linked to its right and lower neighbour.
#[cfg(test)]
pub(crate) fn event_grid(rows: usize, cols: usize) -> DiagramDocument {
    let mut doc = DiagramDocument::new(
        DiagramId::new("d:grid").expect("diagram id"),
        "Grid",
        DiagramKind::Mindmap,
    );
    doc.set_loaded(true);

    let id_at = |row: usize, col: usize| nid(&format!("n:{row:03}-{col:03}"));
    for row in 0..rows {
        for col in 0..cols {
            let mut node =
                Node::with_id(id_at(row, col), NodeKind::Event, pt(col as f64 * 250.0, row as f64 * 180.0));
            node.set_text(format!("Event {row}/{col}"));
            doc.nodes_mut().push(node);
        }
    }
    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                doc.connectors_mut().push(Connector::new(id_at(row, col), id_at(row, col + 1), 0.0, 180.0));
            }
            if row + 1 < rows {
                doc.connectors_mut().push(Connector::new(id_at(row, col), id_at(row + 1, col), -90.0, 90.0));
            }
        }
    }

    doc
}
