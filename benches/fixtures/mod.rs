// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use plotnet::model::{
    CharacterId, Connector, ConnectorId, DiagramDocument, DiagramId, DiagramKind, Node, NodeId,
    NodeKind, Point,
};

const COLUMN_GAP: f64 = 300.0;
const ROW_GAP: f64 = 220.0;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn side(self) -> usize {
        match self {
            Self::Small => 4,
            Self::Medium => 12,
            Self::Large => 32,
        }
    }
}

pub fn node_id(row: usize, col: usize) -> NodeId {
    NodeId::new(format!("n-{row}-{col}")).expect("node id")
}

pub fn node_pos(row: usize, col: usize) -> Point {
    Point::new(col as f64 * COLUMN_GAP, row as f64 * ROW_GAP).expect("grid point")
}

/// A square grid alternating characters and events, every node linked to its right and
/// lower neighbour.
pub fn network(case: Case) -> DiagramDocument {
    let side = case.side();
    let mut doc = DiagramDocument::new(
        DiagramId::new(format!("bench-{}", case.id())).expect("diagram id"),
        format!("Bench {}", case.id()),
        DiagramKind::CharacterNetwork,
    );
    doc.set_loaded(true);

    for row in 0..side {
        for col in 0..side {
            let kind = if (row + col) % 2 == 0 { NodeKind::Character } else { NodeKind::Event };
            let mut node = Node::with_id(node_id(row, col), kind, node_pos(row, col));
            match kind {
                NodeKind::Character => {
                    let character = CharacterId::new(format!("c-{row}-{col}")).expect("character id");
                    node.set_character_id(Some(character));
                }
                _ => node.set_text(format!("Beat {row}.{col}")),
            }
            doc.nodes_mut().push(node);
        }
    }

    for row in 0..side {
        for col in 0..side {
            if col + 1 < side {
                doc.connectors_mut().push(Connector::with_id(
                    ConnectorId::new(format!("e-{row}-{col}-r")).expect("connector id"),
                    node_id(row, col),
                    node_id(row, col + 1),
                    0.0,
                    180.0,
                ));
            }
            if row + 1 < side {
                doc.connectors_mut().push(Connector::with_id(
                    ConnectorId::new(format!("e-{row}-{col}-d")).expect("connector id"),
                    node_id(row, col),
                    node_id(row + 1, col),
                    -90.0,
                    90.0,
                ));
            }
        }
    }

    doc
}

/// Id of the node in the middle of the grid.
pub fn center_node(case: Case) -> NodeId {
    let mid = case.side() / 2;
    node_id(mid, mid)
}
