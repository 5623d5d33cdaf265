// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::model::{
    CharacterId, Connector, ConnectorId, ConnectorStyle, FontSettings, Node, NodeId, Point,
};

/// A single undoable scene mutation.
///
/// Commands are plain data: each variant carries enough state to be re-applied, and
/// [`SceneCommand::inverse`] yields the command that reverts it. Indices record where an
/// element sat in the document so that undoing a removal restores the original order.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    InsertNode {
        index: usize,
        node: Node,
        /// Attached connectors with their document indices, ascending.
        connectors: Vec<(usize, Connector)>,
    },
    RemoveNode {
        index: usize,
        node: Node,
        connectors: Vec<(usize, Connector)>,
    },
    InsertConnector {
        index: usize,
        connector: Connector,
    },
    RemoveConnector {
        index: usize,
        connector: Connector,
    },
    MoveNode {
        node_id: NodeId,
        old: Point,
        new: Point,
    },
    EditNode {
        node_id: NodeId,
        old: NodeChange,
        new: NodeChange,
    },
    EditConnector {
        connector_id: ConnectorId,
        old: ConnectorStyle,
        new: ConnectorStyle,
    },
}

impl SceneCommand {
    pub fn inverse(&self) -> SceneCommand {
        match self {
            Self::InsertNode { index, node, connectors } => Self::RemoveNode {
                index: *index,
                node: node.clone(),
                connectors: connectors.clone(),
            },
            Self::RemoveNode { index, node, connectors } => Self::InsertNode {
                index: *index,
                node: node.clone(),
                connectors: connectors.clone(),
            },
            Self::InsertConnector { index, connector } => {
                Self::RemoveConnector { index: *index, connector: connector.clone() }
            }
            Self::RemoveConnector { index, connector } => {
                Self::InsertConnector { index: *index, connector: connector.clone() }
            }
            Self::MoveNode { node_id, old, new } => {
                Self::MoveNode { node_id: node_id.clone(), old: *new, new: *old }
            }
            Self::EditNode { node_id, old, new } => Self::EditNode {
                node_id: node_id.clone(),
                old: new.clone(),
                new: old.clone(),
            },
            Self::EditConnector { connector_id, old, new } => Self::EditConnector {
                connector_id: connector_id.clone(),
                old: new.clone(),
                new: old.clone(),
            },
        }
    }

    pub fn merge_kind(&self) -> Option<MergeKind> {
        match self {
            Self::EditNode { new, .. } => new.merge_kind(),
            _ => None,
        }
    }

    /// Folds `next` into `self` when both are mergeable edits of the same kind on the same
    /// node. The merged command keeps the oldest `old` and the newest `new` value.
    pub fn try_merge(&mut self, next: &SceneCommand) -> bool {
        let (
            Self::EditNode { node_id, new, .. },
            Self::EditNode { node_id: next_node_id, new: next_new, .. },
        ) = (self, next)
        else {
            return false;
        };
        if node_id != next_node_id {
            return false;
        }
        match (new.merge_kind(), next_new.merge_kind()) {
            (Some(kind), Some(next_kind)) if kind == next_kind => {
                *new = next_new.clone();
                true
            }
            _ => false,
        }
    }
}

/// Edits of the same kind on the same node collapse into one undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeKind {
    Text,
    Size,
    Note,
}

/// One editable node property with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeChange {
    Text(String),
    Size(u32),
    Note { text: String, height: u32 },
    Color(SmolStr),
    Icon(Option<SmolStr>),
    Font(FontSettings),
    Character(Option<CharacterId>),
    Transparent(bool),
}

impl NodeChange {
    pub fn merge_kind(&self) -> Option<MergeKind> {
        match self {
            Self::Text(_) => Some(MergeKind::Text),
            Self::Size(_) => Some(MergeKind::Size),
            Self::Note { .. } => Some(MergeKind::Note),
            _ => None,
        }
    }

    /// The current value of the property this change targets.
    pub fn capture(&self, node: &Node) -> NodeChange {
        match self {
            Self::Text(_) => Self::Text(node.text().to_owned()),
            Self::Size(_) => Self::Size(node.size()),
            Self::Note { .. } => Self::Note { text: node.text().to_owned(), height: node.height() },
            Self::Color(_) => Self::Color(SmolStr::new(node.color())),
            Self::Icon(_) => Self::Icon(node.icon().map(SmolStr::new)),
            Self::Font(_) => Self::Font(node.font()),
            Self::Character(_) => Self::Character(node.character_id().cloned()),
            Self::Transparent(_) => Self::Transparent(node.transparent()),
        }
    }

    pub fn apply(&self, node: &mut Node) {
        match self {
            Self::Text(text) => node.set_text(text.clone()),
            Self::Size(size) => node.set_size(*size),
            Self::Note { text, height } => {
                node.set_text(text.clone());
                node.set_height(*height);
            }
            Self::Color(color) => node.set_color(color.clone()),
            Self::Icon(icon) => node.set_icon(icon.clone()),
            Self::Font(font) => node.set_font(*font),
            Self::Character(character_id) => node.set_character_id(character_id.clone()),
            Self::Transparent(transparent) => node.set_transparent(*transparent),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text(_) => "Edit text",
            Self::Size(_) => "Resize item",
            Self::Note { .. } => "Edit note",
            Self::Color(_) => "Change color",
            Self::Icon(_) => "Change icon",
            Self::Font(_) => "Change font",
            Self::Character(_) => "Change character",
            Self::Transparent(_) => "Toggle transparency",
        }
    }
}
