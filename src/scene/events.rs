// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{ConnectorId, NodeId, NodeKind};

/// Addresses a graphical item by the id of the model element it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Node(NodeId),
    Connector(ConnectorId),
}

impl ItemRef {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::Node(node_id) => Some(node_id),
            Self::Connector(_) => None,
        }
    }

    pub fn connector_id(&self) -> Option<&ConnectorId> {
        match self {
            Self::Connector(connector_id) => Some(connector_id),
            Self::Node(_) => None,
        }
    }
}

/// Notifications for the embedding view, queued in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    ItemAdded { kind: NodeKind, node_id: NodeId },
    ItemsMoved(Vec<NodeId>),
    EditRequested(ItemRef),
    HideEditorRequested,
    CancelAddition,
}
