// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::connector::Connector;
use super::ids::{ConnectorId, DiagramId, NodeId};
use super::node::Node;

/// What a diagram is used for; the editing model is the same for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    #[default]
    Mindmap,
    CharacterNetwork,
    Relationship,
    World,
}

impl DiagramKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mindmap => "mindmap",
            Self::CharacterNetwork => "character_network",
            Self::Relationship => "relationship",
            Self::World => "world",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The serializable graph of nodes and connectors.
///
/// `loaded` distinguishes a freshly created document that still needs its content (or
/// defaults) from one that has been restored from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    id: DiagramId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: DiagramKind,
    #[serde(default)]
    loaded: bool,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    connectors: Vec<Connector>,
}

impl DiagramDocument {
    pub fn new(id: DiagramId, name: impl Into<String>, kind: DiagramKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            loaded: false,
            nodes: Vec::new(),
            connectors: Vec::new(),
        }
    }

    pub fn id(&self) -> &DiagramId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn connectors_mut(&mut self) -> &mut Vec<Connector> {
        &mut self.connectors
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == node_id)
    }

    pub fn node_index(&self, node_id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == node_id)
    }

    pub fn connector(&self, connector_id: &ConnectorId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id() == connector_id)
    }

    pub fn connector_mut(&mut self, connector_id: &ConnectorId) -> Option<&mut Connector> {
        self.connectors.iter_mut().find(|c| c.id() == connector_id)
    }

    pub fn connector_index(&self, connector_id: &ConnectorId) -> Option<usize> {
        self.connectors.iter().position(|c| c.id() == connector_id)
    }

    /// Connectors attached to `node_id` at either end.
    pub fn connectors_of<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Connector> {
        self.connectors.iter().filter(move |c| c.touches(node_id))
    }

    /// Connectors whose source or target is not part of this document.
    pub fn dangling_connectors(&self) -> Vec<&ConnectorId> {
        self.connectors
            .iter()
            .filter(|c| self.node(c.source_id()).is_none() || self.node(c.target_id()).is_none())
            .map(|c| c.id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagramDocument, DiagramKind};
    use crate::model::{Connector, DiagramId, Node, NodeId, NodeKind, Point};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    #[test]
    fn finds_nodes_and_attached_connectors() {
        let mut doc = DiagramDocument::new(
            DiagramId::new("d:1").expect("diagram id"),
            "Allies",
            DiagramKind::Relationship,
        );
        doc.nodes_mut().push(Node::with_id(nid("n:a"), NodeKind::Character, Point::ORIGIN));
        doc.nodes_mut().push(Node::with_id(nid("n:b"), NodeKind::Character, Point::ORIGIN));
        doc.connectors_mut().push(Connector::new(nid("n:a"), nid("n:b"), 0.0, 180.0));
        doc.connectors_mut().push(Connector::new(nid("n:b"), nid("n:missing"), 0.0, 180.0));

        assert_eq!(doc.node_index(&nid("n:b")), Some(1));
        assert_eq!(doc.connectors_of(&nid("n:a")).count(), 1);
        assert_eq!(doc.connectors_of(&nid("n:b")).count(), 2);
        assert_eq!(doc.dangling_connectors().len(), 1);
    }

    #[test]
    fn document_json_defaults_missing_collections() {
        let json = r#"{"id":"d:empty"}"#;
        let doc: DiagramDocument = serde_json::from_str(json).expect("deserialize");
        assert!(!doc.is_loaded());
        assert!(doc.nodes().is_empty());
        assert!(doc.connectors().is_empty());
        assert_eq!(doc.kind(), DiagramKind::Mindmap);
    }
}
