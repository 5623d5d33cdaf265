// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The diagram editing surface.
//!
//! [`NetworkScene`] keeps a [`DiagramDocument`] and its graphical items in lockstep and turns
//! pointer and keyboard input into graph mutations. Structural mutations are recorded on the
//! [`UndoStack`] and followed by a [`DiagramGateway::save`] call.
//!
//! The scene is in exactly one interaction state at a time: idle, waiting to place a new
//! item (addition mode), or dragging a connector out of a socket (link mode).

mod config;
mod descriptor;
mod events;
pub mod input;
pub mod items;

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use smol_str::SmolStr;
use thiserror::Error;

use crate::gateway::{DiagramGateway, NullGateway};
use crate::model::{
    CharacterId, Connector, ConnectorId, ConnectorStyle, DiagramDocument, FontSettings, Node,
    NodeId, NodeKind, Point,
};
use crate::undo::{NodeChange, SceneCommand, UndoStack};

pub use config::SceneConfig;
pub use descriptor::{DescriptorExtra, ItemDescriptor};
pub use events::{ItemRef, SceneEvent};
pub use input::{Modifiers, PointerButton, PointerEvent, SceneKey};
pub use items::{ConnectorItem, ItemShape, NodeItem, Route, Socket, SocketRef};

use items::PLACEHOLDER_CHARACTER_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Addition,
    Link,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addition => f.write_str("addition mode"),
            Self::Link => f.write_str("link mode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no diagram is set")]
    NoDiagram,
    #[error("cannot enter {requested} while {active} is active")]
    ModeConflict { active: InteractionMode, requested: InteractionMode },
    #[error("link mode is not active")]
    NotLinking,
    #[error("cannot connect a node to itself")]
    SelfLink,
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown connector {0}")]
    UnknownConnector(ConnectorId),
    #[error("node {node_id} has no socket at {angle} degrees")]
    InvalidSocket { node_id: NodeId, angle: f64 },
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("connector {0} already exists")]
    DuplicateConnector(ConnectorId),
}

/// A node taken out of the scene together with the connectors that went with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub index: usize,
    pub node: Node,
    /// Cascaded connectors with their former document indices, ascending.
    pub connectors: Vec<(usize, Connector)>,
}

impl RemovedNode {
    fn into_command(self) -> SceneCommand {
        SceneCommand::RemoveNode { index: self.index, node: self.node, connectors: self.connectors }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Interaction {
    Idle,
    Addition { kind: NodeKind, subtype: SmolStr },
    Link { source: SocketRef, placeholder: Point },
}

#[derive(Debug, Clone)]
struct DragState {
    origin: Point,
    start: Vec<(NodeId, Point)>,
    moved: bool,
    in_macro: bool,
}

pub struct NetworkScene<G: DiagramGateway = NullGateway> {
    config: SceneConfig,
    gateway: G,
    document: Option<DiagramDocument>,
    nodes: IndexMap<NodeId, NodeItem>,
    connectors: IndexMap<ConnectorId, ConnectorItem>,
    interaction: Interaction,
    drag: Option<DragState>,
    copied: Option<ItemDescriptor>,
    pointer: Option<Point>,
    undo_stack: UndoStack,
    events: Vec<SceneEvent>,
}

impl NetworkScene<NullGateway> {
    pub fn new() -> Self {
        Self::with_gateway(NullGateway)
    }
}

impl Default for NetworkScene<NullGateway> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: DiagramGateway> fmt::Debug for NetworkScene<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkScene")
            .field("diagram", &self.document.as_ref().map(|d| d.id().as_str()))
            .field("nodes", &self.nodes.len())
            .field("connectors", &self.connectors.len())
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl<G: DiagramGateway> NetworkScene<G> {
    pub fn with_gateway(gateway: G) -> Self {
        Self::with_config(gateway, SceneConfig::default())
    }

    pub fn with_config(gateway: G, config: SceneConfig) -> Self {
        let undo_stack = UndoStack::new(config.undo_limit());
        Self {
            config,
            gateway,
            document: None,
            nodes: IndexMap::new(),
            connectors: IndexMap::new(),
            interaction: Interaction::Idle,
            drag: None,
            copied: None,
            pointer: None,
            undo_stack,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn document(&self) -> Option<&DiagramDocument> {
        self.document.as_ref()
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    pub fn undo_stack_mut(&mut self) -> &mut UndoStack {
        &mut self.undo_stack
    }

    /// Injects the embedder's undo stack and hands back the previous one.
    pub fn set_undo_stack(&mut self, undo_stack: UndoStack) -> UndoStack {
        self.abandon_drag();
        std::mem::replace(&mut self.undo_stack, undo_stack)
    }

    /// Takes all events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    // ---- Diagram lifecycle ----

    /// Replaces the scene content with `document`.
    ///
    /// Documents that were never loaded are first filled by the gateway. Items are built in
    /// two passes so that connectors can refer to nodes appearing later in the document.
    /// Connectors whose endpoints or sockets cannot be resolved stay in the document but get
    /// no item.
    pub fn set_diagram(&mut self, mut document: DiagramDocument) {
        self.clear_items();
        self.undo_stack.clear();

        if !document.is_loaded() {
            self.gateway.load(&mut document);
            document.set_loaded(true);
        }

        for node in document.nodes() {
            if self.nodes.contains_key(node.id()) {
                warn!(node_id = node.id().as_str(); "Skipping duplicate node");
                continue;
            }
            let item = build_node_item(&self.gateway, node);
            self.nodes.insert(node.id().clone(), item);
        }
        for connector in document.connectors() {
            if let Err(err) = self.wire_connector(connector) {
                warn!(connector_id = connector.id().as_str(), error:% = err; "Skipping connector");
            }
        }

        debug!(
            diagram_id = document.id().as_str(),
            nodes = self.nodes.len(),
            connectors = self.connectors.len();
            "Diagram set"
        );
        self.document = Some(document);
    }

    /// Detaches the document, leaving an empty scene.
    pub fn take_document(&mut self) -> Option<DiagramDocument> {
        self.clear_items();
        self.undo_stack.clear();
        self.document.take()
    }

    fn clear_items(&mut self) {
        self.nodes.clear();
        self.connectors.clear();
        self.interaction = Interaction::Idle;
        self.drag = None;
    }

    fn save(&mut self) {
        if let Some(document) = &self.document {
            self.gateway.save(document);
        }
    }

    // ---- Item access ----

    pub fn node_item(&self, node_id: &NodeId) -> Option<&NodeItem> {
        self.nodes.get(node_id)
    }

    pub fn connector_item(&self, connector_id: &ConnectorId) -> Option<&ConnectorItem> {
        self.connectors.get(connector_id)
    }

    /// Node items from bottom to top.
    pub fn node_items(&self) -> impl Iterator<Item = &NodeItem> {
        self.nodes.values()
    }

    pub fn connector_items(&self) -> impl Iterator<Item = &ConnectorItem> {
        self.connectors.values()
    }

    /// The socket under `pos`, looking at the topmost items first.
    pub fn socket_at(&self, pos: Point) -> Option<SocketRef> {
        let tolerance = self.config.link_tolerance();
        self.nodes.values().rev().find_map(|item| {
            item.socket_at(pos, tolerance).map(|angle| SocketRef::new(item.node_id().clone(), angle))
        })
    }

    /// The item under `pos`: nodes (topmost first), then connectors.
    pub fn item_at(&self, pos: Point) -> Option<ItemRef> {
        if let Some(item) = self.nodes.values().rev().find(|item| item.bounds().contains(pos)) {
            return Some(ItemRef::Node(item.node_id().clone()));
        }
        let tolerance = self.config.connector_tolerance();
        self.connectors
            .values()
            .rev()
            .find(|item| item.route().distance_to(pos) <= tolerance)
            .map(|item| ItemRef::Connector(item.connector_id().clone()))
    }

    // ---- Selection ----

    pub fn is_selected(&self, item: &ItemRef) -> bool {
        match item {
            ItemRef::Node(id) => self.nodes.get(id).is_some_and(NodeItem::is_selected),
            ItemRef::Connector(id) => self.connectors.get(id).is_some_and(ConnectorItem::is_selected),
        }
    }

    pub fn set_selected(&mut self, item: &ItemRef, selected: bool) {
        match item {
            ItemRef::Node(id) => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.set_selected(selected);
                }
            }
            ItemRef::Connector(id) => {
                if let Some(connector) = self.connectors.get_mut(id) {
                    connector.set_selected(selected);
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.nodes.values_mut().for_each(|item| item.set_selected(false));
        self.connectors.values_mut().for_each(|item| item.set_selected(false));
    }

    /// Selected items, nodes before connectors, each bottom to top.
    pub fn selected_items(&self) -> Vec<ItemRef> {
        let nodes = self
            .nodes
            .values()
            .filter(|item| item.is_selected())
            .map(|item| ItemRef::Node(item.node_id().clone()));
        let connectors = self
            .connectors
            .values()
            .filter(|item| item.is_selected())
            .map(|item| ItemRef::Connector(item.connector_id().clone()));
        nodes.chain(connectors).collect()
    }

    // ---- Addition mode ----

    pub fn start_addition_mode(
        &mut self,
        kind: NodeKind,
        subtype: impl Into<SmolStr>,
    ) -> Result<(), SceneError> {
        if matches!(self.interaction, Interaction::Link { .. }) {
            return Err(SceneError::ModeConflict {
                active: InteractionMode::Link,
                requested: InteractionMode::Addition,
            });
        }
        self.finish_drag();
        let subtype = subtype.into();
        debug!(kind = kind.as_str(), subtype = subtype.as_str(); "Addition mode started");
        self.interaction = Interaction::Addition { kind, subtype };
        Ok(())
    }

    pub fn end_addition_mode(&mut self) {
        if matches!(self.interaction, Interaction::Addition { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    pub fn is_addition_mode(&self) -> bool {
        matches!(self.interaction, Interaction::Addition { .. })
    }

    /// Kind and subtype the next placement will create.
    pub fn addition_descriptor(&self) -> Option<(NodeKind, &str)> {
        match &self.interaction {
            Interaction::Addition { kind, subtype } => Some((*kind, subtype.as_str())),
            _ => None,
        }
    }

    fn cancel_addition(&mut self) {
        self.events.push(SceneEvent::CancelAddition);
        self.end_addition_mode();
    }

    // ---- Link mode ----

    /// Starts dragging a connector out of `source`. Restarting from another socket while
    /// already linking replaces the pending link.
    pub fn start_link(&mut self, source: SocketRef) -> Result<(), SceneError> {
        if matches!(self.interaction, Interaction::Addition { .. }) {
            return Err(SceneError::ModeConflict {
                active: InteractionMode::Addition,
                requested: InteractionMode::Link,
            });
        }
        let item = self
            .nodes
            .get(source.node_id())
            .ok_or_else(|| SceneError::UnknownNode(source.node_id().clone()))?;
        if !item.accepts_angle(source.angle()) {
            return Err(SceneError::InvalidSocket {
                node_id: source.node_id().clone(),
                angle: source.angle(),
            });
        }
        let placeholder = item.socket_position(source.angle());
        debug!(node_id = source.node_id().as_str(), angle = source.angle(); "Link started");
        self.finish_drag();
        self.interaction = Interaction::Link { source, placeholder };
        self.events.push(SceneEvent::HideEditorRequested);
        Ok(())
    }

    /// Cancels link mode and discards the placeholder connector.
    pub fn end_link(&mut self) {
        if matches!(self.interaction, Interaction::Link { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    pub fn link_mode(&self) -> bool {
        matches!(self.interaction, Interaction::Link { .. })
    }

    pub fn link_source(&self) -> Option<&SocketRef> {
        match &self.interaction {
            Interaction::Link { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Path of the placeholder connector following the pointer.
    pub fn link_placeholder(&self) -> Option<Route> {
        let Interaction::Link { source, placeholder } = &self.interaction else {
            return None;
        };
        let start = self.nodes.get(source.node_id())?.socket_position(source.angle());
        Some(Route::line(start, *placeholder))
    }

    /// Completes the pending link at `target`.
    ///
    /// A link back onto the source node is rejected and link mode stays active so the user
    /// can pick another target.
    pub fn link(&mut self, target: SocketRef) -> Result<ConnectorId, SceneError> {
        let Interaction::Link { source, .. } = &self.interaction else {
            return Err(SceneError::NotLinking);
        };
        let source = source.clone();
        if source.node_id() == target.node_id() {
            debug!(node_id = source.node_id().as_str(); "Rejected link to the same node");
            return Err(SceneError::SelfLink);
        }
        let target_item = self
            .nodes
            .get(target.node_id())
            .ok_or_else(|| SceneError::UnknownNode(target.node_id().clone()))?;
        if !target_item.accepts_angle(target.angle()) {
            return Err(SceneError::InvalidSocket {
                node_id: target.node_id().clone(),
                angle: target.angle(),
            });
        }

        let connector = Connector::new(
            source.node_id().clone(),
            target.node_id().clone(),
            source.angle(),
            target.angle(),
        );
        let connector_id = connector.id().clone();
        let index = self.document.as_ref().ok_or(SceneError::NoDiagram)?.connectors().len();
        self.insert_connector(index, connector.clone())?;
        self.undo_stack.push("Add connector", SceneCommand::InsertConnector { index, connector });
        self.end_link();
        debug!(connector_id = connector_id.as_str(); "Linked");
        self.save();
        Ok(connector_id)
    }

    // ---- Structural primitives ----

    /// Inserts a node and its connectors without recording an undo step.
    pub fn add_network_item(
        &mut self,
        node: Node,
        connectors: Vec<Connector>,
    ) -> Result<NodeId, SceneError> {
        let document = self.document.as_ref().ok_or(SceneError::NoDiagram)?;
        let node_id = node.id().clone();
        let index = document.nodes().len();
        self.insert_node(index, node)?;
        for connector in connectors {
            let index = self.document.as_ref().map_or(0, |d| d.connectors().len());
            self.insert_connector(index, connector)?;
        }
        self.save();
        Ok(node_id)
    }

    /// Removes a node and every connector attached to it without recording an undo step.
    pub fn remove_network_item(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let removed = self.take_node(node_id)?;
        self.save();
        Some(removed)
    }

    /// Removes a connector without recording an undo step. Returns `None` when it was
    /// already gone.
    pub fn remove_connector_item(&mut self, connector_id: &ConnectorId) -> Option<(usize, Connector)> {
        let removed = self.take_connector(connector_id)?;
        self.save();
        Some(removed)
    }

    fn insert_node(&mut self, index: usize, node: Node) -> Result<(), SceneError> {
        let document = self.document.as_mut().ok_or(SceneError::NoDiagram)?;
        if document.node(node.id()).is_some() || self.nodes.contains_key(node.id()) {
            return Err(SceneError::DuplicateNode(node.id().clone()));
        }
        let item = build_node_item(&self.gateway, &node);
        let node_id = node.id().clone();
        let index = index.min(document.nodes().len());
        document.nodes_mut().insert(index, node);
        debug!(node_id = node_id.as_str(), index = index; "Node inserted");
        self.nodes.insert(node_id, item);
        Ok(())
    }

    fn insert_connector(&mut self, index: usize, connector: Connector) -> Result<(), SceneError> {
        let document = self.document.as_ref().ok_or(SceneError::NoDiagram)?;
        if document.connector(connector.id()).is_some() {
            return Err(SceneError::DuplicateConnector(connector.id().clone()));
        }
        // Replayed connectors whose sockets no longer resolve stay in the document.
        match self.wire_connector(&connector) {
            Ok(()) => {}
            Err(err @ SceneError::DuplicateConnector(_)) => return Err(err),
            Err(err) => {
                warn!(connector_id = connector.id().as_str(), error:% = err; "Connector kept without an item");
            }
        }
        let document = self.document.as_mut().ok_or(SceneError::NoDiagram)?;
        let index = index.min(document.connectors().len());
        debug!(connector_id = connector.id().as_str(), index = index; "Connector inserted");
        document.connectors_mut().insert(index, connector);
        Ok(())
    }

    /// Builds the item for `connector` and attaches it to both sockets.
    fn wire_connector(&mut self, connector: &Connector) -> Result<(), SceneError> {
        if self.connectors.contains_key(connector.id()) {
            return Err(SceneError::DuplicateConnector(connector.id().clone()));
        }
        let source = SocketRef::new(connector.source_id().clone(), connector.source_angle());
        let target = SocketRef::new(connector.target_id().clone(), connector.target_angle());
        for end in [&source, &target] {
            let item = self
                .nodes
                .get(end.node_id())
                .ok_or_else(|| SceneError::UnknownNode(end.node_id().clone()))?;
            if !item.accepts_angle(end.angle()) {
                return Err(SceneError::InvalidSocket { node_id: end.node_id().clone(), angle: end.angle() });
            }
        }
        for end in [&source, &target] {
            if let Some(item) = self.nodes.get_mut(end.node_id()) {
                item.attach(end.angle(), connector.id().clone());
            }
        }
        let route = self
            .route_between(&source, &target, connector.cp_controlled())
            .ok_or_else(|| SceneError::UnknownNode(source.node_id().clone()))?;
        self.connectors.insert(
            connector.id().clone(),
            ConnectorItem::new(connector.id().clone(), source, target, connector.cp_controlled(), route),
        );
        Ok(())
    }

    fn route_between(&self, source: &SocketRef, target: &SocketRef, cp_controlled: bool) -> Option<Route> {
        let start = self.nodes.get(source.node_id())?.socket_position(source.angle());
        let end = self.nodes.get(target.node_id())?.socket_position(target.angle());
        Some(Route::between(start, end, source.angle(), cp_controlled))
    }

    fn reroute_node(&mut self, node_id: &NodeId) {
        let Some(item) = self.nodes.get(node_id) else {
            return;
        };
        let attached: Vec<ConnectorId> = item.connectors().cloned().collect();
        for connector_id in attached {
            let Some(connector) = self.connectors.get(&connector_id) else {
                continue;
            };
            let route = self.route_between(connector.source(), connector.target(), connector.cp_controlled());
            if let (Some(route), Some(connector)) = (route, self.connectors.get_mut(&connector_id)) {
                connector.set_route(route);
            }
        }
    }

    /// Removes a connector from the document and detaches its item from both sockets.
    ///
    /// A connector that is already gone is not an error: cascading node removal may have
    /// taken it first.
    fn take_connector(&mut self, connector_id: &ConnectorId) -> Option<(usize, Connector)> {
        self.unwire_connector(connector_id);
        let document = self.document.as_mut()?;
        let Some(index) = document.connector_index(connector_id) else {
            debug!(connector_id = connector_id.as_str(); "Connector already removed");
            return None;
        };
        let connector = document.connectors_mut().remove(index);
        debug!(connector_id = connector_id.as_str(), index = index; "Connector removed");
        Some((index, connector))
    }

    fn unwire_connector(&mut self, connector_id: &ConnectorId) {
        let Some(item) = self.connectors.shift_remove(connector_id) else {
            return;
        };
        for node_id in [item.source().node_id(), item.target().node_id()] {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.detach(connector_id);
            }
        }
    }

    /// Removes a node and cascades to every connector referencing it.
    fn take_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let Some(document) = self.document.as_ref() else {
            return None;
        };
        let Some(index) = document.node_index(node_id) else {
            debug!(node_id = node_id.as_str(); "Node already removed");
            return None;
        };
        let attached: Vec<ConnectorId> = document.connectors_of(node_id).map(|c| c.id().clone()).collect();

        // Connector indices are recorded before anything is removed so that re-inserting in
        // ascending order restores the original layout.
        let mut connectors: Vec<(usize, Connector)> = Vec::with_capacity(attached.len());
        for connector_id in &attached {
            self.unwire_connector(connector_id);
        }
        if let Some(document) = self.document.as_mut() {
            let mut position = 0;
            document.connectors_mut().retain(|connector| {
                let keep = !connector.touches(node_id);
                if !keep {
                    connectors.push((position, connector.clone()));
                }
                position += 1;
                keep
            });
        }

        let document = self.document.as_mut()?;
        let node = document.nodes_mut().remove(index);
        self.nodes.shift_remove(node_id);
        if let Some(drag) = self.drag.as_mut() {
            drag.start.retain(|(id, _)| id != node_id);
        }
        debug!(node_id = node_id.as_str(), connectors = connectors.len(); "Node removed");
        Some(RemovedNode { index, node, connectors })
    }

    fn move_node_to(&mut self, node_id: &NodeId, pos: Point) -> Result<(), SceneError> {
        let document = self.document.as_mut().ok_or(SceneError::NoDiagram)?;
        let node = document
            .node_mut(node_id)
            .ok_or_else(|| SceneError::UnknownNode(node_id.clone()))?;
        node.set_pos(pos);
        if let Some(item) = self.nodes.get_mut(node_id) {
            item.refresh(node);
        }
        self.reroute_node(node_id);
        Ok(())
    }

    fn apply_node_change(&mut self, node_id: &NodeId, change: &NodeChange) -> Result<(), SceneError> {
        let document = self.document.as_mut().ok_or(SceneError::NoDiagram)?;
        let node = document
            .node_mut(node_id)
            .ok_or_else(|| SceneError::UnknownNode(node_id.clone()))?;
        change.apply(node);
        if let Some(item) = self.nodes.get_mut(node_id) {
            item.refresh(node);
            item.set_label(node_label(&self.gateway, node));
        }
        self.reroute_node(node_id);
        Ok(())
    }

    fn apply_connector_style(
        &mut self,
        connector_id: &ConnectorId,
        style: &ConnectorStyle,
    ) -> Result<(), SceneError> {
        let document = self.document.as_mut().ok_or(SceneError::NoDiagram)?;
        let connector = document
            .connector_mut(connector_id)
            .ok_or_else(|| SceneError::UnknownConnector(connector_id.clone()))?;
        connector.set_style(style.clone());
        Ok(())
    }

    /// Re-applies a recorded command in its forward direction.
    fn apply(&mut self, command: &SceneCommand) -> Result<(), SceneError> {
        match command {
            SceneCommand::InsertNode { index, node, connectors } => {
                self.insert_node(*index, node.clone())?;
                for (index, connector) in connectors {
                    self.insert_connector(*index, connector.clone())?;
                }
            }
            SceneCommand::RemoveNode { node, .. } => {
                self.take_node(node.id())
                    .ok_or_else(|| SceneError::UnknownNode(node.id().clone()))?;
            }
            SceneCommand::InsertConnector { index, connector } => {
                self.insert_connector(*index, connector.clone())?;
            }
            SceneCommand::RemoveConnector { connector, .. } => {
                self.take_connector(connector.id());
            }
            SceneCommand::MoveNode { node_id, new, .. } => self.move_node_to(node_id, *new)?,
            SceneCommand::EditNode { node_id, new, .. } => self.apply_node_change(node_id, new)?,
            SceneCommand::EditConnector { connector_id, new, .. } => {
                self.apply_connector_style(connector_id, new)?;
            }
        }
        Ok(())
    }

    // ---- Undoable editing ----

    /// Creates a node of `kind` at `pos` and records it for undo.
    ///
    /// Image nodes ask the gateway for an upload first; when nothing is picked the addition
    /// is cancelled and `Ok(None)` is returned.
    pub fn add_new_item(
        &mut self,
        pos: Point,
        kind: NodeKind,
        subtype: &str,
    ) -> Result<Option<NodeId>, SceneError> {
        self.place_item(pos, kind, subtype, None)
    }

    fn place_item(
        &mut self,
        pos: Point,
        kind: NodeKind,
        subtype: &str,
        descriptor: Option<&ItemDescriptor>,
    ) -> Result<Option<NodeId>, SceneError> {
        self.finish_drag();
        let index = self.document.as_ref().ok_or(SceneError::NoDiagram)?.nodes().len();
        let mut node = node_for(kind, pos, subtype);
        if kind.is_text_item() {
            node.set_size(self.config.default_font_size());
        }
        if let Some(descriptor) = descriptor {
            descriptor.apply_to(&mut node);
        }
        if kind == NodeKind::Image && node.image_ref().is_none() {
            let Some(image_ref) = self.gateway.upload_image() else {
                debug!("Image upload cancelled");
                self.cancel_addition();
                return Ok(None);
            };
            node.set_image_ref(Some(image_ref));
        }

        let node_id = node.id().clone();
        self.insert_node(index, node.clone())?;
        self.undo_stack.push(
            "Add item",
            SceneCommand::InsertNode { index, node, connectors: Vec::new() },
        );
        self.events.push(SceneEvent::ItemAdded { kind, node_id: node_id.clone() });
        self.end_addition_mode();
        self.save();
        Ok(Some(node_id))
    }

    fn remove_recorded(&mut self, item: &ItemRef) -> bool {
        match item {
            ItemRef::Node(node_id) => {
                let Some(removed) = self.take_node(node_id) else {
                    return false;
                };
                self.undo_stack.push("Remove item", removed.into_command());
            }
            ItemRef::Connector(connector_id) => {
                let Some((index, connector)) = self.take_connector(connector_id) else {
                    return false;
                };
                self.undo_stack
                    .push("Remove connector", SceneCommand::RemoveConnector { index, connector });
            }
        }
        true
    }

    /// Removes one item (cascading for nodes) and records it for undo.
    pub fn remove_item(&mut self, item: &ItemRef) -> bool {
        self.finish_drag();
        let removed = self.remove_recorded(item);
        if removed {
            self.save();
        }
        removed
    }

    /// Removes the whole selection as one undo step. Returns how many items were removed;
    /// connectors already taken by a node's cascade do not count.
    pub fn remove_selected(&mut self) -> usize {
        self.finish_drag();
        let selected = self.selected_items();
        if selected.is_empty() {
            return 0;
        }
        let batch = selected.len() > 1;
        if batch {
            self.undo_stack.begin_macro("Remove items");
        }
        let removed = selected.iter().filter(|item| self.remove_recorded(item)).count();
        if batch {
            self.undo_stack.end_macro();
        }
        self.save();
        removed
    }

    fn edit_node(&mut self, node_id: &NodeId, change: NodeChange) -> Result<(), SceneError> {
        self.finish_drag();
        let document = self.document.as_ref().ok_or(SceneError::NoDiagram)?;
        let node = document.node(node_id).ok_or_else(|| SceneError::UnknownNode(node_id.clone()))?;
        let old = change.capture(node);
        if old == change {
            return Ok(());
        }
        self.apply_node_change(node_id, &change)?;
        self.undo_stack.push(
            change.label(),
            SceneCommand::EditNode { node_id: node_id.clone(), old, new: change },
        );
        self.save();
        Ok(())
    }

    pub fn set_node_text(&mut self, node_id: &NodeId, text: impl Into<String>) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Text(text.into()))
    }

    pub fn set_node_size(&mut self, node_id: &NodeId, size: u32) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Size(size.max(1)))
    }

    pub fn set_note_text(
        &mut self,
        node_id: &NodeId,
        text: impl Into<String>,
        height: u32,
    ) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Note { text: text.into(), height })
    }

    pub fn set_node_color(&mut self, node_id: &NodeId, color: impl Into<SmolStr>) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Color(color.into()))
    }

    pub fn set_node_icon(&mut self, node_id: &NodeId, icon: Option<SmolStr>) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Icon(icon))
    }

    pub fn set_node_font(&mut self, node_id: &NodeId, font: FontSettings) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Font(font))
    }

    pub fn set_node_character(
        &mut self,
        node_id: &NodeId,
        character_id: Option<CharacterId>,
    ) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Character(character_id))
    }

    pub fn set_node_transparent(&mut self, node_id: &NodeId, transparent: bool) -> Result<(), SceneError> {
        self.edit_node(node_id, NodeChange::Transparent(transparent))
    }

    pub fn set_connector_style(
        &mut self,
        connector_id: &ConnectorId,
        style: ConnectorStyle,
    ) -> Result<(), SceneError> {
        self.finish_drag();
        let document = self.document.as_ref().ok_or(SceneError::NoDiagram)?;
        let old = document
            .connector(connector_id)
            .ok_or_else(|| SceneError::UnknownConnector(connector_id.clone()))?
            .style();
        if old == style {
            return Ok(());
        }
        self.apply_connector_style(connector_id, &style)?;
        self.undo_stack.push(
            "Change connector",
            SceneCommand::EditConnector { connector_id: connector_id.clone(), old, new: style },
        );
        self.save();
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.abandon_drag();
        let Some(entry) = self.undo_stack.step_back() else {
            return false;
        };
        debug!(text = entry.text(); "Undo");
        for command in entry.commands().iter().rev() {
            if let Err(err) = self.apply(&command.inverse()) {
                warn!(error:% = err; "Undo step failed");
            }
        }
        self.save();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_drag();
        let Some(entry) = self.undo_stack.step_forward() else {
            return false;
        };
        debug!(text = entry.text(); "Redo");
        for command in entry.commands() {
            if let Err(err) = self.apply(command) {
                warn!(error:% = err; "Redo step failed");
            }
        }
        self.save();
        true
    }

    // ---- Copy / paste ----

    /// Captures the single selected node. Does nothing unless exactly one item is selected.
    pub fn copy(&mut self) -> bool {
        let selected = self.selected_items();
        let [ItemRef::Node(node_id)] = selected.as_slice() else {
            return false;
        };
        let Some(node) = self.document.as_ref().and_then(|d| d.node(node_id)) else {
            return false;
        };
        self.copied = Some(ItemDescriptor::capture(node));
        true
    }

    pub fn copied(&self) -> Option<&ItemDescriptor> {
        self.copied.as_ref()
    }

    /// Stamps the copied descriptor at the pointer. A no-op without a copy or while the
    /// pointer is outside the canvas.
    pub fn paste(&mut self) -> Result<Option<NodeId>, SceneError> {
        let (Some(descriptor), Some(pos)) = (self.copied.clone(), self.pointer) else {
            return Ok(None);
        };
        self.place_item(pos, descriptor.kind(), descriptor.subtype(), Some(&descriptor))
    }

    // ---- Pointer input ----

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The pointer left the canvas.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn mouse_press(&mut self, event: PointerEvent) {
        trace!(x = event.pos.x(), y = event.pos.y(); "Mouse press");
        self.pointer = Some(event.pos);
        self.finish_drag();
        if event.button != PointerButton::Left {
            return;
        }

        match self.interaction {
            Interaction::Addition { .. } => return,
            Interaction::Link { .. } => {
                if let Some(target) = self.socket_at(event.pos) {
                    if let Err(err) = self.link(target) {
                        debug!(error:% = err; "Link target rejected");
                    }
                }
                return;
            }
            Interaction::Idle => {}
        }

        if !event.modifiers.ctrl {
            if let Some(socket) = self.socket_at(event.pos) {
                if let Err(err) = self.start_link(socket) {
                    debug!(error:% = err; "Cannot start link");
                }
                return;
            }
        }

        let Some(item) = self.item_at(event.pos) else {
            if event.modifiers.ctrl {
                let kind = self.config.default_kind();
                if let Err(err) = self.place_item(event.pos, kind, "", None) {
                    warn!(error:% = err; "Cannot add item");
                }
            } else {
                self.clear_selection();
            }
            return;
        };

        if event.modifiers.ctrl {
            let selected = self.is_selected(&item);
            self.set_selected(&item, !selected);
        } else if !self.is_selected(&item) {
            self.clear_selection();
            self.set_selected(&item, true);
        }

        if matches!(item, ItemRef::Node(_)) && self.is_selected(&item) {
            let start = self
                .nodes
                .values()
                .filter(|node| node.is_selected())
                .map(|node| (node.node_id().clone(), node.pos()))
                .collect();
            self.drag = Some(DragState { origin: event.pos, start, moved: false, in_macro: false });
        }
    }

    pub fn mouse_move(&mut self, event: PointerEvent) {
        trace!(x = event.pos.x(), y = event.pos.y(); "Mouse move");
        self.pointer = Some(event.pos);
        if let Interaction::Link { placeholder, .. } = &mut self.interaction {
            *placeholder = event.pos;
            return;
        }

        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = event.pos.x() - drag.origin.x();
        let dy = event.pos.y() - drag.origin.y();
        if !drag.moved {
            if dx == 0.0 && dy == 0.0 {
                return;
            }
            drag.moved = true;
            if drag.start.len() > 1 {
                self.undo_stack.begin_macro("Move items");
                drag.in_macro = true;
            }
        }
        for (node_id, start) in &drag.start {
            if let Some(item) = self.nodes.get_mut(node_id) {
                item.set_pos(start.offset(dx, dy));
            }
        }
        let moved: Vec<NodeId> = drag.start.iter().map(|(id, _)| id.clone()).collect();
        for node_id in &moved {
            self.reroute_node(node_id);
        }
    }

    pub fn mouse_release(&mut self, event: PointerEvent) {
        trace!(x = event.pos.x(), y = event.pos.y(); "Mouse release");
        self.pointer = Some(event.pos);
        match event.button {
            PointerButton::Right => {
                if self.link_mode() {
                    self.end_link();
                } else if self.is_addition_mode() {
                    self.cancel_addition();
                }
                return;
            }
            PointerButton::Middle => return,
            PointerButton::Left => {}
        }

        if let Interaction::Addition { kind, subtype } = &self.interaction {
            let (kind, subtype) = (*kind, subtype.clone());
            if let Err(err) = self.place_item(event.pos, kind, &subtype, None) {
                warn!(error:% = err; "Cannot add item");
            }
            return;
        }

        if let Some(drag) = self.drag.take() {
            self.commit_drag(drag);
        }
    }

    /// Writes dragged positions back to their nodes. A multi-item drag closes the macro
    /// opened by its first move.
    fn commit_drag(&mut self, drag: DragState) {
        if !drag.moved {
            return;
        }
        let mut moved = Vec::new();
        for (node_id, old) in drag.start {
            let Some(new) = self.nodes.get(&node_id).map(NodeItem::pos) else {
                continue;
            };
            if new == old {
                continue;
            }
            if let Some(node) = self.document.as_mut().and_then(|d| d.node_mut(&node_id)) {
                node.set_pos(new);
            }
            self.undo_stack
                .push("Move item", SceneCommand::MoveNode { node_id: node_id.clone(), old, new });
            moved.push(node_id);
        }
        if drag.in_macro {
            self.undo_stack.end_macro();
        }
        if !moved.is_empty() {
            debug!(count = moved.len(); "Items moved");
            self.events.push(SceneEvent::ItemsMoved(moved));
            self.save();
        }
    }

    /// Whether a press on a node is still waiting for its release.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Commits a drag whose release never arrived.
    fn finish_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            trace!(moved = drag.moved; "Finishing pending drag");
            self.commit_drag(drag);
        }
    }

    /// Puts dragged items back where the drag started and drops its macro.
    fn abandon_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        for (node_id, start) in &drag.start {
            if let Some(item) = self.nodes.get_mut(node_id) {
                item.set_pos(*start);
            }
        }
        for (node_id, _) in &drag.start {
            self.reroute_node(node_id);
        }
        if drag.in_macro {
            self.undo_stack.end_macro();
        }
        debug!(count = drag.start.len(); "Drag abandoned");
    }

    /// Double-click asks the view to edit the item under the pointer, or places a default
    /// item on empty canvas.
    pub fn mouse_double_click(&mut self, event: PointerEvent) {
        self.pointer = Some(event.pos);
        if event.button != PointerButton::Left || self.interaction != Interaction::Idle {
            return;
        }
        self.finish_drag();
        match self.item_at(event.pos) {
            Some(item) => self.events.push(SceneEvent::EditRequested(item)),
            None => {
                let kind = self.config.default_kind();
                if let Err(err) = self.place_item(event.pos, kind, "", None) {
                    warn!(error:% = err; "Cannot add item");
                }
            }
        }
    }

    // ---- Keyboard input ----

    pub fn key_press(&mut self, key: SceneKey) {
        match key {
            SceneKey::Escape => {
                if self.link_mode() {
                    self.end_link();
                } else if self.is_addition_mode() {
                    self.cancel_addition();
                } else {
                    self.clear_selection();
                }
            }
            SceneKey::Delete | SceneKey::Backspace => {
                self.remove_selected();
            }
            SceneKey::Copy => {
                self.copy();
            }
            SceneKey::Paste => {
                if let Err(err) = self.paste() {
                    warn!(error:% = err; "Paste failed");
                }
            }
            SceneKey::Undo => {
                self.undo();
            }
            SceneKey::Redo => {
                self.redo();
            }
        }
    }
}

// ---- Node factories ----

pub fn to_character_node(pos: Point) -> Node {
    placed_node(NodeKind::Character, pos)
}

pub fn to_icon_node(pos: Point) -> Node {
    placed_node(NodeKind::Icon, pos)
}

pub fn to_event_node(pos: Point, kind: NodeKind, subtype: impl Into<SmolStr>) -> Node {
    let mut node = placed_node(kind, pos);
    node.set_subtype(subtype);
    node
}

pub fn to_note_node(pos: Point) -> Node {
    placed_node(NodeKind::Note, pos)
}

pub fn to_image_node(pos: Point) -> Node {
    placed_node(NodeKind::Image, pos)
}

/// A new node whose body's top-left corner sits at `pos`.
fn placed_node(kind: NodeKind, pos: Point) -> Node {
    let offset = ItemShape::for_kind(kind).placement_offset();
    Node::new(kind, pos.offset(-offset, -offset))
}

fn node_for(kind: NodeKind, pos: Point, subtype: &str) -> Node {
    let mut node = match kind {
        NodeKind::Character => to_character_node(pos),
        NodeKind::Icon => to_icon_node(pos),
        NodeKind::Note => to_note_node(pos),
        NodeKind::Image => to_image_node(pos),
        other => to_event_node(pos, other, ""),
    };
    node.set_subtype(subtype);
    node
}

fn build_node_item<G: DiagramGateway>(gateway: &G, node: &Node) -> NodeItem {
    let image = match node.kind() {
        NodeKind::Image => gateway.load_image(node),
        _ => None,
    };
    NodeItem::new(node, node_label(gateway, node), image)
}

fn node_label<G: DiagramGateway>(gateway: &G, node: &Node) -> String {
    if node.kind() != NodeKind::Character {
        return NodeItem::text_label(node);
    }
    node.character_id()
        .and_then(|id| gateway.character(id))
        .map(|character| character.name)
        .unwrap_or_else(|| PLACEHOLDER_CHARACTER_NAME.to_owned())
}
