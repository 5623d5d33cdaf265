// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Graphical mirror of document elements.
//!
//! A [`NodeItem`] owns the geometry of one node and the sockets that connectors attach to;
//! a [`ConnectorItem`] owns the routed path between two sockets. Items never own model
//! data: the scene writes node changes into the document and refreshes the item from it.

use smallvec::SmallVec;

use crate::gateway::ImageData;
use crate::model::geometry::{angle_towards, distance_to_segment, normalize_angle, point_on_circle};
use crate::model::{ConnectorId, Node, NodeId, NodeKind, Point, Rect, Size};

pub const CHARACTER_MARGIN: f64 = 20.0;
pub const EVENT_MARGIN: f64 = 30.0;
pub const EVENT_PADDING: f64 = 20.0;
pub const ICON_MARGIN: f64 = 10.0;
pub const NOTE_MARGIN: f64 = 10.0;
pub const IMAGE_MARGIN: f64 = 10.0;

/// Angles of the eight sockets on rectangular items.
pub const FIXED_SOCKET_ANGLES: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, -135.0, -90.0, -45.0];

pub const PLACEHOLDER_CHARACTER_NAME: &str = "Character";
const EVENT_PLACEHOLDER_TEXT: &str = "New event";

const ANGLE_EPSILON: f64 = 1e-6;
const CHAR_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT_FACTOR: f64 = 1.4;
const PROXIMITY_HEIGHT: f64 = 5.0;
const PROXIMITY_WIDTH: f64 = 100.0;
const ROUTE_SAMPLES: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemShape {
    Character,
    Icon,
    Note,
    Image,
    Event,
}

impl ItemShape {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Character => Self::Character,
            NodeKind::Icon => Self::Icon,
            NodeKind::Note => Self::Note,
            NodeKind::Image => Self::Image,
            _ => Self::Event,
        }
    }

    pub fn margin(self) -> f64 {
        match self {
            Self::Character => CHARACTER_MARGIN,
            Self::Icon => ICON_MARGIN,
            Self::Note => NOTE_MARGIN,
            Self::Image => IMAGE_MARGIN,
            Self::Event => EVENT_MARGIN,
        }
    }

    /// Offset between a click position and the top-left corner of a new item's bounds.
    pub fn placement_offset(self) -> f64 {
        match self {
            Self::Event => EVENT_MARGIN + EVENT_PADDING,
            other => other.margin(),
        }
    }

    /// Circular items take sockets at any angle; rectangular items have eight fixed ones.
    pub fn is_radial(self) -> bool {
        matches!(self, Self::Character | Self::Icon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    angle: f64,
    connectors: SmallVec<[ConnectorId; 4]>,
}

impl Socket {
    fn new(angle: f64) -> Self {
        Self { angle, connectors: SmallVec::new() }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn connectors(&self) -> &[ConnectorId] {
        &self.connectors
    }
}

fn same_angle(a: f64, b: f64) -> bool {
    (normalize_angle(a) - normalize_angle(b)).abs() < ANGLE_EPSILON
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeItem {
    node_id: NodeId,
    kind: NodeKind,
    shape: ItemShape,
    pos: Point,
    extent: Size,
    label: String,
    image: Option<ImageData>,
    sockets: SmallVec<[Socket; 8]>,
    selected: bool,
}

impl NodeItem {
    pub fn new(node: &Node, label: impl Into<String>, image: Option<ImageData>) -> Self {
        let shape = ItemShape::for_kind(node.kind());
        let sockets = if shape.is_radial() {
            SmallVec::new()
        } else {
            FIXED_SOCKET_ANGLES.iter().copied().map(Socket::new).collect()
        };
        let mut item = Self {
            node_id: node.id().clone(),
            kind: node.kind(),
            shape,
            pos: node.pos(),
            extent: Size::default(),
            label: label.into(),
            image,
            sockets,
            selected: false,
        };
        item.refresh(node);
        item
    }

    /// Display label for a node of a text-bearing kind.
    pub fn text_label(node: &Node) -> String {
        match ItemShape::for_kind(node.kind()) {
            ItemShape::Icon => node.icon().unwrap_or_default().to_owned(),
            ItemShape::Image => String::new(),
            _ => node.text().to_owned(),
        }
    }

    /// Recomputes position and extent after the node changed.
    pub fn refresh(&mut self, node: &Node) {
        self.pos = node.pos();
        self.extent = match self.shape {
            ItemShape::Character | ItemShape::Icon | ItemShape::Image => {
                Size::square(f64::from(node.size()) + 2.0 * self.shape.margin())
            }
            ItemShape::Note => Size::new(
                f64::from(node.size()) + 2.0 * NOTE_MARGIN,
                f64::from(node.height()) + 2.0 * NOTE_MARGIN,
            ),
            ItemShape::Event => event_extent(node),
        };
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn shape(&self) -> ItemShape {
        self.shape
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Moves the item without touching its node; the scene commits positions on release.
    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.extent)
    }

    /// The drawn body, without the transparent margin that hosts the sockets.
    pub fn body(&self) -> Rect {
        let margin = self.shape.margin();
        Rect::new(
            self.pos.offset(margin, margin),
            Size::new(self.extent.width - 2.0 * margin, self.extent.height - 2.0 * margin),
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    fn socket_rect(&self) -> Rect {
        let inset = self.shape.margin() / 2.0;
        Rect::new(
            self.pos.offset(inset, inset),
            Size::new(self.extent.width - 2.0 * inset, self.extent.height - 2.0 * inset),
        )
    }

    fn socket_radius(&self) -> f64 {
        self.body().size().width / 2.0 + self.shape.margin() / 2.0
    }

    /// Scene position of the socket at `angle`.
    pub fn socket_position(&self, angle: f64) -> Point {
        if self.shape.is_radial() {
            point_on_circle(self.center(), self.socket_radius(), angle)
        } else {
            self.socket_rect().anchor_at(angle)
        }
    }

    pub fn sockets(&self) -> &[Socket] {
        &self.sockets
    }

    pub fn socket(&self, angle: f64) -> Option<&Socket> {
        self.sockets.iter().find(|s| same_angle(s.angle, angle))
    }

    /// Whether a connector may attach at `angle`.
    pub fn accepts_angle(&self, angle: f64) -> bool {
        angle.is_finite() && (self.shape.is_radial() || self.socket(angle).is_some())
    }

    /// Attaches a connector; returns `false` when the item has no socket at `angle`.
    pub fn attach(&mut self, angle: f64, connector_id: ConnectorId) -> bool {
        if !self.accepts_angle(angle) {
            return false;
        }
        if self.socket(angle).is_none() {
            self.sockets.push(Socket::new(normalize_angle(angle)));
        }
        let Some(socket) = self.sockets.iter_mut().find(|s| same_angle(s.angle, angle)) else {
            return false;
        };
        if !socket.connectors.contains(&connector_id) {
            socket.connectors.push(connector_id);
        }
        true
    }

    /// Detaches a connector from whichever socket holds it. Radial items drop sockets that
    /// become empty.
    pub fn detach(&mut self, connector_id: &ConnectorId) -> bool {
        let mut found = false;
        for socket in &mut self.sockets {
            let before = socket.connectors.len();
            socket.connectors.retain(|id| id != connector_id);
            found |= socket.connectors.len() != before;
        }
        if self.shape.is_radial() {
            self.sockets.retain(|s| !s.connectors.is_empty());
        }
        found
    }

    /// Every connector attached to any socket, in socket order.
    pub fn connectors(&self) -> impl Iterator<Item = &ConnectorId> {
        self.sockets.iter().flat_map(|s| s.connectors.iter())
    }

    /// The socket angle under `point`, if any.
    ///
    /// Rectangular items match their fixed sockets; circular items match anywhere on the
    /// socket ring.
    pub fn socket_at(&self, point: Point, tolerance: f64) -> Option<f64> {
        if self.shape.is_radial() {
            let center = self.center();
            let ring_distance = (point.distance_to(center) - self.socket_radius()).abs();
            return (ring_distance <= tolerance).then(|| angle_towards(center, point));
        }
        FIXED_SOCKET_ANGLES
            .iter()
            .copied()
            .map(|angle| (angle, self.socket_position(angle).distance_to(point)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(angle, _)| angle)
    }
}

fn event_extent(node: &Node) -> Size {
    let font_size = f64::from(node.size().max(1));
    let text = if node.text().is_empty() { EVENT_PLACEHOLDER_TEXT } else { node.text() };
    let longest_line = text.lines().map(|line| line.chars().count()).max().unwrap_or(0).max(1);
    let line_count = text.lines().count().max(1);

    let text_width = longest_line as f64 * font_size * CHAR_WIDTH_FACTOR;
    let text_height = line_count as f64 * font_size * LINE_HEIGHT_FACTOR;
    let icon_size = if node.icon().is_some() { (text_height * 1.25).floor() } else { 0.0 };

    Size::new(
        text_width + icon_size + 2.0 * EVENT_MARGIN + 2.0 * EVENT_PADDING,
        text_height + 2.0 * EVENT_MARGIN + 2.0 * EVENT_PADDING,
    )
}

/// Path of a connector: a line, or a quadratic curve through `control`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    start: Point,
    end: Point,
    control: Option<Point>,
}

impl Route {
    /// Routes between two socket positions.
    ///
    /// Connectors whose endpoints share the top or bottom arc bow outward through a control
    /// point above or below both ends. Others curve unless the endpoints are nearly level or
    /// close horizontally, in which case they are straight.
    pub fn between(start: Point, end: Point, source_angle: f64, cp_controlled: bool) -> Self {
        let width = end.x() - start.x();
        let height = end.y() - start.y();

        let control = if cp_controlled {
            let bow = (width.abs() / 2.0).clamp(40.0, 200.0);
            let y = if source_angle > 0.0 {
                start.y().min(end.y()) - bow
            } else {
                start.y().max(end.y()) + bow
            };
            Some(Point::finite_or_origin(start.x() + width / 2.0, y))
        } else if height.abs() < PROXIMITY_HEIGHT || width.abs() < PROXIMITY_WIDTH {
            None
        } else if source_angle >= 0.0 {
            Some(start.offset(0.0, height / 2.0))
        } else {
            Some(start.offset(width / 2.0, -height / 2.0))
        };

        Self { start, end, control }
    }

    pub fn line(start: Point, end: Point) -> Self {
        Self { start, end, control: None }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn control(&self) -> Option<Point> {
        self.control
    }

    pub fn is_linear(&self) -> bool {
        self.control.is_none()
    }

    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        match self.control {
            None => Point::finite_or_origin(
                self.start.x() + (self.end.x() - self.start.x()) * t,
                self.start.y() + (self.end.y() - self.start.y()) * t,
            ),
            Some(c) => {
                let u = 1.0 - t;
                Point::finite_or_origin(
                    u * u * self.start.x() + 2.0 * u * t * c.x() + t * t * self.end.x(),
                    u * u * self.start.y() + 2.0 * u * t * c.y() + t * t * self.end.y(),
                )
            }
        }
    }

    /// Where a connector badge (icon or text) is drawn.
    pub fn badge_anchor(&self) -> Point {
        self.point_at(if self.is_linear() { 0.4 } else { 0.6 })
    }

    pub fn distance_to(&self, point: Point) -> f64 {
        if self.control.is_none() {
            return distance_to_segment(point, self.start, self.end);
        }
        let mut best = f64::INFINITY;
        let mut previous = self.start;
        for step in 1..=ROUTE_SAMPLES {
            let next = self.point_at(step as f64 / ROUTE_SAMPLES as f64);
            best = best.min(distance_to_segment(point, previous, next));
            previous = next;
        }
        best
    }
}

/// Address of a socket: the node plus the socket angle.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketRef {
    node_id: NodeId,
    angle: f64,
}

impl SocketRef {
    /// The angle is normalised to `(-180, 180]`.
    pub fn new(node_id: NodeId, angle: f64) -> Self {
        Self { node_id, angle: normalize_angle(angle) }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorItem {
    connector_id: ConnectorId,
    source: SocketRef,
    target: SocketRef,
    cp_controlled: bool,
    route: Route,
    selected: bool,
}

impl ConnectorItem {
    pub fn new(
        connector_id: ConnectorId,
        source: SocketRef,
        target: SocketRef,
        cp_controlled: bool,
        route: Route,
    ) -> Self {
        Self { connector_id, source, target, cp_controlled, route, selected: false }
    }

    pub fn connector_id(&self) -> &ConnectorId {
        &self.connector_id
    }

    pub fn source(&self) -> &SocketRef {
        &self.source
    }

    pub fn target(&self) -> &SocketRef {
        &self.target
    }

    pub fn cp_controlled(&self) -> bool {
        self.cp_controlled
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn set_route(&mut self, route: Route) {
        self.route = route;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source.node_id == node_id || &self.target.node_id == node_id
    }
}
