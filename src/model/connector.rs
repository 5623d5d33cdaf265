// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::geometry::normalize_angle;
use super::ids::{ConnectorId, NodeId};
use super::node::DEFAULT_COLOR;

pub const DEFAULT_CONNECTOR_WIDTH: u32 = 2;

const TOP_ARC: (f64, f64) = (45.0, 135.0);
const BOTTOM_ARC: (f64, f64) = (-135.0, -45.0);

/// Whether a connector between sockets at these angles bows outward through control points.
///
/// True when both endpoints sit on the top arc `[45, 135]` or both sit on the bottom arc
/// `[-135, -45]`, so top-to-top and bottom-to-bottom links arc around the diagram instead of
/// cutting straight through it.
pub fn cp_controlled(source_angle: f64, target_angle: f64) -> bool {
    let within = |angle: f64, (lo, hi): (f64, f64)| {
        let angle = normalize_angle(angle);
        angle >= lo && angle <= hi
    };
    (within(source_angle, TOP_ARC) && within(target_angle, TOP_ARC))
        || (within(source_angle, BOTTOM_ARC) && within(target_angle, BOTTOM_ARC))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
}

/// Visual attributes of a connector that can be edited after linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorStyle {
    pub pen: PenStyle,
    pub width: u32,
    pub color: SmolStr,
    pub icon: Option<SmolStr>,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            pen: PenStyle::Solid,
            width: DEFAULT_CONNECTOR_WIDTH,
            color: SmolStr::new_static(DEFAULT_COLOR),
            icon: None,
        }
    }
}

/// An edge between two node sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default = "ConnectorId::generate")]
    id: ConnectorId,
    source_id: NodeId,
    target_id: NodeId,
    source_angle: f64,
    target_angle: f64,
    #[serde(default)]
    cp_controlled: bool,
    #[serde(default, rename = "pen_style")]
    pen: PenStyle,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_color")]
    color: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
}

impl Connector {
    pub fn new(source_id: NodeId, target_id: NodeId, source_angle: f64, target_angle: f64) -> Self {
        Self::with_id(ConnectorId::generate(), source_id, target_id, source_angle, target_angle)
    }

    pub fn with_id(
        id: ConnectorId,
        source_id: NodeId,
        target_id: NodeId,
        source_angle: f64,
        target_angle: f64,
    ) -> Self {
        let style = ConnectorStyle::default();
        Self {
            id,
            source_id,
            target_id,
            source_angle,
            target_angle,
            cp_controlled: cp_controlled(source_angle, target_angle),
            pen: style.pen,
            width: style.width,
            color: style.color,
            icon: style.icon,
            text: String::new(),
        }
    }

    pub fn id(&self) -> &ConnectorId {
        &self.id
    }

    pub fn source_id(&self) -> &NodeId {
        &self.source_id
    }

    pub fn target_id(&self) -> &NodeId {
        &self.target_id
    }

    pub fn source_angle(&self) -> f64 {
        self.source_angle
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    pub fn cp_controlled(&self) -> bool {
        self.cp_controlled
    }

    /// Recomputes the derived `cp_controlled` flag from the endpoint angles.
    pub fn refresh_cp_controlled(&mut self) {
        self.cp_controlled = cp_controlled(self.source_angle, self.target_angle);
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_id == node_id || &self.target_id == node_id
    }

    pub fn style(&self) -> ConnectorStyle {
        ConnectorStyle {
            pen: self.pen,
            width: self.width,
            color: self.color.clone(),
            icon: self.icon.clone(),
        }
    }

    pub fn set_style(&mut self, style: ConnectorStyle) {
        self.pen = style.pen;
        self.width = style.width;
        self.color = style.color;
        self.icon = style.icon;
    }

    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

fn default_width() -> u32 {
    DEFAULT_CONNECTOR_WIDTH
}

fn default_color() -> SmolStr {
    SmolStr::new_static(DEFAULT_COLOR)
}
