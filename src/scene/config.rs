// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::node::DEFAULT_FONT_SIZE;
use crate::model::NodeKind;
use crate::undo::DEFAULT_UNDO_LIMIT;

/// Tunables of a [`super::NetworkScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    undo_limit: usize,
    default_kind: NodeKind,
    default_font_size: u32,
    link_tolerance: f64,
    connector_tolerance: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            default_kind: NodeKind::Event,
            default_font_size: DEFAULT_FONT_SIZE,
            link_tolerance: 8.0,
            connector_tolerance: 6.0,
        }
    }
}

impl SceneConfig {
    pub fn with_undo_limit(mut self, undo_limit: usize) -> Self {
        self.undo_limit = undo_limit;
        self
    }

    /// Kind placed by a double-click on empty canvas.
    pub fn with_default_kind(mut self, default_kind: NodeKind) -> Self {
        self.default_kind = default_kind;
        self
    }

    /// Font size given to new text-bearing nodes.
    pub fn with_default_font_size(mut self, default_font_size: u32) -> Self {
        self.default_font_size = default_font_size.max(1);
        self
    }

    /// How close (scene units) the pointer must be to a socket to hit it.
    pub fn with_link_tolerance(mut self, link_tolerance: f64) -> Self {
        if link_tolerance.is_finite() && link_tolerance >= 0.0 {
            self.link_tolerance = link_tolerance;
        }
        self
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    pub fn default_kind(&self) -> NodeKind {
        self.default_kind
    }

    pub fn default_font_size(&self) -> u32 {
        self.default_font_size
    }

    pub fn link_tolerance(&self) -> f64 {
        self.link_tolerance
    }

    pub fn connector_tolerance(&self) -> f64 {
        self.connector_tolerance
    }
}
