// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A [`DiagramDocument`] holds the persisted graph: typed, positioned nodes and the
//! connectors linking their sockets.

pub mod connector;
pub mod document;
pub(crate) mod fixtures;
pub mod geometry;
pub mod ids;
pub mod node;

pub use connector::{cp_controlled, Connector, ConnectorStyle, PenStyle};
pub use document::{DiagramDocument, DiagramKind};
pub use geometry::{Point, PointError, Rect, Size};
pub use ids::{CharacterId, ConnectorId, DiagramId, Id, IdError, ImageId, NodeId};
pub use node::{FontSettings, ImageRef, Node, NodeKind, UnknownNodeKind};
