// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Plotnet: a graph-editing engine for story diagrams.
//!
//! The [`scene::NetworkScene`] is the editing surface: nodes and connectors mirrored from a
//! [`model::DiagramDocument`], addition and link interaction modes, copy/paste, cascade
//! removal and undo/redo. Persistence goes through [`gateway::DiagramGateway`]; the
//! [`store`] module provides a folder-backed implementation and [`tui`] a terminal editor.

pub mod gateway;
pub mod model;
pub mod scene;
pub mod store;
pub mod tui;
pub mod undo;
