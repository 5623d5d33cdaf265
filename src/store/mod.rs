// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for diagrams on disk.
//!
//! [`DiagramFolder`] owns the folder format (one JSON file per document plus an `images/`
//! directory of image sidecars). [`FolderGateway`] plugs a folder into a scene as its
//! [`crate::gateway::DiagramGateway`].

pub mod diagram_folder;
mod folder_gateway;

pub use diagram_folder::{DiagramFolder, StoreError, StoredImage, WriteDurability};
pub use folder_gateway::FolderGateway;
