// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence gateway.
//!
//! The scene never touches storage itself. It calls into a [`DiagramGateway`] to fill a
//! not-yet-loaded document, to persist after every structural mutation, and to resolve
//! images and character references.

use std::collections::{BTreeMap, VecDeque};

use smol_str::SmolStr;

use crate::model::{CharacterId, DiagramDocument, ImageId, ImageRef, Node};

/// Raw image content resolved for an image node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub media_type: SmolStr,
    pub bytes: Vec<u8>,
}

/// Display data for a character referenced by a character node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
}

pub trait DiagramGateway {
    /// Populates a document that has not been loaded yet (or leaves it empty).
    fn load(&mut self, document: &mut DiagramDocument);

    /// Persists the current document state. Failures are the gateway's to handle.
    fn save(&mut self, document: &DiagramDocument);

    /// Asks the environment for a new image; `None` means the user picked nothing.
    fn upload_image(&mut self) -> Option<ImageRef> {
        None
    }

    fn load_image(&self, _node: &Node) -> Option<ImageData> {
        None
    }

    fn character(&self, _character_id: &CharacterId) -> Option<Character> {
        None
    }
}

/// Gateway that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGateway;

impl DiagramGateway for NullGateway {
    fn load(&mut self, _document: &mut DiagramDocument) {}

    fn save(&mut self, _document: &DiagramDocument) {}
}

/// In-memory gateway that keeps the last saved snapshot.
///
/// Useful for previews and tests: it counts saves, can seed default content on load, and
/// serves queued images and known characters.
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    defaults: Option<DiagramDocument>,
    saved: Option<DiagramDocument>,
    save_count: usize,
    load_count: usize,
    pending_uploads: VecDeque<(ImageId, ImageData)>,
    images: BTreeMap<ImageId, ImageData>,
    characters: BTreeMap<CharacterId, Character>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content copied into documents passed to [`DiagramGateway::load`].
    pub fn with_defaults(mut self, defaults: DiagramDocument) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_character(mut self, id: CharacterId, name: impl Into<String>) -> Self {
        self.characters.insert(id.clone(), Character { id, name: name.into() });
        self
    }

    /// Queues an image returned by the next [`DiagramGateway::upload_image`] call.
    pub fn queue_upload(&mut self, image_id: ImageId, data: ImageData) {
        self.pending_uploads.push_back((image_id, data));
    }

    pub fn saved(&self) -> Option<&DiagramDocument> {
        self.saved.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn load_count(&self) -> usize {
        self.load_count
    }
}

impl DiagramGateway for MemoryGateway {
    fn load(&mut self, document: &mut DiagramDocument) {
        self.load_count += 1;
        let Some(defaults) = &self.defaults else {
            return;
        };
        document.nodes_mut().extend(defaults.nodes().iter().cloned());
        document.connectors_mut().extend(defaults.connectors().iter().cloned());
    }

    fn save(&mut self, document: &DiagramDocument) {
        self.save_count += 1;
        self.saved = Some(document.clone());
    }

    fn upload_image(&mut self) -> Option<ImageRef> {
        let (image_id, data) = self.pending_uploads.pop_front()?;
        self.images.insert(image_id.clone(), data);
        Some(ImageRef { image_id })
    }

    fn load_image(&self, node: &Node) -> Option<ImageData> {
        let image_ref = node.image_ref()?;
        self.images.get(&image_ref.image_id).cloned()
    }

    fn character(&self, character_id: &CharacterId) -> Option<Character> {
        self.characters.get(character_id).cloned()
    }
}
