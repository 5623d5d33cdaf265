// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{DiagramFolder, StoreError};
use crate::gateway::{Character, DiagramGateway, ImageData};
use crate::model::{CharacterId, DiagramDocument, ImageId, ImageRef, Node};

/// [`DiagramGateway`] backed by a [`DiagramFolder`].
///
/// Persistence failures never reach the scene. They are logged and kept in
/// [`FolderGateway::last_error`] for the embedder to surface.
#[derive(Debug)]
pub struct FolderGateway {
    folder: DiagramFolder,
    uploads: VecDeque<PathBuf>,
    characters: BTreeMap<CharacterId, Character>,
    last_error: Option<StoreError>,
}

impl FolderGateway {
    pub fn new(folder: DiagramFolder) -> Self {
        Self {
            folder,
            uploads: VecDeque::new(),
            characters: BTreeMap::new(),
            last_error: None,
        }
    }

    pub fn folder(&self) -> &DiagramFolder {
        &self.folder
    }

    /// Queues a file handed out by the next [`DiagramGateway::upload_image`] call.
    pub fn queue_upload(&mut self, path: impl Into<PathBuf>) {
        self.uploads.push_back(path.into());
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    pub fn register_character(&mut self, id: CharacterId, name: impl Into<String>) {
        self.characters.insert(id.clone(), Character { id, name: name.into() });
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<StoreError> {
        self.last_error.take()
    }

    fn record(&mut self, err: StoreError) {
        warn!(root:? = self.folder.root(), error:% = err; "Diagram store failure");
        self.last_error = Some(err);
    }

    fn import_image(&self, path: &Path) -> Result<ImageRef, StoreError> {
        let bytes =
            fs::read(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let image_id = ImageId::generate();
        let data = ImageData { media_type: media_type_for(path).into(), bytes };
        self.folder.save_image(&image_id, &data)?;
        Ok(ImageRef { image_id })
    }
}

impl DiagramGateway for FolderGateway {
    fn load(&mut self, document: &mut DiagramDocument) {
        match self.folder.load_document(document.id()) {
            Ok(Some(stored)) => {
                debug!(
                    diagram_id = document.id().as_str(),
                    nodes = stored.nodes().len(),
                    connectors = stored.connectors().len();
                    "Loaded stored diagram"
                );
                if !stored.name().is_empty() {
                    document.set_name(stored.name());
                }
                document.nodes_mut().extend(stored.nodes().iter().cloned());
                document.connectors_mut().extend(stored.connectors().iter().cloned());
            }
            Ok(None) => debug!(diagram_id = document.id().as_str(); "No stored diagram"),
            Err(err) => self.record(err),
        }
    }

    fn save(&mut self, document: &DiagramDocument) {
        if let Err(err) = self.folder.save_document(document) {
            self.record(err);
        }
    }

    fn upload_image(&mut self) -> Option<ImageRef> {
        let path = self.uploads.pop_front()?;
        match self.import_image(&path) {
            Ok(image_ref) => {
                debug!(path:? = path, image_id = image_ref.image_id.as_str(); "Image uploaded");
                Some(image_ref)
            }
            Err(err) => {
                self.record(err);
                None
            }
        }
    }

    fn load_image(&self, node: &Node) -> Option<ImageData> {
        let image_ref = node.image_ref()?;
        match self.folder.load_image(&image_ref.image_id) {
            Ok(data) => data,
            Err(err) => {
                warn!(image_id = image_ref.image_id.as_str(), error:% = err; "Unreadable image");
                None
            }
        }
    }

    fn character(&self, character_id: &CharacterId) -> Option<Character> {
        self.characters.get(character_id).cloned()
    }
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::media_type_for;

    #[rstest]
    #[case("cover.png", "image/png")]
    #[case("portrait.JPG", "image/jpeg")]
    #[case("map.svg", "image/svg+xml")]
    #[case("notes", "application/octet-stream")]
    fn media_type_follows_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(media_type_for(Path::new(name)), expected);
    }
}
