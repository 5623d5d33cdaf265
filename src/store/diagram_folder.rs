// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::ImageData;
use crate::model::{DiagramDocument, DiagramId, ImageId};

const DIAGRAM_SUFFIX: &str = ".diagram.json";
const IMAGE_SUFFIX: &str = ".image.json";
const IMAGES_DIR: &str = "images";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("invalid image payload at {path:?}: {source}")]
    ImagePayload { path: PathBuf, source: base64::DecodeError },
    #[error("document at {path:?} has id {found}, expected {expected}")]
    IdMismatch { path: PathBuf, expected: DiagramId, found: DiagramId },
    #[error("refusing to write through symlink {path:?}")]
    SymlinkRefused { path: PathBuf },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync.
    #[default]
    BestEffort,

    /// Also fsyncs the written file and its directory where the platform allows it.
    Durable,
}

/// On-disk shape of an image sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub media_type: String,
    pub data: String,
}

/// A folder of diagram documents and their uploaded images.
#[derive(Debug, Clone)]
pub struct DiagramFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl DiagramFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, diagram_id: &DiagramId) -> PathBuf {
        self.root.join(format!("{}{DIAGRAM_SUFFIX}", file_stem_for(diagram_id.as_str())))
    }

    pub fn image_path(&self, image_id: &ImageId) -> PathBuf {
        self.root.join(IMAGES_DIR).join(format!("{}{IMAGE_SUFFIX}", file_stem_for(image_id.as_str())))
    }

    /// Reads a stored document, `Ok(None)` when there is none.
    ///
    /// Documents coming back from disk are always marked loaded.
    pub fn load_document(
        &self,
        diagram_id: &DiagramId,
    ) -> Result<Option<DiagramDocument>, StoreError> {
        let path = self.document_path(diagram_id);
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        let mut document: DiagramDocument = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        if document.id() != diagram_id {
            return Err(StoreError::IdMismatch {
                path,
                expected: diagram_id.clone(),
                found: document.id().clone(),
            });
        }
        document.set_loaded(true);
        Ok(Some(document))
    }

    pub fn save_document(&self, document: &DiagramDocument) -> Result<(), StoreError> {
        let path = self.document_path(document.id());
        let mut json = serde_json::to_string_pretty(document)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        json.push('\n');
        write_atomic(&self.root, &path, json.as_bytes(), self.durability)
    }

    /// Ids of every stored document, sorted. A missing root folder is an empty store.
    pub fn list_documents(&self) -> Result<Vec<DiagramId>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: self.root.clone(), source }),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|name| name.strip_suffix(DIAGRAM_SUFFIX)) else {
                continue;
            };
            let Some(id) = id_from_file_stem(stem).and_then(|raw| DiagramId::new(raw).ok()) else {
                continue;
            };
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }

    /// Deletes a stored document; returns whether a file was removed.
    pub fn remove_document(&self, diagram_id: &DiagramId) -> Result<bool, StoreError> {
        let path = self.document_path(diagram_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    pub fn save_image(&self, image_id: &ImageId, image: &ImageData) -> Result<(), StoreError> {
        let path = self.image_path(image_id);
        let stored = StoredImage {
            media_type: image.media_type.to_string(),
            data: BASE64.encode(&image.bytes),
        };
        let json = serde_json::to_string(&stored)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        write_atomic(&self.root, &path, json.as_bytes(), self.durability)
    }

    pub fn load_image(&self, image_id: &ImageId) -> Result<Option<ImageData>, StoreError> {
        let path = self.image_path(image_id);
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        let stored: StoredImage = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        let bytes = BASE64
            .decode(stored.data.as_bytes())
            .map_err(|source| StoreError::ImagePayload { path, source })?;
        Ok(Some(ImageData { media_type: stored.media_type.into(), bytes }))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
}

/// Ids are used as file stems. Anything outside a conservative portable set is hex-encoded
/// behind a `~` prefix so that ids such as `d:story` survive on every filesystem.
fn file_stem_for(id: &str) -> String {
    let portable = !id.starts_with('~')
        && !id.starts_with('.')
        && !id.ends_with('.')
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if portable {
        return id.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + id.len() * 2);
    out.push('~');
    for &b in id.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn id_from_file_stem(stem: &str) -> Option<String> {
    let Some(hex) = stem.strip_prefix('~') else {
        return Some(stem.to_owned());
    };
    if hex.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let parent = path.parent().unwrap_or(root);
    fs::create_dir_all(parent)
        .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    }

    let file_name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(".plotnet.tmp.{file_name}.{nanos}"));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    file.write_all(contents).map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    }
    drop(file);

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
            dir.sync_all()
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
    }

    Ok(())
}
