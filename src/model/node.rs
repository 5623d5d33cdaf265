// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

use super::geometry::Point;
use super::ids::{CharacterId, ImageId, NodeId};

pub const DEFAULT_FONT_SIZE: u32 = 12;
pub const DEFAULT_CHARACTER_SIZE: u32 = 68;
pub const DEFAULT_ICON_SIZE: u32 = 48;
pub const DEFAULT_IMAGE_SIZE: u32 = 168;
pub const DEFAULT_NOTE_WIDTH: u32 = 200;
pub const DEFAULT_NOTE_HEIGHT: u32 = 100;
pub const DEFAULT_COLOR: &str = "black";

/// Type tag of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Character,
    Event,
    Setup,
    Comment,
    Sticker,
    Text,
    Icon,
    Note,
    Image,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Character,
        NodeKind::Event,
        NodeKind::Setup,
        NodeKind::Comment,
        NodeKind::Sticker,
        NodeKind::Text,
        NodeKind::Icon,
        NodeKind::Note,
        NodeKind::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Event => "event",
            Self::Setup => "setup",
            Self::Comment => "comment",
            Self::Sticker => "sticker",
            Self::Text => "text",
            Self::Icon => "icon",
            Self::Note => "note",
            Self::Image => "image",
        }
    }

    /// Kinds rendered as a generic text box (label plus font attributes).
    pub fn is_text_item(self) -> bool {
        matches!(self, Self::Event | Self::Setup | Self::Comment | Self::Sticker | Self::Text)
    }

    fn default_size(self) -> u32 {
        match self {
            Self::Character => DEFAULT_CHARACTER_SIZE,
            Self::Icon => DEFAULT_ICON_SIZE,
            Self::Image => DEFAULT_IMAGE_SIZE,
            Self::Note => DEFAULT_NOTE_WIDTH,
            _ => DEFAULT_FONT_SIZE,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

/// Reference to an image stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub image_id: ImageId,
}

/// A positioned, typed diagram vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "SmolStr::is_empty")]
    subtype: SmolStr,
    #[serde(deserialize_with = "finite_coordinate")]
    x: f64,
    #[serde(deserialize_with = "finite_coordinate")]
    y: f64,
    size: u32,
    #[serde(default, skip_serializing_if = "SmolStr::is_empty")]
    icon: SmolStr,
    #[serde(default = "default_color")]
    color: SmolStr,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    underline: bool,
    #[serde(default = "default_note_height")]
    height: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    transparent: bool,
    #[serde(default, rename = "character_ref", skip_serializing_if = "Option::is_none")]
    character_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_ref: Option<ImageRef>,
}

impl Node {
    pub fn new(kind: NodeKind, pos: Point) -> Self {
        Self::with_id(NodeId::generate(), kind, pos)
    }

    pub fn with_id(id: NodeId, kind: NodeKind, pos: Point) -> Self {
        Self {
            id,
            kind,
            subtype: SmolStr::default(),
            x: pos.x(),
            y: pos.y(),
            size: kind.default_size(),
            icon: SmolStr::default(),
            color: default_color(),
            text: String::new(),
            bold: false,
            italic: false,
            underline: false,
            height: DEFAULT_NOTE_HEIGHT,
            transparent: false,
            character_id: None,
            image_ref: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn set_subtype(&mut self, subtype: impl Into<SmolStr>) {
        self.subtype = subtype.into();
    }

    pub fn pos(&self) -> Point {
        Point::finite_or_origin(self.x, self.y)
    }

    pub fn set_pos(&mut self, pos: Point) {
        self.x = pos.x();
        self.y = pos.y();
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    pub fn icon(&self) -> Option<&str> {
        (!self.icon.is_empty()).then_some(self.icon.as_str())
    }

    pub fn set_icon<T: Into<SmolStr>>(&mut self, icon: Option<T>) {
        self.icon = icon.map(Into::into).unwrap_or_default();
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<SmolStr>) {
        self.color = color.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn underline(&self) -> bool {
        self.underline
    }

    pub fn font(&self) -> FontSettings {
        FontSettings {
            size: self.size,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }

    pub fn set_font(&mut self, font: FontSettings) {
        self.size = font.size;
        self.bold = font.bold;
        self.italic = font.italic;
        self.underline = font.underline;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn character_id(&self) -> Option<&CharacterId> {
        self.character_id.as_ref()
    }

    pub fn set_character_id(&mut self, character_id: Option<CharacterId>) {
        self.character_id = character_id;
    }

    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.image_ref.as_ref()
    }

    pub fn set_image_ref(&mut self, image_ref: Option<ImageRef>) {
        self.image_ref = image_ref;
    }
}

/// Font attributes of text-bearing nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSettings {
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self { size: DEFAULT_FONT_SIZE, bold: false, italic: false, underline: false }
    }
}

fn default_color() -> SmolStr {
    SmolStr::new_static(DEFAULT_COLOR)
}

fn default_note_height() -> u32 {
    DEFAULT_NOTE_HEIGHT
}

fn is_false(value: &bool) -> bool {
    !*value
}

// serde_json writes non-finite floats as `null`; read those back as the origin.
fn finite_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|value| value.is_finite()).unwrap_or(0.0))
}
