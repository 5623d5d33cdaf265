// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::model::{CharacterId, FontSettings, ImageRef, Node, NodeKind};

/// Snapshot of a node's appearance, used to stamp out copies.
///
/// Positions and ids are never captured; a pasted node is a new node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescriptor {
    kind: NodeKind,
    subtype: SmolStr,
    icon: Option<SmolStr>,
    color: SmolStr,
    extra: DescriptorExtra,
}

/// Kind-specific fields carried by an [`ItemDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorExtra {
    Character { character_id: Option<CharacterId>, size: u32 },
    Icon { size: u32 },
    Text { text: String, font: FontSettings },
    Note { text: String, height: u32, transparent: bool },
    Image { image_ref: Option<ImageRef>, size: u32 },
}

impl ItemDescriptor {
    pub fn capture(node: &Node) -> Self {
        let extra = match node.kind() {
            NodeKind::Character => DescriptorExtra::Character {
                character_id: node.character_id().cloned(),
                size: node.size(),
            },
            NodeKind::Icon => DescriptorExtra::Icon { size: node.size() },
            NodeKind::Note => DescriptorExtra::Note {
                text: node.text().to_owned(),
                height: node.height(),
                transparent: node.transparent(),
            },
            NodeKind::Image => {
                DescriptorExtra::Image { image_ref: node.image_ref().cloned(), size: node.size() }
            }
            _ => DescriptorExtra::Text { text: node.text().to_owned(), font: node.font() },
        };
        Self {
            kind: node.kind(),
            subtype: SmolStr::new(node.subtype()),
            icon: node.icon().map(SmolStr::new),
            color: SmolStr::new(node.color()),
            extra,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn extra(&self) -> &DescriptorExtra {
        &self.extra
    }

    /// The image this descriptor already points at, if any.
    pub fn image_ref(&self) -> Option<&ImageRef> {
        match &self.extra {
            DescriptorExtra::Image { image_ref, .. } => image_ref.as_ref(),
            _ => None,
        }
    }

    /// Re-applies every captured field onto `node`.
    pub fn apply_to(&self, node: &mut Node) {
        node.set_subtype(self.subtype.clone());
        node.set_icon(self.icon.clone());
        node.set_color(self.color.clone());
        match &self.extra {
            DescriptorExtra::Character { character_id, size } => {
                node.set_character_id(character_id.clone());
                node.set_size(*size);
            }
            DescriptorExtra::Icon { size } => node.set_size(*size),
            DescriptorExtra::Text { text, font } => {
                node.set_text(text.clone());
                node.set_font(*font);
            }
            DescriptorExtra::Note { text, height, transparent } => {
                node.set_text(text.clone());
                node.set_height(*height);
                node.set_transparent(*transparent);
            }
            DescriptorExtra::Image { image_ref, size } => {
                if image_ref.is_some() {
                    node.set_image_ref(image_ref.clone());
                }
                node.set_size(*size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ItemDescriptor;
    use crate::model::{CharacterId, FontSettings, Node, NodeKind, Point};

    #[test]
    fn text_descriptor_reapplies_font_and_style() {
        let mut source = Node::new(NodeKind::Setup, Point::ORIGIN);
        source.set_subtype("turn");
        source.set_text("Midpoint");
        source.set_color("#ff0000");
        source.set_icon(Some("mdi.star"));
        source.set_font(FontSettings { size: 16, bold: true, italic: false, underline: true });

        let descriptor = ItemDescriptor::capture(&source);
        let mut pasted = Node::new(NodeKind::Setup, Point::new(40.0, 40.0).expect("point"));
        descriptor.apply_to(&mut pasted);

        assert_eq!(pasted.subtype(), "turn");
        assert_eq!(pasted.text(), "Midpoint");
        assert_eq!(pasted.color(), "#ff0000");
        assert_eq!(pasted.icon(), Some("mdi.star"));
        assert_eq!(pasted.font(), source.font());
        assert_ne!(pasted.id(), source.id());
        assert_ne!(pasted.pos(), source.pos());
    }

    #[rstest]
    #[case(NodeKind::Character)]
    #[case(NodeKind::Icon)]
    #[case(NodeKind::Note)]
    #[case(NodeKind::Image)]
    #[case(NodeKind::Comment)]
    fn capture_then_apply_reproduces_appearance(#[case] kind: NodeKind) {
        let mut source = Node::new(kind, Point::ORIGIN);
        source.set_size(source.size() + 10);
        source.set_text("body");
        source.set_height(150);
        source.set_transparent(true);
        source.set_character_id(Some(CharacterId::new("c:ann").expect("character id")));

        let descriptor = ItemDescriptor::capture(&source);
        let mut pasted = Node::new(kind, Point::ORIGIN);
        descriptor.apply_to(&mut pasted);

        assert_eq!(ItemDescriptor::capture(&pasted), descriptor);
    }
}
