// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};

use crate::model::NodeKind;

/// Disables colors when set (see <https://no-color.org>).
const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    monochrome: bool,
}

impl TuiTheme {
    pub(crate) fn from_env() -> Self {
        let monochrome = env::var_os(NO_COLOR_ENV).is_some_and(|value| !value.is_empty());
        Self { monochrome }
    }

    fn color(&self, color: Color) -> Color {
        if self.monochrome {
            Color::Reset
        } else {
            color
        }
    }

    pub(crate) fn node_color(&self, kind: NodeKind, selected: bool) -> Color {
        if selected {
            return self.color(Color::Yellow);
        }
        self.color(match kind {
            NodeKind::Character => Color::LightCyan,
            NodeKind::Icon => Color::LightMagenta,
            NodeKind::Note => Color::LightYellow,
            NodeKind::Image => Color::LightBlue,
            NodeKind::Comment | NodeKind::Sticker => Color::Gray,
            _ => Color::LightGreen,
        })
    }

    pub(crate) fn connector_color(&self, selected: bool) -> Color {
        self.color(if selected { Color::Yellow } else { Color::White })
    }

    pub(crate) fn socket_color(&self) -> Color {
        self.color(Color::DarkGray)
    }

    pub(crate) fn placeholder_color(&self) -> Color {
        self.color(Color::LightRed)
    }

    pub(crate) fn border_style(&self, active_mode: bool) -> Style {
        if active_mode {
            Style::default().fg(self.color(Color::Yellow))
        } else {
            Style::default()
        }
    }

    pub(crate) fn footer_key_style(&self) -> Style {
        Style::default().fg(self.color(Color::Cyan)).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn footer_label_style(&self) -> Style {
        Style::default().fg(self.color(Color::Gray))
    }

    pub(crate) fn status_style(&self, error: bool) -> Style {
        if error {
            Style::default().fg(self.color(Color::Red))
        } else {
            Style::default().fg(self.color(Color::White))
        }
    }

    pub(crate) fn editor_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::TuiTheme;
    use crate::model::NodeKind;

    #[test]
    fn selection_overrides_kind_color() {
        let theme = TuiTheme::default();
        assert_eq!(theme.node_color(NodeKind::Character, true), Color::Yellow);
        assert_ne!(theme.node_color(NodeKind::Character, false), Color::Yellow);
    }

    #[test]
    fn monochrome_theme_resets_colors() {
        let theme = TuiTheme { monochrome: true };
        assert_eq!(theme.node_color(NodeKind::Event, false), Color::Reset);
        assert_eq!(theme.connector_color(true), Color::Reset);
    }
}
