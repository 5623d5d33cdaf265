// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undo/redo history.
//!
//! The stack only records commands; the scene applies them. Every entry is a labelled list
//! of commands that were applied in order, so undo replays their inverses back to front.
//! Macros group several pushes into a single entry.

mod command;

pub use command::{MergeKind, NodeChange, SceneCommand};

pub const DEFAULT_UNDO_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    text: String,
    commands: Vec<SceneCommand>,
}

impl UndoEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn commands(&self) -> &[SceneCommand] {
        &self.commands
    }
}

#[derive(Debug, Clone)]
struct OpenMacro {
    text: String,
    commands: Vec<SceneCommand>,
    depth: usize,
}

#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: Vec<UndoEntry>,
    index: usize,
    clean_index: Option<usize>,
    limit: usize,
    open_macro: Option<OpenMacro>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoStack {
    /// A stack holding at most `limit` entries (`0` means unlimited).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            clean_index: Some(0),
            limit,
            open_macro: None,
        }
    }

    /// Records an already-applied command.
    ///
    /// Inside a macro the command joins the macro. Otherwise the redo tail is discarded and
    /// the command either merges into the top entry or becomes a new entry.
    pub fn push(&mut self, text: impl Into<String>, command: SceneCommand) {
        if let Some(open) = self.open_macro.as_mut() {
            open.commands.push(command);
            return;
        }

        self.discard_redo_tail();
        if self.try_merge_into_top(&command) {
            return;
        }
        self.push_entry(UndoEntry { text: text.into(), commands: vec![command] });
    }

    pub fn begin_macro(&mut self, text: impl Into<String>) {
        match self.open_macro.as_mut() {
            Some(open) => open.depth += 1,
            None => {
                self.open_macro =
                    Some(OpenMacro { text: text.into(), commands: Vec::new(), depth: 1 });
            }
        }
    }

    /// Closes the innermost macro. The outermost close turns the collected commands into a
    /// single entry; a macro without commands leaves no trace.
    pub fn end_macro(&mut self) {
        let Some(open) = self.open_macro.as_mut() else {
            log::warn!("end_macro without a matching begin_macro");
            return;
        };
        open.depth -= 1;
        if open.depth > 0 {
            return;
        }
        let Some(open) = self.open_macro.take() else {
            return;
        };
        if open.commands.is_empty() {
            return;
        }
        self.discard_redo_tail();
        self.push_entry(UndoEntry { text: open.text, commands: open.commands });
    }

    pub fn is_in_macro(&self) -> bool {
        self.open_macro.is_some()
    }

    /// Moves one entry back and returns it for the caller to revert.
    pub fn step_back(&mut self) -> Option<UndoEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).cloned()
    }

    /// Moves one entry forward and returns it for the caller to re-apply.
    pub fn step_forward(&mut self) -> Option<UndoEntry> {
        if !self.can_redo() {
            return None;
        }
        let entry = self.entries.get(self.index).cloned();
        self.index += 1;
        entry
    }

    pub fn can_undo(&self) -> bool {
        self.open_macro.is_none() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.open_macro.is_none() && self.index < self.entries.len()
    }

    pub fn undo_text(&self) -> Option<&str> {
        let index = self.index.checked_sub(1)?;
        self.entries.get(index).map(UndoEntry::text)
    }

    pub fn redo_text(&self) -> Option<&str> {
        self.entries.get(self.index).map(UndoEntry::text)
    }

    /// Number of entries currently applied.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.clean_index = Some(0);
        self.open_macro = None;
    }

    pub fn undo_limit(&self) -> usize {
        self.limit
    }

    pub fn set_undo_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.index);
    }

    pub fn is_clean(&self) -> bool {
        self.open_macro.is_none() && self.clean_index == Some(self.index)
    }

    fn discard_redo_tail(&mut self) {
        if self.index >= self.entries.len() {
            return;
        }
        self.entries.truncate(self.index);
        if self.clean_index.is_some_and(|clean| clean > self.index) {
            self.clean_index = None;
        }
    }

    fn try_merge_into_top(&mut self, command: &SceneCommand) -> bool {
        if command.merge_kind().is_none() || self.clean_index == Some(self.index) {
            return false;
        }
        let Some(top) = self.index.checked_sub(1).and_then(|i| self.entries.get_mut(i)) else {
            return false;
        };
        match top.commands.as_mut_slice() {
            [only] => only.try_merge(command),
            _ => false,
        }
    }

    fn push_entry(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
        self.index = self.entries.len();
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.limit == 0 || self.entries.len() <= self.limit {
            return;
        }
        let excess = self.entries.len() - self.limit;
        self.entries.drain(..excess);
        self.index = self.index.saturating_sub(excess);
        self.clean_index = self.clean_index.and_then(|clean| clean.checked_sub(excess));
    }
}

#[cfg(test)]
mod tests;
