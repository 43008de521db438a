//! Undo/redo manager

use crate::{EditError, ReplaceStep, Result, Selection};
use std::collections::VecDeque;

/// Default cap on undo entries
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// One committed transaction
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Steps in application order (replayed for redo)
    pub steps: Vec<ReplaceStep>,
    /// Inverse steps in application order (replayed in reverse for undo)
    pub inverses: Vec<ReplaceStep>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

/// Manages undo and redo stacks
#[derive(Debug)]
pub struct UndoManager {
    /// Entries that can be undone, oldest first
    undo_stack: VecDeque<HistoryEntry>,
    /// Entries that can be redone
    redo_stack: Vec<HistoryEntry>,
    /// Maximum number of undo entries
    max_entries: usize,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_ENTRIES)
    }

    /// Create with a custom cap; the oldest entries are dropped beyond it
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a committed transaction
    pub fn push(&mut self, entry: HistoryEntry) {
        // A new edit invalidates everything that was undone
        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the last entry for undo
    pub fn pop_undo(&mut self) -> Result<HistoryEntry> {
        self.undo_stack.pop_back().ok_or(EditError::UndoStackEmpty)
    }

    /// Pop the last undone entry for redo
    pub fn pop_redo(&mut self) -> Result<HistoryEntry> {
        self.redo_stack.pop().ok_or(EditError::RedoStackEmpty)
    }

    /// Move an entry that was just undone onto the redo stack
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    /// Put an entry back on the undo stack without touching the redo stack
    pub fn push_undone(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pos: usize) -> HistoryEntry {
        HistoryEntry {
            steps: vec![ReplaceStep::delete(pos, pos + 1)],
            inverses: Vec::new(),
            selection_before: Selection::collapsed(pos),
            selection_after: Selection::collapsed(pos),
        }
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut manager = UndoManager::with_limit(2);
        manager.push(entry(1));
        manager.push(entry(2));
        manager.push(entry(3));
        assert_eq!(manager.undo_depth(), 2);
        assert_eq!(manager.pop_undo().unwrap().steps[0].from, 3);
        assert_eq!(manager.pop_undo().unwrap().steps[0].from, 2);
        assert_eq!(manager.pop_undo().unwrap_err(), EditError::UndoStackEmpty);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut manager = UndoManager::new();
        manager.push(entry(1));
        let undone = manager.pop_undo().unwrap();
        manager.push_redo(undone);
        assert!(manager.can_redo());
        manager.push(entry(2));
        assert!(!manager.can_redo());
        assert_eq!(manager.pop_redo().unwrap_err(), EditError::RedoStackEmpty);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(UndoManager::default().max_entries(), DEFAULT_MAX_ENTRIES);
        assert_eq!(UndoManager::with_limit(0).max_entries(), 1);
    }
}
