//! Command execution engine

use crate::{
    text_position_near, Assoc, Command, EditError, HistoryEntry, Result, Selection,
    SelectionModel, Transaction, UndoManager,
};
use doc_model::Node;

/// Owns the current document snapshot, the selection, and history.
///
/// Every mutation goes through [`EditingEngine::dispatch`], which takes
/// `&mut self`, so a transaction cannot be dispatched while another one is
/// being committed.
#[derive(Debug)]
pub struct EditingEngine {
    /// Current document snapshot
    doc: Node,
    /// Current selection
    selection: SelectionModel,
    /// Undo manager
    undo_manager: UndoManager,
}

impl EditingEngine {
    /// Create an engine with the default history cap
    pub fn new(doc: Node) -> Self {
        Self::with_undo_manager(doc, UndoManager::new())
    }

    pub fn with_history_limit(doc: Node, max_entries: usize) -> Self {
        Self::with_undo_manager(doc, UndoManager::with_limit(max_entries))
    }

    fn with_undo_manager(doc: Node, undo_manager: UndoManager) -> Self {
        let mut selection = SelectionModel::new();
        let start = doc.first_text_position().unwrap_or(0);
        selection.rebase(&doc, Selection::collapsed(start));
        Self {
            doc,
            selection,
            undo_manager,
        }
    }

    /// Get the current document
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// Get the selection model
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn focus(&mut self) {
        self.selection.focus();
    }

    pub fn blur(&mut self) {
        self.selection.blur();
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) -> Result<()> {
        self.selection.set_selection(&self.doc, anchor, head)
    }

    pub fn collapse_to(&mut self, pos: usize) -> Result<()> {
        self.selection.collapse_to(&self.doc, pos)
    }

    /// Text of the current selection; fails while unfocused
    pub fn selected_text(&self) -> Result<String> {
        self.selection
            .current()
            .ok_or(EditError::SelectionUnavailable)?;
        self.selection.selected_text(&self.doc)
    }

    /// Start a transaction against the current snapshot
    pub fn transaction(&self) -> Transaction {
        Transaction::new(&self.doc)
    }

    /// Commit a transaction: swap in the new snapshot, rebase the selection,
    /// and record one undo entry. Returns whether the document changed.
    pub fn dispatch(&mut self, mut tr: Transaction) -> Result<bool> {
        if !tr.before().same_snapshot(&self.doc) {
            return Err(EditError::StaleTransaction);
        }
        tr.ensure_not_empty()?;
        if !tr.doc_changed() {
            if let Some(selection) = tr.selection() {
                self.selection.rebase(&self.doc, selection);
            }
            return Ok(false);
        }

        let selection_before = self.selection.last();
        self.doc = tr.doc().clone();
        let selection_after = match tr.selection() {
            Some(selection) => selection,
            None => {
                let mapped = selection_before.map(tr.mapping(), Assoc::After);
                if mapped.is_collapsed() {
                    Selection::collapsed(text_position_near(&self.doc, mapped.head))
                } else {
                    mapped
                }
            }
        };
        self.selection.rebase(&self.doc, selection_after);

        tracing::debug!(
            steps = tr.steps().len(),
            size = self.doc.content_size(),
            "Committed transaction"
        );
        self.undo_manager.push(HistoryEntry {
            steps: tr.steps().to_vec(),
            inverses: tr.inverses().to_vec(),
            selection_before,
            selection_after: self.selection.last(),
        });
        Ok(true)
    }

    /// Build a command against the current selection and commit it
    pub fn execute(&mut self, command: &dyn Command) -> Result<bool> {
        let selection = self
            .selection
            .current()
            .ok_or(EditError::SelectionUnavailable)?;
        let tr = command.apply(&self.doc, selection)?;
        tracing::debug!(command = command.display_name(), "Executing command");
        self.dispatch(tr)
    }

    /// Undo the last transaction
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo_manager.pop_undo()?;
        let mut tr = self.transaction();
        let replayed = entry
            .inverses
            .iter()
            .rev()
            .try_for_each(|step| tr.step(step.clone()).map(|_| ()));
        if let Err(err) = replayed {
            self.undo_manager.push_undone(entry);
            return Err(err);
        }
        self.doc = tr.doc().clone();
        self.selection.rebase(&self.doc, entry.selection_before);
        tracing::debug!(steps = entry.inverses.len(), "Undid transaction");
        self.undo_manager.push_redo(entry);
        Ok(())
    }

    /// Redo the last undone transaction
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.undo_manager.pop_redo()?;
        let mut tr = self.transaction();
        let replayed = entry
            .steps
            .iter()
            .try_for_each(|step| tr.step(step.clone()).map(|_| ()));
        if let Err(err) = replayed {
            self.undo_manager.push_redo(entry);
            return Err(err);
        }
        self.doc = tr.doc().clone();
        self.selection.rebase(&self.doc, entry.selection_after);
        tracing::debug!(steps = entry.steps.len(), "Redid transaction");
        self.undo_manager.push_undone(entry);
        Ok(())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}
