//! Selection model - anchor/head tracking rebased after every transaction

use crate::{Assoc, Mapping, Result};
use doc_model::{DocModelError, Node, Slice};

/// An anchor/head pair of positions in one document snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Carry both ends through a transaction's mapping
    pub fn map(&self, mapping: &Mapping, assoc: Assoc) -> Selection {
        Selection::new(mapping.map(self.anchor, assoc), mapping.map(self.head, assoc))
    }

    fn check(&self, doc: &Node) -> Result<()> {
        let size = doc.content_size();
        match [self.anchor, self.head].into_iter().find(|&pos| pos > size) {
            Some(pos) => Err(DocModelError::OutOfRange { pos, size }.into()),
            None => Ok(()),
        }
    }
}

/// The user's selection; only readable while the composer has focus
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selection: Selection,
    focused: bool,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The selection if it can currently be resolved
    pub fn current(&self) -> Option<Selection> {
        self.focused.then_some(self.selection)
    }

    /// The last known selection, focused or not
    pub fn last(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, doc: &Node, anchor: usize, head: usize) -> Result<()> {
        let selection = Selection::new(anchor, head);
        selection.check(doc)?;
        self.selection = selection;
        Ok(())
    }

    pub fn collapse_to(&mut self, doc: &Node, pos: usize) -> Result<()> {
        self.set_selection(doc, pos, pos)
    }

    /// Replace the selection after a transaction, clamped to the new document
    pub(crate) fn rebase(&mut self, doc: &Node, selection: Selection) {
        let size = doc.content_size();
        self.selection = Selection::new(selection.anchor.min(size), selection.head.min(size));
    }

    /// Text strictly between anchor and head, marks discarded
    pub fn selected_text(&self, doc: &Node) -> Result<String> {
        Ok(doc.text_between(self.selection.from(), self.selection.to())?)
    }

    /// Structural slice between anchor and head, marks and node types kept
    pub fn selected_fragment(&self, doc: &Node) -> Result<Slice> {
        Ok(doc.slice(self.selection.from(), self.selection.to())?)
    }
}

/// The textblock position closest to `pos`, searching forward first
pub fn text_position_near(doc: &Node, pos: usize) -> usize {
    let mut blocks = Vec::new();
    doc.nodes_between(0, doc.content_size(), &mut |node, start| {
        if node.is_textblock() {
            blocks.push((start + 1, start + 1 + node.content_size()));
            return false;
        }
        true
    });
    if blocks.iter().any(|&(start, end)| start <= pos && pos <= end) {
        return pos;
    }
    blocks
        .iter()
        .find(|&&(start, _)| start >= pos)
        .map(|&(start, _)| start)
        .or_else(|| blocks.last().map(|&(_, end)| end))
        .unwrap_or(pos)
}
