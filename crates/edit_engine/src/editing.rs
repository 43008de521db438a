//! Default keyboard editing: typing, Backspace, Delete, Enter

use crate::{text_position_near, Command, ReplaceStep, Result, Selection, Transaction};
use doc_model::{fragment, resolve, MarkSet, MarkType, Node, NodeKind};

/// Delete a range selection and find where typing continues.
///
/// The content before `from` stays put, but `from` may now sit between blocks;
/// the caret moves to the nearest textblock, or into a new empty paragraph when
/// the deletion left none. A collapsed caret is returned unchanged.
fn replace_selection(tr: &mut Transaction, selection: Selection) -> Result<usize> {
    let pos = selection.from();
    if selection.is_collapsed() {
        return Ok(pos);
    }
    tr.delete_range(pos, selection.to())?;
    let near = text_position_near(tr.doc(), pos);
    if resolve(tr.doc(), near)?.parent().is_textblock() {
        return Ok(near);
    }
    tr.insert(pos, fragment(vec![Node::paragraph(Vec::new())?]))?;
    Ok(pos + 1)
}

/// Replace the selection with typed text
#[derive(Debug, Clone)]
pub struct InsertText {
    pub text: String,
}

impl InsertText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Command for InsertText {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = Transaction::new(doc);
        let pos = replace_selection(&mut tr, selection)?;
        if self.text.is_empty() {
            tr.set_selection(Selection::collapsed(pos));
            return Ok(tr);
        }
        let rpos = resolve(tr.doc(), pos)?;
        let marks = rpos
            .node_before()
            .or_else(|| rpos.node_after())
            .and_then(|node| node.marks().cloned())
            .map(|marks| marks.without(MarkType::Link))
            .unwrap_or_else(MarkSet::new);
        tr.insert(pos, fragment(vec![Node::text_with_marks(self.text.as_str(), marks)]))?;
        tr.set_selection(Selection::collapsed(pos + self.text.chars().count()));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Insert Text"
    }
}

/// Backspace: delete the selection or the character before the caret; at the
/// start of a textblock, join it into the previous textblock
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBackward;

impl Command for DeleteBackward {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = Transaction::new(doc);
        if !selection.is_collapsed() {
            tr.delete_range(selection.from(), selection.to())?;
            tr.set_selection(Selection::collapsed(selection.from()));
            return Ok(tr);
        }
        let pos = selection.head;
        let rpos = resolve(doc, pos)?;
        if !rpos.parent().is_textblock() {
            return Ok(tr);
        }
        if rpos.parent_offset() > 0 {
            tr.delete_range(pos - 1, pos)?;
            tr.set_selection(Selection::collapsed(pos - 1));
            return Ok(tr);
        }
        let depth = rpos.depth();
        let before = rpos.before(depth);
        let previous = rpos
            .index(depth - 1)
            .checked_sub(1)
            .and_then(|i| rpos.node(depth - 1).child(i));
        match previous {
            Some(prev) if prev.is_textblock() => {
                tr.delete_range(before - 1, pos)?;
                tr.set_selection(Selection::collapsed(before - 1));
            }
            Some(prev) if prev.is_atom() => {
                tr.delete_range(before - 1, before)?;
                tr.set_selection(Selection::collapsed(pos - 1));
            }
            _ => {}
        }
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Delete Backward"
    }
}

/// Delete: delete the selection or the character after the caret; at the end
/// of a textblock, join the next textblock into it
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteForward;

impl Command for DeleteForward {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = Transaction::new(doc);
        if !selection.is_collapsed() {
            tr.delete_range(selection.from(), selection.to())?;
            tr.set_selection(Selection::collapsed(selection.from()));
            return Ok(tr);
        }
        let pos = selection.head;
        let rpos = resolve(doc, pos)?;
        let parent = rpos.parent();
        if !parent.is_textblock() {
            return Ok(tr);
        }
        if rpos.parent_offset() < parent.content_size() {
            tr.delete_range(pos, pos + 1)?;
            tr.set_selection(Selection::collapsed(pos));
            return Ok(tr);
        }
        let depth = rpos.depth();
        let after = rpos.after(depth);
        let next = rpos.node(depth - 1).child(rpos.index(depth - 1) + 1);
        match next {
            Some(next) if next.is_textblock() => {
                tr.delete_range(pos, after + 1)?;
            }
            Some(next) if next.is_atom() => {
                tr.delete_range(after, after + 1)?;
            }
            _ => return Ok(tr),
        }
        tr.set_selection(Selection::collapsed(pos));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Delete Forward"
    }
}

/// Enter: split the textblock at the caret
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitBlock;

impl Command for SplitBlock {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = Transaction::new(doc);
        let pos = replace_selection(&mut tr, selection)?;
        let rpos = resolve(tr.doc(), pos)?;
        let parent = rpos.parent().clone();
        if !parent.is_textblock() {
            return Ok(tr);
        }
        let depth = rpos.depth();
        let offset = rpos.parent_offset();
        let end = parent.content_size();
        // Enter at the end of a heading continues with a plain paragraph
        let kind = match parent.kind() {
            NodeKind::Heading { .. } if offset == end => NodeKind::Paragraph,
            kind => kind.clone(),
        };
        let left = parent.cut(0, offset);
        let right = Node::new(kind, parent.content().cut(offset, end).children().to_vec())?;
        let before = rpos.before(depth);
        let caret = before + left.size() + 1;
        tr.step(ReplaceStep::new(
            before,
            rpos.after(depth),
            fragment(vec![left, right]),
        ))?;
        tr.set_selection(Selection::collapsed(caret));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Split Block"
    }
}
