//! Block insertion and duplication

use crate::{text_position_near, Assoc, Command, ReplaceStep, Result, Selection, Transaction};
use doc_model::{fragment, resolve, schema, DocModelError, Node, NodeType};

/// Replace the selection with a block node, splitting the textblock around
/// the caret when needed.
///
/// If the textblock's container cannot hold the block (a table inside a
/// cell), the block goes after the nearest ancestor that can. Returns the
/// transaction and the position the block was inserted at.
pub(crate) fn insert_block(
    doc: &Node,
    selection: Selection,
    block: Node,
) -> Result<(Transaction, usize)> {
    let mut tr = Transaction::new(doc);
    tr.delete_range(selection.from(), selection.to())?;
    let pos = selection.from();
    let rpos = resolve(tr.doc(), pos)?;
    let block_type = block.node_type();
    let depth = rpos.depth();
    let parent = rpos.parent().clone();

    if schema::allows_child(parent.node_type(), block_type) {
        tr.insert(pos, fragment(vec![block]))?;
        return Ok((tr, pos));
    }

    if parent.is_textblock() && schema::allows_child(rpos.node(depth - 1).node_type(), block_type)
    {
        let offset = rpos.parent_offset();
        let end = parent.content_size();
        let before = rpos.before(depth);
        let mut nodes = Vec::with_capacity(3);
        let mut block_pos = before;
        if offset > 0 {
            let left = parent.cut(0, offset);
            block_pos += left.size();
            nodes.push(left);
        }
        nodes.push(block);
        if offset == 0 && end > 0 {
            nodes.push(parent.clone());
        } else if offset < end {
            let rest = parent.content().cut(offset, end);
            nodes.push(Node::new(parent.kind().clone(), rest.children().to_vec())?);
        }
        tr.step(ReplaceStep::new(before, rpos.after(depth), fragment(nodes)))?;
        return Ok((tr, block_pos));
    }

    let Some(target) = (0..depth)
        .rev()
        .find(|&d| schema::allows_child(rpos.node(d).node_type(), block_type))
    else {
        return Err(DocModelError::SchemaViolation {
            parent: parent.node_type(),
            child: block_type,
        }
        .into());
    };
    let at = rpos.after(target + 1);
    tr.insert(at, fragment(vec![block]))?;
    Ok((tr, at))
}

/// Insert an image block at the selection
#[derive(Debug, Clone)]
pub struct InsertImage {
    pub src: String,
}

impl InsertImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

impl Command for InsertImage {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let (mut tr, pos) = insert_block(doc, selection, Node::image(self.src.as_str()))?;
        let caret = text_position_near(tr.doc(), pos + 1);
        tr.set_selection(Selection::collapsed(caret));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Insert Image"
    }
}

/// Insert a horizontal rule at the selection
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertHorizontalRule;

impl Command for InsertHorizontalRule {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let (mut tr, pos) = insert_block(doc, selection, Node::horizontal_rule())?;
        let caret = text_position_near(tr.doc(), pos + 1);
        tr.set_selection(Selection::collapsed(caret));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Insert Horizontal Rule"
    }
}

/// Insert a copy of the selected content right after the selection's head.
///
/// The copy gets fresh node ids. A selection spanning several blocks is
/// copied as whole blocks and placed after the block holding the head. A
/// selection spanning table cells copies the whole table and places the copy
/// after it, so no row ends up with extra cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct Duplicate;

impl Command for Duplicate {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = Transaction::new(doc);
        if selection.is_collapsed() {
            return Ok(tr);
        }
        let (from, to) = (selection.from(), selection.to());
        let rfrom = resolve(doc, from)?;
        let shared = rfrom.shared_depth(to);
        let table = match rfrom.node(shared).node_type() {
            NodeType::Table => Some(shared),
            NodeType::TableRow => Some(shared - 1),
            _ => None,
        };
        if let Some(table) = table {
            let copy = rfrom.node(table).with_fresh_ids();
            tr.insert(rfrom.after(table), fragment(vec![copy]))?;
            tr.set_selection(selection);
            return Ok(tr);
        }
        let slice = doc.slice(from, to)?;
        let at = if slice.open_start == 0 && slice.open_end == 0 {
            selection.head
        } else {
            let depth = shared;
            let rhead = resolve(doc, selection.head)?;
            if rhead.depth() > depth {
                rhead.after(depth + 1)
            } else {
                selection.head
            }
        };
        tr.insert(at, slice.content.with_fresh_ids())?;
        // Keep the original content selected
        let assoc = if selection.head >= selection.anchor {
            Assoc::Before
        } else {
            Assoc::After
        };
        tr.set_selection(selection.map(tr.mapping(), assoc));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Duplicate"
    }
}
