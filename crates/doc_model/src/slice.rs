//! Slices and range traversal

use crate::{resolve, DocModelError, Fragment, Node, Result};

/// A piece of a document cut between two positions.
///
/// `open_start` and `open_end` count how many ancestor levels were cut open on
/// each side, so a slice taken from the middle of one paragraph into the next
/// keeps both (cut) paragraphs and reports an open depth of 1 on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn empty() -> Self {
        Self {
            content: Fragment::empty(),
            open_start: 0,
            open_end: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn check_range(doc: &Node, from: usize, to: usize) -> Result<()> {
    if from > to {
        return Err(DocModelError::InvalidRange { from, to });
    }
    if to > doc.content_size() {
        return Err(DocModelError::OutOfRange {
            pos: to,
            size: doc.content_size(),
        });
    }
    Ok(())
}

impl Node {
    /// Structural slice between two positions, marks and node types preserved
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice> {
        check_range(self, from, to)?;
        if from == to {
            return Ok(Slice::empty());
        }
        let rfrom = resolve(self, from)?;
        let rto = resolve(self, to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let content = rfrom
            .node(depth)
            .content()
            .cut(from - start, to - start);
        Ok(Slice {
            content,
            open_start: rfrom.depth() - depth,
            open_end: rto.depth() - depth,
        })
    }

    /// Visit every descendant overlapping `from..to` with its start position.
    ///
    /// Returning `false` from the callback skips that node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        visit(self.content(), from, to, 0, f);
    }

    /// Text between two positions with marks discarded.
    ///
    /// Text from different textblocks is separated by a newline; textblocks that
    /// contribute no text are skipped.
    pub fn text_between(&self, from: usize, to: usize) -> Result<String> {
        check_range(self, from, to)?;
        let mut out = String::new();
        let mut new_block = false;
        self.nodes_between(from, to, &mut |node, pos| {
            if node.is_textblock() {
                new_block = true;
            } else if let Some(text) = node.text() {
                let start = from.saturating_sub(pos);
                let end = (to - pos).min(node.size());
                let piece = crate::node::char_slice(text, start, end);
                if !piece.is_empty() {
                    if new_block && !out.is_empty() {
                        out.push('\n');
                    }
                    new_block = false;
                    out.push_str(piece);
                }
            }
            true
        });
        Ok(out)
    }
}

fn visit<F>(content: &Fragment, from: usize, to: usize, node_start: usize, f: &mut F)
where
    F: FnMut(&Node, usize) -> bool,
{
    let mut pos = 0;
    for child in content {
        if pos >= to {
            break;
        }
        let end = pos + child.size();
        if end > from && f(child, node_start + pos) && child.content_size() > 0 {
            let start = pos + 1;
            visit(
                child.content(),
                from.saturating_sub(start),
                to.saturating_sub(start).min(child.content_size()),
                node_start + start,
                f,
            );
        }
        pos = end;
    }
}
