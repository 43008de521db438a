//! Formatting commands: marks and block types

use crate::{Command, ReplaceStep, Result, Selection, Transaction};
use doc_model::{fragment, resolve, Mark, MarkSet, MarkType, Node, NodeKind, NodeType};

/// Rebuild every textblock touched by `from..to`.
///
/// Text inside the range is passed through `map_text`; when `kind` is given
/// the block is retyped as well. Node sizes never change, so block positions
/// stay valid across the replacements.
fn rewrite_textblocks<F>(
    doc: &Node,
    from: usize,
    to: usize,
    kind: Option<&NodeKind>,
    map_text: F,
) -> Result<Transaction>
where
    F: Fn(&Node) -> Node,
{
    let mut blocks = Vec::new();
    doc.nodes_between(from, to, &mut |node, pos| {
        if node.is_textblock() {
            blocks.push((pos, node.clone()));
            return false;
        }
        true
    });

    let mut tr = Transaction::new(doc);
    for (pos, block) in blocks {
        let start = pos + 1;
        let end = block.content_size();
        let local_from = from.saturating_sub(start).min(end);
        let local_to = to.saturating_sub(start).min(end);
        let content = block.content();
        let covered = content
            .cut(local_from, local_to)
            .iter()
            .map(&map_text)
            .collect();
        let rebuilt = content
            .cut(0, local_from)
            .append(&fragment(covered))
            .append(&content.cut(local_to, end));
        let mut node = block.with_content(rebuilt)?;
        if let Some(kind) = kind {
            node = node.with_kind(kind.clone())?;
        }
        if node != block {
            tr.replace_block(pos, node)?;
        }
    }
    Ok(tr)
}

fn covered_text_all<P>(doc: &Node, from: usize, to: usize, predicate: P) -> Option<bool>
where
    P: Fn(&MarkSet) -> bool,
{
    let mut seen = false;
    let mut all = true;
    doc.nodes_between(from, to, &mut |node, _| {
        if let Some(marks) = node.marks() {
            seen = true;
            all &= predicate(marks);
        }
        true
    });
    seen.then_some(all)
}

/// Old positions at or past `.0` move by `.1` once lifted lists are written back
type Shift = (usize, isize);

fn touches(start: usize, end: usize, from: usize, to: usize) -> bool {
    if from == to {
        start < from && from < end
    } else {
        start < to && from < end
    }
}

/// Rebuild the list at `start` with the items touched by `from..to` lifted
/// out of it. Untouched items stay grouped in lists around the lifted
/// content; nested lists inside a lifted item are lifted the same way.
fn lift_list(
    list: &Node,
    start: usize,
    from: usize,
    to: usize,
    shifts: &mut Vec<Shift>,
) -> Result<Vec<Node>> {
    shifts.push((start + 1, -1));
    shifts.push((start + list.size(), -1));
    let mut out = Vec::new();
    let mut run = Vec::new();
    let mut reused = false;
    let mut pos = start + 1;
    for item in list.children() {
        let end = pos + item.size();
        if touches(pos, end, from, to) {
            close_run(list, &mut run, &mut reused, pos, &mut out, shifts)?;
            shifts.push((pos + 1, -1));
            shifts.push((end, -1));
            let mut child_pos = pos + 1;
            for child in item.children() {
                if child.node_type() == NodeType::BulletList {
                    out.extend(lift_list(child, child_pos, from, to, shifts)?);
                } else {
                    out.push(child.clone());
                }
                child_pos += child.size();
            }
        } else {
            if run.is_empty() {
                shifts.push((pos + 1, 1));
            }
            run.push(item.clone());
        }
        pos = end;
    }
    close_run(list, &mut run, &mut reused, pos, &mut out, shifts)?;
    Ok(out)
}

/// Wrap the pending untouched items in a list; the first run keeps the
/// original list's identity
fn close_run(
    list: &Node,
    run: &mut Vec<Node>,
    reused: &mut bool,
    at: usize,
    out: &mut Vec<Node>,
    shifts: &mut Vec<Shift>,
) -> Result<()> {
    if run.is_empty() {
        return Ok(());
    }
    shifts.push((at, 1));
    let items = std::mem::take(run);
    let node = if *reused {
        Node::bullet_list(items)?
    } else {
        *reused = true;
        list.with_content(fragment(items))?
    };
    out.push(node);
    Ok(())
}

/// Strip every mark in the selection and reset touched blocks to paragraphs.
///
/// List items touched by the selection are lifted out of their lists, so the
/// touched content ends up as plain top-level blocks of the list's parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearFormatting;

impl Command for ClearFormatting {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let (from, to) = (selection.from(), selection.to());
        let mut tr = rewrite_textblocks(doc, from, to, Some(&NodeKind::Paragraph), |node| {
            node.with_marks(MarkSet::new())
        })?;

        let mut lists = Vec::new();
        tr.doc().nodes_between(from, to, &mut |node, pos| {
            if node.node_type() == NodeType::BulletList {
                if touches(pos, pos + node.size(), from, to) {
                    lists.push((pos, node.clone()));
                }
                return false;
            }
            true
        });
        let mut shifts = Vec::new();
        let mut lifted = Vec::with_capacity(lists.len());
        for (pos, list) in &lists {
            lifted.push((*pos, list.size(), lift_list(list, *pos, from, to, &mut shifts)?));
        }
        // Back to front, so earlier list positions stay valid
        for (pos, size, nodes) in lifted.into_iter().rev() {
            tr.step(ReplaceStep::new(pos, pos + size, fragment(nodes)))?;
        }

        let shift = |x: usize| {
            let delta: isize = shifts
                .iter()
                .filter(|&&(at, _)| x >= at)
                .map(|&(_, delta)| delta)
                .sum();
            x.saturating_add_signed(delta)
        };
        tr.set_selection(Selection::new(shift(selection.anchor), shift(selection.head)));
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Clear Formatting"
    }
}

/// Add a mark to the selected text, or remove it if all of it already has one
#[derive(Debug, Clone)]
pub struct ToggleMark {
    pub mark: Mark,
}

impl ToggleMark {
    pub fn new(mark: Mark) -> Self {
        Self { mark }
    }
}

impl Command for ToggleMark {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let (from, to) = (selection.from(), selection.to());
        let mark_type = self.mark.mark_type();
        let Some(all_marked) = covered_text_all(doc, from, to, |m| m.has(mark_type)) else {
            return Ok(Transaction::new(doc));
        };
        if selection.is_collapsed() {
            return Ok(Transaction::new(doc));
        }
        let mut tr = if all_marked {
            rewrite_textblocks(doc, from, to, None, |node| match node.marks() {
                Some(marks) => node.with_marks(marks.without(mark_type)),
                None => node.clone(),
            })?
        } else {
            rewrite_textblocks(doc, from, to, None, |node| match node.marks() {
                Some(marks) => node.with_marks(marks.with(self.mark.clone())),
                None => node.clone(),
            })?
        };
        tr.set_selection(selection);
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Toggle Mark"
    }
}

/// Set or remove a link.
///
/// With a URL, the selected text becomes a link; a caret inserts the URL
/// itself as linked text. Without one (or with an empty URL) the link is
/// removed from the selection, or from the whole link around a caret.
#[derive(Debug, Clone)]
pub struct SetLink {
    pub href: Option<String>,
}

impl SetLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
        }
    }

    pub fn remove() -> Self {
        Self { href: None }
    }
}

impl Command for SetLink {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let href = self.href.as_deref().map(str::trim).filter(|h| !h.is_empty());
        let (from, to) = match (href, selection.is_collapsed()) {
            (Some(href), true) => {
                let mut tr = Transaction::new(doc);
                let text = Node::text_with_marks(href, MarkSet::new().with(Mark::link(href)));
                let pos = selection.head;
                tr.insert(pos, fragment(vec![text]))?;
                tr.set_selection(Selection::collapsed(pos + href.chars().count()));
                return Ok(tr);
            }
            (None, true) => match link_extent(doc, selection.head)? {
                Some(extent) => extent,
                None => return Ok(Transaction::new(doc)),
            },
            (_, false) => (selection.from(), selection.to()),
        };
        let mut tr = match href {
            Some(href) => rewrite_textblocks(doc, from, to, None, |node| match node.marks() {
                Some(marks) => node.with_marks(marks.with(Mark::link(href))),
                None => node.clone(),
            })?,
            None => rewrite_textblocks(doc, from, to, None, |node| match node.marks() {
                Some(marks) => node.with_marks(marks.without(MarkType::Link)),
                None => node.clone(),
            })?,
        };
        tr.set_selection(selection);
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Set Link"
    }
}

/// Range covered by the run of text sharing the link at `pos`
fn link_extent(doc: &Node, pos: usize) -> Result<Option<(usize, usize)>> {
    let rpos = resolve(doc, pos)?;
    let parent = rpos.parent();
    if !parent.is_textblock() {
        return Ok(None);
    }
    let depth = rpos.depth();
    let index = rpos.index(depth);
    let link_of = |i: usize| {
        parent
            .child(i)
            .and_then(Node::marks)
            .and_then(|m| m.get(MarkType::Link))
            .cloned()
    };
    let mut candidates = vec![index];
    if rpos.text_offset() == 0 && index > 0 {
        candidates.push(index - 1);
    }
    let Some((found, link)) = candidates
        .into_iter()
        .find_map(|i| link_of(i).map(|link| (i, link)))
    else {
        return Ok(None);
    };
    let mut first = found;
    while first > 0 && link_of(first - 1).as_ref() == Some(&link) {
        first -= 1;
    }
    let mut last = found;
    while link_of(last + 1).as_ref() == Some(&link) {
        last += 1;
    }
    let start = rpos.start(depth);
    let size_to = |i: usize| parent.children()[..i].iter().map(Node::size).sum::<usize>();
    Ok(Some((start + size_to(first), start + size_to(last + 1))))
}

/// Retype every textblock touched by the selection
#[derive(Debug, Clone)]
pub struct SetBlockType {
    pub kind: NodeKind,
}

impl SetBlockType {
    pub fn paragraph() -> Self {
        Self {
            kind: NodeKind::Paragraph,
        }
    }

    pub fn heading(level: u8) -> Self {
        Self {
            kind: NodeKind::Heading { level },
        }
    }
}

impl Command for SetBlockType {
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction> {
        let mut tr = rewrite_textblocks(
            doc,
            selection.from(),
            selection.to(),
            Some(&self.kind),
            Node::clone,
        )?;
        tr.set_selection(selection);
        Ok(tr)
    }

    fn display_name(&self) -> &str {
        "Set Block Type"
    }
}
