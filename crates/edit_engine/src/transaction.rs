//! Transactions - atomic, invertible batches of steps
//!
//! A [`Transaction`] starts from one document snapshot and accumulates steps.
//! Each step records its inverse and its position map as it is applied. Any
//! failing operation leaves the transaction exactly as it was before that
//! operation; the editing engine commits the batch as one undo unit.

use crate::{Mapping, ReplaceStep, Result, Selection};
use doc_model::{fragment, resolve, DocModelError, Fragment, Node, NodeType, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Result of a sibling swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The node now lives at `path`
    Moved { path: Path },
    /// Already first (or last) among its siblings; nothing changed
    NoSiblingInDirection,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    before: Node,
    doc: Node,
    steps: Vec<ReplaceStep>,
    inverses: Vec<ReplaceStep>,
    mapping: Mapping,
    selection: Option<Selection>,
}

impl Transaction {
    pub fn new(doc: &Node) -> Self {
        Self {
            before: doc.clone(),
            doc: doc.clone(),
            steps: Vec::new(),
            inverses: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
        }
    }

    /// Fold `steps` over `doc` left to right.
    ///
    /// Positions in every step refer to `doc`; each one is rebased through the
    /// maps of the steps applied before it.
    pub fn apply(doc: &Node, steps: Vec<ReplaceStep>) -> Result<Self> {
        let mut tr = Self::new(doc);
        tr.step_rebased(steps)?;
        Ok(tr)
    }

    /// The snapshot this transaction started from
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// The document with every step so far applied
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[ReplaceStep] {
        &self.steps
    }

    pub fn inverses(&self) -> &[ReplaceStep] {
        &self.inverses
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Selection requested by the builder; when unset the engine maps the old one
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    /// Apply one step against the current document
    pub fn step(&mut self, step: ReplaceStep) -> Result<&mut Self> {
        if step.from == step.to && step.content.is_empty() {
            return Ok(self);
        }
        let (doc, inverse) = step.apply(&self.doc)?;
        self.mapping.push(step.get_map());
        self.steps.push(step);
        self.inverses.push(inverse);
        self.doc = doc;
        Ok(self)
    }

    /// Remove the content in `from..to`.
    ///
    /// When the ends sit in different parents the partially covered blocks are
    /// cut, and the two boundary textblocks are joined into the first one.
    pub fn delete_range(&mut self, from: usize, to: usize) -> Result<&mut Self> {
        let size = self.doc.content_size();
        if from > to {
            return Err(DocModelError::InvalidRange { from, to }.into());
        }
        if to > size {
            return Err(DocModelError::OutOfRange { pos: to, size }.into());
        }
        if from == to {
            return Ok(self);
        }
        let rfrom = resolve(&self.doc, from)?;
        let rto = resolve(&self.doc, to)?;
        if rfrom.same_parent(&rto) {
            return self.step(ReplaceStep::delete(from, to));
        }

        let depth = rfrom.shared_depth(to);
        let (start, left) = if rfrom.depth() > depth {
            let node = rfrom.node(depth + 1);
            let cut = node.cut(0, from - rfrom.start(depth + 1));
            (rfrom.before(depth + 1), Some((cut, rfrom.depth() - depth - 1)))
        } else {
            (from, None)
        };
        let (end, right) = if rto.depth() > depth {
            let node = rto.node(depth + 1);
            let cut = node.cut(to - rto.start(depth + 1), node.content_size());
            (rto.after(depth + 1), Some((cut, rto.depth() - depth - 1)))
        } else {
            (to, None)
        };
        let content = match (left, right) {
            (Some((left, open_left)), Some((right, open_right))) => {
                join_cut(left, right, open_left, open_right)?
            }
            (left, right) => left.into_iter().chain(right).map(|(node, _)| node).collect(),
        };
        self.step(ReplaceStep::new(start, end, fragment(content)))
    }

    /// Splice `content` in at `at`
    pub fn insert(&mut self, at: usize, content: Fragment) -> Result<&mut Self> {
        self.step(ReplaceStep::insert(at, content))
    }

    /// Swap the block starting at `pos` for `node`
    pub fn replace_block(&mut self, pos: usize, node: Node) -> Result<&mut Self> {
        let rpos = resolve(&self.doc, pos)?;
        let old = rpos
            .node_after()
            .filter(|n| !n.is_text() && rpos.text_offset() == 0)
            .ok_or_else(|| DocModelError::NodeNotFound(format!("no block at position {pos}")))?;
        self.step(ReplaceStep::new(pos, pos + old.size(), fragment(vec![node])))
    }

    /// Delete the node at `path` over its full span
    pub fn delete_node(&mut self, path: &[usize]) -> Result<&mut Self> {
        if path.is_empty() {
            return Err(DocModelError::InvalidPath(Vec::new()).into());
        }
        let size = self
            .doc
            .node_at(path)
            .map(Node::size)
            .ok_or_else(|| DocModelError::InvalidPath(path.to_vec()))?;
        let pos = self.doc.position_of(path)?;
        self.delete_range(pos, pos + size)
    }

    /// Swap the node at `path` with its neighbour in `direction`.
    ///
    /// The node is removed and reinserted on the far side of its sibling; its
    /// own content is carried over untouched.
    pub fn move_node(&mut self, path: &[usize], direction: MoveDirection) -> Result<MoveOutcome> {
        let invalid = || DocModelError::InvalidPath(path.to_vec());
        let (&index, parent_path) = path.split_last().ok_or_else(invalid)?;
        let parent = self.doc.node_at(parent_path).ok_or_else(invalid)?;
        let node = parent
            .child(index)
            .filter(|n| !n.is_text())
            .cloned()
            .ok_or_else(invalid)?;
        let sibling_index = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&i| i < parent.child_count()),
        };
        let Some(sibling) = sibling_index.and_then(|i| parent.child(i)) else {
            return Ok(MoveOutcome::NoSiblingInDirection);
        };
        let pos = self.doc.position_of(path)?;
        let end = pos + node.size();
        let (target, new_index) = match direction {
            MoveDirection::Up => (pos - sibling.size(), index - 1),
            MoveDirection::Down => (end + sibling.size(), index + 1),
        };
        self.step_rebased(vec![
            ReplaceStep::delete(pos, end),
            ReplaceStep::insert(target, fragment(vec![node])),
        ])?;
        let mut new_path = parent_path.to_vec();
        new_path.push(new_index);
        Ok(MoveOutcome::Moved { path: new_path })
    }

    /// Keep at least one block in the document by adding an empty paragraph
    pub fn ensure_not_empty(&mut self) -> Result<&mut Self> {
        if self.doc.child_count() == 0 {
            let paragraph = Node::paragraph(Vec::new())?;
            self.insert(0, fragment(vec![paragraph]))?;
        }
        Ok(self)
    }

    fn step_rebased(&mut self, steps: Vec<ReplaceStep>) -> Result<()> {
        let base = self.mapping.len();
        self.atomically(|tr| {
            for step in steps {
                let step = step.map(&tr.mapping.slice(base));
                tr.step(step)?;
            }
            Ok(())
        })
    }

    fn atomically<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let doc = self.doc.clone();
        let len = self.steps.len();
        let result = f(self);
        if result.is_err() {
            self.doc = doc;
            self.steps.truncate(len);
            self.inverses.truncate(len);
            self.mapping.truncate(len);
        }
        result
    }
}

/// Join the open edges of two cut blocks; list containers join through to
/// their boundary children, anything else stays side by side
fn join_cut(left: Node, right: Node, open_left: usize, open_right: usize) -> Result<Vec<Node>> {
    if left.is_textblock() && right.is_textblock() {
        let joined = left.with_content(left.content().append(right.content()))?;
        return Ok(vec![joined]);
    }
    let container = matches!(left.node_type(), NodeType::BulletList | NodeType::ListItem)
        && left.node_type() == right.node_type();
    if container && open_left > 0 && open_right > 0 {
        if let (Some(last), Some(first)) = (left.children().last(), right.children().first()) {
            let inner = join_cut(last.clone(), first.clone(), open_left - 1, open_right - 1)?;
            if inner.len() == 1 {
                let keep = left.child_count() - 1;
                let nodes = left.children()[..keep]
                    .iter()
                    .cloned()
                    .chain(inner)
                    .chain(right.children()[1..].iter().cloned())
                    .collect();
                return Ok(vec![left.with_content(fragment(nodes))?]);
            }
        }
    }
    Ok(vec![left, right])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditError;
    use doc_model::{Mark, MarkSet};

    fn table(rows: usize, cols: usize) -> Node {
        let rows = (0..rows)
            .map(|_| {
                let cells = (0..cols)
                    .map(|_| Node::table_cell(false, vec![Node::paragraph_text("c")]).unwrap())
                    .collect();
                Node::table_row(cells).unwrap()
            })
            .collect();
        Node::table(rows).unwrap()
    }

    fn sample() -> Node {
        Node::doc(vec![
            Node::paragraph_text("Hello"),
            table(2, 2),
            Node::paragraph_text("World"),
        ])
        .unwrap()
    }

    fn undo(tr: &Transaction) -> Node {
        let mut undo = Transaction::new(tr.doc());
        for inverse in tr.inverses().iter().rev() {
            undo.step(inverse.clone()).unwrap();
        }
        undo.doc().clone()
    }

    #[test]
    fn test_delete_range_within_text() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        tr.delete_range(2, 4).unwrap();
        assert_eq!(tr.doc().child(0).unwrap().text_content(), "Hlo");
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_delete_range_noop_and_errors() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        tr.delete_range(3, 3).unwrap();
        assert!(!tr.doc_changed());

        let err = tr.delete_range(5, 2).unwrap_err();
        assert_eq!(err, EditError::DocModel(DocModelError::InvalidRange { from: 5, to: 2 }));
        let err = tr.delete_range(0, 1000).unwrap_err();
        assert!(matches!(err, EditError::DocModel(DocModelError::OutOfRange { .. })));
        assert_eq!(tr.doc(), &doc);
    }

    #[test]
    fn test_delete_across_paragraphs_joins() {
        let doc = Node::doc(vec![
            Node::paragraph_text("Hello"),
            Node::paragraph_text("World"),
        ])
        .unwrap();
        let mut tr = Transaction::new(&doc);
        // "He|llo" .. "Wo|rld"
        tr.delete_range(3, 10).unwrap();
        assert_eq!(tr.doc().child_count(), 1);
        assert_eq!(tr.doc().text_content(), "Herld");
        assert_eq!(tr.doc().child(0).unwrap().id(), doc.child(0).unwrap().id());
        assert_eq!(tr.steps().len(), 1);
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_delete_across_table_keeps_cut_blocks() {
        let doc = sample();
        let world = doc.child(0).unwrap().size() + doc.child(1).unwrap().size();
        let mut tr = Transaction::new(&doc);
        // From inside "Hello" to inside "World": the table goes, the paragraphs join.
        tr.delete_range(3, world + 2).unwrap();
        assert_eq!(tr.doc().child_count(), 1);
        assert_eq!(tr.doc().text_content(), "Heorld");
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_delete_from_paragraph_into_table_cell() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        // "He|llo" .. first cell content start
        tr.delete_range(3, 11).unwrap();
        let result = tr.doc();
        assert_eq!(result.child(0).unwrap().text_content(), "He");
        assert_eq!(result.child(1).unwrap().node_type(), NodeType::Table);
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_insert_respects_schema() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        let row = table(1, 1).child(0).unwrap().clone();
        let err = tr.insert(0, fragment(vec![row])).unwrap_err();
        assert!(matches!(
            err,
            EditError::DocModel(DocModelError::SchemaViolation {
                parent: NodeType::Doc,
                child: NodeType::TableRow
            })
        ));
        assert!(!tr.doc_changed());

        let bold = Node::text_with_marks("!", MarkSet::new().with(Mark::Bold));
        tr.insert(6, fragment(vec![bold])).unwrap();
        assert_eq!(tr.doc().child(0).unwrap().child_count(), 2);
    }

    #[test]
    fn test_delete_node() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        tr.delete_node(&[1]).unwrap();
        assert_eq!(tr.doc().child_count(), 2);
        assert_eq!(tr.doc().text_content(), "HelloWorld");
        assert_eq!(undo(&tr), doc);

        let mut tr = Transaction::new(&doc);
        assert!(tr.delete_node(&[7]).is_err());
        assert!(tr.delete_node(&[]).is_err());
    }

    #[test]
    fn test_move_node_up_and_down() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        let outcome = tr.move_node(&[1], MoveDirection::Up).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { path: vec![0] });
        assert_eq!(tr.doc().child(0).unwrap(), doc.child(1).unwrap());
        assert_eq!(tr.doc().child(1).unwrap(), doc.child(0).unwrap());
        assert_eq!(tr.steps().len(), 2);

        let outcome = tr.move_node(&[0], MoveDirection::Down).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { path: vec![1] });
        assert_eq!(tr.doc(), &doc);
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_move_node_without_sibling() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        assert_eq!(
            tr.move_node(&[0], MoveDirection::Up).unwrap(),
            MoveOutcome::NoSiblingInDirection
        );
        assert_eq!(
            tr.move_node(&[2], MoveDirection::Down).unwrap(),
            MoveOutcome::NoSiblingInDirection
        );
        assert!(!tr.doc_changed());
    }

    #[test]
    fn test_apply_rebases_later_steps() {
        let doc = Node::doc(vec![
            Node::paragraph_text("ab"),
            Node::paragraph_text("cd"),
        ])
        .unwrap();
        // Both positions refer to the original document.
        let tr = Transaction::apply(
            &doc,
            vec![
                ReplaceStep::delete(1, 2),
                ReplaceStep::insert(6, fragment(vec![Node::plain_text("X")])),
            ],
        )
        .unwrap();
        assert_eq!(tr.doc().child(0).unwrap().text_content(), "b");
        assert_eq!(tr.doc().child(1).unwrap().text_content(), "cXd");
    }

    #[test]
    fn test_apply_is_atomic() {
        let doc = sample();
        let result = Transaction::apply(
            &doc,
            vec![ReplaceStep::delete(1, 3), ReplaceStep::delete(0, 1000)],
        );
        assert!(result.is_err());

        let mut tr = Transaction::new(&doc);
        tr.delete_range(1, 2).unwrap();
        let row = table(1, 1).child(0).unwrap().clone();
        assert!(tr
            .step_rebased(vec![
                ReplaceStep::delete(0, 1),
                ReplaceStep::insert(0, fragment(vec![row])),
            ])
            .is_err());
        assert_eq!(tr.steps().len(), 1);
        assert_eq!(tr.doc().child(0).unwrap().text_content(), "ello");
    }

    #[test]
    fn test_ensure_not_empty() {
        let doc = Node::doc(vec![table(1, 1)]).unwrap();
        let mut tr = Transaction::new(&doc);
        tr.delete_node(&[0]).unwrap();
        assert_eq!(tr.doc().child_count(), 0);
        tr.ensure_not_empty().unwrap();
        assert_eq!(tr.doc().child_count(), 1);
        assert_eq!(tr.doc().child(0).unwrap().node_type(), NodeType::Paragraph);
        assert_eq!(undo(&tr), doc);
    }

    #[test]
    fn test_replace_block() {
        let doc = sample();
        let mut tr = Transaction::new(&doc);
        let heading = doc
            .child(0)
            .unwrap()
            .with_kind(doc_model::NodeKind::Heading { level: 2 })
            .unwrap();
        tr.replace_block(0, heading).unwrap();
        assert_eq!(tr.doc().child(0).unwrap().node_type(), NodeType::Heading);
        assert!(tr.replace_block(2, Node::paragraph_text("x")).is_err());
        assert_eq!(undo(&tr), doc);
    }
}
