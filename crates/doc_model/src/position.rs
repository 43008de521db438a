//! Position resolution - mapping flat offsets to tree locations and back

use crate::{DocModelError, Node, NodeId, Result};

/// Child indices leading from the root to a node
pub type Path = Vec<usize>;

#[derive(Debug, Clone)]
struct Level {
    node: Node,
    /// Position where this node's content starts
    start: usize,
    /// Index of the child the position falls in (or before)
    index: usize,
}

/// A document position resolved against one snapshot.
///
/// Depth 0 is the document root; `depth()` is the depth of the innermost node
/// whose content directly contains the position.
#[derive(Debug, Clone)]
pub struct ResolvedPos {
    pos: usize,
    levels: Vec<Level>,
    parent_offset: usize,
    text_offset: usize,
}

/// Resolve `pos` in `doc`; cost grows with tree depth thanks to cached sizes
pub fn resolve(doc: &Node, pos: usize) -> Result<ResolvedPos> {
    if pos > doc.content_size() {
        return Err(DocModelError::OutOfRange {
            pos,
            size: doc.content_size(),
        });
    }
    let mut levels = Vec::new();
    let mut node = doc.clone();
    let mut start = 0;
    loop {
        let rel = pos - start;
        let (index, offset) = node.content().find_index(rel);
        let inside = rel - offset;
        let child = node.child(index).cloned();
        levels.push(Level {
            node,
            start,
            index,
        });
        match child {
            Some(child) if inside > 0 && !child.is_text() => {
                start += offset + 1;
                node = child;
            }
            _ => {
                return Ok(ResolvedPos {
                    pos,
                    levels,
                    parent_offset: rel,
                    text_offset: inside,
                });
            }
        }
    }
}

impl ResolvedPos {
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// The innermost node whose content holds the position
    pub fn parent(&self) -> &Node {
        &self.levels[self.depth()].node
    }

    pub fn node(&self, depth: usize) -> &Node {
        &self.levels[depth].node
    }

    /// Offset of the position within the parent's content
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Offset into the text node the position falls inside, 0 on a boundary
    pub fn text_offset(&self) -> usize {
        self.text_offset
    }

    /// Where the content of the ancestor at `depth` starts
    pub fn start(&self, depth: usize) -> usize {
        self.levels[depth].start
    }

    /// Where the content of the ancestor at `depth` ends
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position just before the ancestor at `depth` (depth >= 1)
    pub fn before(&self, depth: usize) -> usize {
        debug_assert!(depth >= 1, "the root has no position before it");
        self.start(depth) - 1
    }

    /// Position just after the ancestor at `depth` (depth >= 1)
    pub fn after(&self, depth: usize) -> usize {
        debug_assert!(depth >= 1, "the root has no position after it");
        self.end(depth) + 1
    }

    pub fn index(&self, depth: usize) -> usize {
        self.levels[depth].index
    }

    /// Path from the root to the parent node
    pub fn path(&self) -> Path {
        self.levels[..self.depth()].iter().map(|l| l.index).collect()
    }

    /// Deepest depth whose content contains both this position and `pos`
    pub fn shared_depth(&self, pos: usize) -> usize {
        (0..=self.depth())
            .rev()
            .find(|&d| self.start(d) <= pos && self.end(d) >= pos)
            .unwrap_or(0)
    }

    /// Whether both positions sit directly in the same parent node
    pub fn same_parent(&self, other: &ResolvedPos) -> bool {
        self.depth() == other.depth() && self.start(self.depth()) == other.start(other.depth())
    }

    /// The node (or part of a text node) directly before the position
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        if self.text_offset > 0 {
            return parent.child(index).map(|n| n.cut(0, self.text_offset));
        }
        index.checked_sub(1).and_then(|i| parent.child(i)).cloned()
    }

    /// The node (or part of a text node) directly after the position
    pub fn node_after(&self) -> Option<Node> {
        let child = self.parent().child(self.index(self.depth()))?;
        if self.text_offset > 0 {
            return Some(child.cut(self.text_offset, child.size()));
        }
        Some(child.clone())
    }
}

impl Node {
    /// The node at `path`, if the path exists
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter().try_fold(self, |node, &index| node.child(index))
    }

    /// Position just before the node at `path`
    pub fn position_of(&self, path: &[usize]) -> Result<usize> {
        let mut pos = 0;
        let mut node = self;
        for (depth, &index) in path.iter().enumerate() {
            let child = node
                .child(index)
                .ok_or_else(|| DocModelError::InvalidPath(path.to_vec()))?;
            pos += node.children()[..index].iter().map(Node::size).sum::<usize>();
            if depth + 1 < path.len() {
                pos += 1;
            }
            node = child;
        }
        Ok(pos)
    }

    /// Locate a node by identity with a depth-first search
    pub fn find_path(&self, id: NodeId) -> Option<Path> {
        if self.id() == Some(id) {
            return Some(Vec::new());
        }
        self.children().iter().enumerate().find_map(|(index, child)| {
            child.find_path(id).map(|mut rest| {
                rest.insert(0, index);
                rest
            })
        })
    }

    /// First position inside a textblock, where a caret can be placed
    pub fn first_text_position(&self) -> Option<usize> {
        fn search(node: &Node, content_start: usize) -> Option<usize> {
            if node.is_textblock() {
                return Some(content_start);
            }
            let mut pos = content_start;
            for child in node.children() {
                if !child.is_text() && !child.is_atom() {
                    if let Some(found) = search(child, pos + 1) {
                        return Some(found);
                    }
                }
                pos += child.size();
            }
            None
        }
        search(self, 0)
    }
}
