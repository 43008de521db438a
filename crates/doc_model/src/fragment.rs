//! Fragments - ordered sibling sequences used as content and insertion payloads

use crate::Node;
use std::sync::Arc;

/// An immutable, normalized sequence of sibling nodes.
///
/// Adjacent text nodes with equal marks are merged and empty text nodes are
/// dropped, so two fragments with the same content always compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    nodes: Arc<Vec<Node>>,
    size: usize,
}

/// Wrap an ordered sequence of sibling nodes as an insertion payload
pub fn fragment(nodes: Vec<Node>) -> Fragment {
    Fragment::from_nodes(nodes)
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(text) = node.text() {
                if text.is_empty() {
                    continue;
                }
                if let Some(last) = out.last_mut() {
                    if let (Some(prev), Some(marks)) = (last.text(), last.marks()) {
                        if Some(marks) == node.marks() {
                            *last = Node::text_with_marks(format!("{prev}{text}"), marks.clone());
                            continue;
                        }
                    }
                }
            }
            out.push(node);
        }
        let size = out.iter().map(Node::size).sum();
        Self {
            nodes: Arc::new(out),
            size,
        }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_nodes(vec![node])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn children(&self) -> &[Node] {
        &self.nodes
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub(crate) fn ptr_eq(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// Index of the child at `pos` and the offset where that child starts.
    ///
    /// A position on a boundary belongs to the child that follows it; the end
    /// of the fragment yields `(child_count, size)`.
    pub fn find_index(&self, pos: usize) -> (usize, usize) {
        let mut offset = 0;
        for (index, child) in self.nodes.iter().enumerate() {
            let end = offset + child.size();
            if end > pos {
                return (index, offset);
            }
            offset = end;
        }
        (self.nodes.len(), offset)
    }

    /// Content between `from` and `to`; partially covered children are cut
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to >= self.size {
            return self.clone();
        }
        if from >= to {
            return Fragment::empty();
        }
        let mut result = Vec::new();
        let mut pos = 0;
        for child in self.nodes.iter() {
            if pos >= to {
                break;
            }
            let end = pos + child.size();
            if end > from {
                let piece = if from <= pos && end <= to {
                    child.clone()
                } else if child.is_text() {
                    child.cut(from.saturating_sub(pos), (to - pos).min(child.size()))
                } else {
                    let inner = pos + 1;
                    child.cut(
                        from.saturating_sub(inner),
                        (to - inner).min(child.content_size()),
                    )
                };
                result.push(piece);
            }
            pos = end;
        }
        Fragment::from_nodes(result)
    }

    /// Splice `insert` in place of the range `from..to`
    pub fn replace(&self, from: usize, to: usize, insert: &Fragment) -> Fragment {
        self.cut(0, from)
            .append(insert)
            .append(&self.cut(to, self.size))
    }

    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        Fragment::from_nodes(self.nodes.iter().chain(other.nodes.iter()).cloned().collect())
    }

    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.as_ref().clone();
        nodes[index] = node;
        Fragment::from_nodes(nodes)
    }

    pub fn with_fresh_ids(&self) -> Fragment {
        Fragment::from_nodes(self.nodes.iter().map(Node::with_fresh_ids).collect())
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
