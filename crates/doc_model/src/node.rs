//! Document nodes - immutable tree elements with cached sizes

use crate::{schema, DocModelError, Fragment, MarkSet, NodeId, Result};
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Table,
    TableRow,
    TableCell,
    BulletList,
    ListItem,
    Image,
    HorizontalRule,
    Text,
}

impl NodeType {
    /// Blocks whose content is inline text
    pub fn is_textblock(self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::Heading)
    }

    /// Leaf blocks that occupy a single position
    pub fn is_atom(self) -> bool {
        matches!(self, NodeType::Image | NodeType::HorizontalRule)
    }
}

/// A node's type together with its attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading { level: u8 },
    Table,
    TableRow,
    TableCell { header: bool },
    BulletList,
    ListItem,
    Image { src: String },
    HorizontalRule,
    Text { text: String, marks: MarkSet },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Doc => NodeType::Doc,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::Heading { .. } => NodeType::Heading,
            NodeKind::Table => NodeType::Table,
            NodeKind::TableRow => NodeType::TableRow,
            NodeKind::TableCell { .. } => NodeType::TableCell,
            NodeKind::BulletList => NodeType::BulletList,
            NodeKind::ListItem => NodeType::ListItem,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::HorizontalRule => NodeType::HorizontalRule,
            NodeKind::Text { .. } => NodeType::Text,
        }
    }
}

/// An immutable document node.
///
/// Container nodes own a [`Fragment`] of children. Every node caches its
/// flattened size: text counts its chars, atoms count 1, and other nodes count
/// their content plus an opening and a closing boundary. The `Doc` root has no
/// boundaries, so document positions run from 0 to `content_size()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Option<NodeId>,
    kind: NodeKind,
    content: Fragment,
    size: usize,
}

impl Node {
    /// Create a container or atom node, validating its children against the schema
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Result<Node> {
        if let NodeKind::Text { .. } = kind {
            return match children.first() {
                Some(child) => Err(DocModelError::SchemaViolation {
                    parent: NodeType::Text,
                    child: child.node_type(),
                }),
                None => Ok(Self::build(None, kind, Fragment::empty())),
            };
        }
        schema::check_attrs(&kind)?;
        let content = Fragment::from_nodes(children);
        schema::check_content(kind.node_type(), &content)?;
        Ok(Self::build(Some(NodeId::new()), kind, content))
    }

    pub(crate) fn build(id: Option<NodeId>, kind: NodeKind, content: Fragment) -> Node {
        let size = match &kind {
            NodeKind::Text { text, .. } => text.chars().count(),
            NodeKind::Image { .. } | NodeKind::HorizontalRule => 1,
            NodeKind::Doc => content.size(),
            _ => content.size() + 2,
        };
        Self {
            id,
            kind,
            content,
            size,
        }
    }

    pub fn plain_text(text: impl Into<String>) -> Node {
        Self::text_with_marks(text, MarkSet::new())
    }

    pub fn text_with_marks(text: impl Into<String>, marks: MarkSet) -> Node {
        Self::build(
            None,
            NodeKind::Text {
                text: text.into(),
                marks,
            },
            Fragment::empty(),
        )
    }

    pub fn doc(children: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::Doc, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::Paragraph, children)
    }

    /// A paragraph holding a single unmarked text node
    pub fn paragraph_text(text: impl Into<String>) -> Node {
        Self::build(
            Some(NodeId::new()),
            NodeKind::Paragraph,
            Fragment::from_nodes(vec![Node::plain_text(text)]),
        )
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::Heading { level }, children)
    }

    pub fn table(rows: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::Table, rows)
    }

    pub fn table_row(cells: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::TableRow, cells)
    }

    pub fn table_cell(header: bool, children: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::TableCell { header }, children)
    }

    pub fn bullet_list(items: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::BulletList, items)
    }

    pub fn list_item(children: Vec<Node>) -> Result<Node> {
        Self::new(NodeKind::ListItem, children)
    }

    pub fn image(src: impl Into<String>) -> Node {
        Self::build(
            Some(NodeId::new()),
            NodeKind::Image { src: src.into() },
            Fragment::empty(),
        )
    }

    pub fn horizontal_rule() -> Node {
        Self::build(Some(NodeId::new()), NodeKind::HorizontalRule, Fragment::empty())
    }

    /// Stable identity; `None` for text nodes
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn children(&self) -> &[Node] {
        self.content.children()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.child(index)
    }

    pub fn child_count(&self) -> usize {
        self.content.child_count()
    }

    /// Flattened length of this node including its boundaries
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn content_size(&self) -> usize {
        self.content.size()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn marks(&self) -> Option<&MarkSet> {
        match &self.kind {
            NodeKind::Text { marks, .. } => Some(marks),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_textblock(&self) -> bool {
        self.node_type().is_textblock()
    }

    pub fn is_atom(&self) -> bool {
        self.node_type().is_atom()
    }

    /// Same node with new content; the content is checked against the schema
    pub fn with_content(&self, content: Fragment) -> Result<Node> {
        if self.is_text() || self.is_atom() {
            if let Some(child) = content.children().first() {
                return Err(DocModelError::SchemaViolation {
                    parent: self.node_type(),
                    child: child.node_type(),
                });
            }
            return Ok(self.clone());
        }
        schema::check_content(self.node_type(), &content)?;
        Ok(Self::build(self.id, self.kind.clone(), content))
    }

    /// Same identity and content under a different type
    pub fn with_kind(&self, kind: NodeKind) -> Result<Node> {
        if self.is_text() || matches!(kind, NodeKind::Text { .. }) {
            return Err(DocModelError::InvalidAttribute {
                node: self.node_type(),
                reason: "text nodes cannot be retyped".to_string(),
            });
        }
        schema::check_attrs(&kind)?;
        schema::check_content(kind.node_type(), &self.content)?;
        Ok(Self::build(self.id, kind, self.content.clone()))
    }

    /// Same text with a different mark set; non-text nodes are returned unchanged
    pub fn with_marks(&self, marks: MarkSet) -> Node {
        match self.text() {
            Some(text) => Node::text_with_marks(text, marks),
            None => self.clone(),
        }
    }

    /// Keep only the content between `from` and `to` (content coordinates)
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.kind {
            NodeKind::Text { text, marks } => {
                Node::text_with_marks(char_slice(text, from, to), marks.clone())
            }
            _ if self.is_atom() => self.clone(),
            _ => Self::build(self.id, self.kind.clone(), self.content.cut(from, to)),
        }
    }

    /// Deep copy with new identities, used when content is duplicated
    pub fn with_fresh_ids(&self) -> Node {
        let id = self.id.map(|_| NodeId::new());
        Self::build(id, self.kind.clone(), self.content.with_fresh_ids())
    }

    /// All text in this node, concatenated without separators
    pub fn text_content(&self) -> String {
        match self.text() {
            Some(text) => text.to_string(),
            None => self.content.text_content(),
        }
    }

    /// Whether two nodes are the same snapshot (same identity, shared content)
    pub fn same_snapshot(&self, other: &Node) -> bool {
        self.id == other.id && self.content.ptr_eq(&other.content)
    }

    /// Same node with the child at `index` swapped for `node`
    pub fn replace_child(&self, index: usize, node: Node) -> Result<Node> {
        if index >= self.child_count() {
            return Err(DocModelError::InvalidPath(vec![index]));
        }
        self.with_content(self.content.replace_child(index, node))
    }

    /// Rebuild the ancestor chain down `path`, putting `node` at its end
    pub fn replace_at_path(&self, path: &[usize], node: Node) -> Result<Node> {
        match path.split_first() {
            None => Ok(node),
            Some((&index, rest)) => {
                let child = self
                    .child(index)
                    .ok_or_else(|| DocModelError::InvalidPath(path.to_vec()))?;
                let replaced = child.replace_at_path(rest, node)?;
                self.replace_child(index, replaced)
            }
        }
    }
}

/// Slice a string by char offsets, clamping to its length
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let start = byte_at(from);
    let end = byte_at(to.max(from));
    &text[start..end]
}
