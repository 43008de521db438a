//! Structural rules: which node types may contain which

use crate::{DocModelError, Fragment, Node, NodeKind, NodeType, Result};

/// Highest heading level
pub const MAX_HEADING_LEVEL: u8 = 6;

const DOC_BLOCKS: &[NodeType] = &[
    NodeType::Paragraph,
    NodeType::Heading,
    NodeType::Table,
    NodeType::BulletList,
    NodeType::Image,
    NodeType::HorizontalRule,
];

// Tables nest one level only, so cells and list items exclude them.
const NESTED_BLOCKS: &[NodeType] = &[
    NodeType::Paragraph,
    NodeType::Heading,
    NodeType::BulletList,
    NodeType::Image,
    NodeType::HorizontalRule,
];

/// Child types a node of `parent` type may hold
pub fn allowed_children(parent: NodeType) -> &'static [NodeType] {
    match parent {
        NodeType::Doc => DOC_BLOCKS,
        NodeType::Paragraph | NodeType::Heading => &[NodeType::Text],
        NodeType::Table => &[NodeType::TableRow],
        NodeType::TableRow => &[NodeType::TableCell],
        NodeType::TableCell | NodeType::ListItem => NESTED_BLOCKS,
        NodeType::BulletList => &[NodeType::ListItem],
        NodeType::Image | NodeType::HorizontalRule | NodeType::Text => &[],
    }
}

pub fn allows_child(parent: NodeType, child: NodeType) -> bool {
    allowed_children(parent).contains(&child)
}

/// Check every node in `content` may sit directly inside `parent`
pub fn check_content(parent: NodeType, content: &Fragment) -> Result<()> {
    match content
        .children()
        .iter()
        .find(|child| !allows_child(parent, child.node_type()))
    {
        Some(child) => Err(DocModelError::SchemaViolation {
            parent,
            child: child.node_type(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_attrs(kind: &NodeKind) -> Result<()> {
    match kind {
        NodeKind::Heading { level } if !(1..=MAX_HEADING_LEVEL).contains(level) => {
            Err(DocModelError::InvalidAttribute {
                node: NodeType::Heading,
                reason: format!("level {level} is outside 1..={MAX_HEADING_LEVEL}"),
            })
        }
        _ => Ok(()),
    }
}

/// Validate a node's attributes and direct children
pub fn validate(node: &Node) -> Result<()> {
    check_attrs(node.kind())?;
    check_content(node.node_type(), node.content())
}

/// Validate a whole subtree
pub fn validate_tree(node: &Node) -> Result<()> {
    validate(node)?;
    node.children().iter().try_for_each(validate_tree)
}
