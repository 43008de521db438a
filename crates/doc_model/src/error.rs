//! Error types for document model operations

use crate::NodeType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocModelError {
    #[error("Schema violation: {child:?} is not allowed inside {parent:?}")]
    SchemaViolation { parent: NodeType, child: NodeType },

    #[error("Invalid attribute on {node:?}: {reason}")]
    InvalidAttribute { node: NodeType, reason: String },

    #[error("Position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("Invalid range: {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid path: {0:?}")]
    InvalidPath(Vec<usize>),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
