//! Error types for the composer session

use thiserror::Error;

/// Failure reported by a host collaborator (clipboard or prompt)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

/// Failure to start a composer session
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Edit error: {0}")]
    Edit(#[from] edit_engine::EditError),
}

pub type Result<T> = std::result::Result<T, ComposerError>;
