//! Error types for editing operations

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Undo stack is empty")]
    UndoStackEmpty,

    #[error("Redo stack is empty")]
    RedoStackEmpty,

    #[error("Selection is not available")]
    SelectionUnavailable,

    #[error("No table is selected")]
    NotTableSelected,

    #[error("Transaction was built against an older document")]
    StaleTransaction,
}

pub type Result<T> = std::result::Result<T, EditError>;
