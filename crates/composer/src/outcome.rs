//! Command outcomes
//!
//! Commands never fail outward. Anything that stops a command (an unresolved
//! selection, a structural error, a cancelled prompt, a collaborator failure)
//! becomes [`CommandOutcome::NoOp`] with a [`Diagnostic`] the host may show as
//! a transient notice.

use crate::CollaboratorError;
use edit_engine::EditError;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied,
    NoOp(Diagnostic),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CommandOutcome::Applied => None,
            CommandOutcome::NoOp(diagnostic) => Some(diagnostic),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The composer has no resolvable selection (e.g. it is unfocused)
    SelectionUnavailable,
    /// The command ran but had nothing to change
    Unchanged,
    /// The selected table is already first or last among its siblings
    NoSiblingInDirection,
    NotTableSelected,
    /// The user cancelled a prompt
    Cancelled,
    /// A structural edit was rejected; the document is untouched
    Rejected(EditError),
    /// The clipboard or prompt failed; the document is untouched
    CollaboratorFailure(CollaboratorError),
}

impl From<EditError> for Diagnostic {
    fn from(err: EditError) -> Self {
        match err {
            EditError::SelectionUnavailable => Diagnostic::SelectionUnavailable,
            EditError::NotTableSelected => Diagnostic::NotTableSelected,
            err => Diagnostic::Rejected(err),
        }
    }
}

impl From<CollaboratorError> for Diagnostic {
    fn from(err: CollaboratorError) -> Self {
        Diagnostic::CollaboratorFailure(err)
    }
}
