//! Command trait for document editing

use crate::{Result, Selection, Transaction};
use doc_model::Node;

/// A discrete editing action.
///
/// Commands only compute a [`Transaction`] against the snapshot they are
/// given; committing it (history, selection rebasing) is the engine's job, so
/// a command that fails leaves no trace.
pub trait Command: std::fmt::Debug {
    /// Build the transaction for this command
    fn apply(&self, doc: &Node, selection: Selection) -> Result<Transaction>;

    /// Get a display name for this command
    fn display_name(&self) -> &str;
}
