//! Host collaborators the composer calls out to

use crate::CollaboratorError;
use store::TableDefaults;

/// The host clipboard
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CollaboratorError>;
}

/// Blocking prompts for data a command needs from the user.
///
/// `Ok(None)` means the user cancelled; the command then ends without
/// touching the document.
pub trait Prompt {
    /// Ask for a link URL, showing the current one if any
    fn link_url(&mut self, current: Option<&str>) -> Result<Option<String>, CollaboratorError>;

    fn image_url(&mut self) -> Result<Option<String>, CollaboratorError>;

    /// Ask for table dimensions, starting from `defaults`
    fn table_size(
        &mut self,
        defaults: TableDefaults,
    ) -> Result<Option<TableDefaults>, CollaboratorError>;
}
