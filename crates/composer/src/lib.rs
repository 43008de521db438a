//! Composer - The editing session behind the mail composer
//!
//! Ties the document engine to its host: the toolbar/context-menu command
//! layer, keyboard routing (including the table-selection override), the
//! shared pointer-event stream, and the clipboard and prompt collaborators.

mod collaborators;
mod commands;
mod composer;
mod error;
mod keys;
mod outcome;
mod pointer;

pub use collaborators::*;
pub use composer::*;
pub use error::*;
pub use keys::*;
pub use outcome::*;
pub use pointer::*;
