//! Store - Markup exchange, counting, and settings
//!
//! This crate handles parsing incoming HTML into the document model,
//! re-serializing documents after each edit, the read-only character/word
//! counter, and composer settings persistence.

mod counter;
mod error;
mod markup;
mod settings;

pub use counter::*;
pub use error::*;
pub use markup::*;
pub use settings::*;
