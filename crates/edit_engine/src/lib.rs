//! Edit Engine - Transactions, selection, and undo/redo
//!
//! This crate implements position-addressed editing on top of `doc_model`:
//! replace steps with position mapping, atomic transactions, the selection
//! model, undo/redo history, the editing commands, and the table controller.

mod command;
mod editing;
mod error;
mod executor;
mod formatting;
mod insert_commands;
mod selection;
mod step;
mod table_commands;
mod table_controller;
mod transaction;
mod undo;

pub use command::*;
pub use editing::*;
pub use error::*;
pub use executor::*;
pub use formatting::*;
pub use insert_commands::*;
pub use selection::*;
pub use step::*;
pub use table_commands::*;
pub use table_controller::*;
pub use transaction::*;
pub use undo::*;
