//! Document Model - Core document tree structure and types
//!
//! This crate provides the structured document used by the mail composer: an
//! immutable node tree with cached sizes, schema rules for which nodes may
//! contain which, and resolution of flat positions into tree locations.

mod error;
mod fragment;
mod mark;
mod node;
mod node_id;
mod position;
pub mod schema;
mod slice;

pub use error::*;
pub use fragment::*;
pub use mark::*;
pub use node::*;
pub use node_id::*;
pub use position::*;
pub use slice::*;
