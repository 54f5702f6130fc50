#![forbid(unsafe_code)]

//! Document trees: the [`Host`] contract and an in-memory implementation.

pub mod host;
pub mod markup;
pub mod memory;

pub use host::{Host, NodeKind};
pub use markup::MarkupError;
pub use memory::{MemoryDocument, NodeId};
