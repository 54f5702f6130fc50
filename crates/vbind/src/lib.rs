#![forbid(unsafe_code)]

//! vbind public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use vbind_core::{BindError, Path, Result, Value};
pub use vbind_dom::{Host, MemoryDocument, NodeId};
pub use vbind_runtime::{Component, ComponentOptions};

pub mod prelude {
    pub use vbind_core as core;
    pub use vbind_dom as dom;
    pub use vbind_runtime as runtime;

    pub use vbind_core::{BindError, Value};
    pub use vbind_dom::{Host, MemoryDocument};
    pub use vbind_runtime::{Component, ComponentOptions, Prop};
}
