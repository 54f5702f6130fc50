#![forbid(unsafe_code)]

//! Core: state values, paths, errors, and dependency collection.

pub mod dep;
pub mod error;
pub mod logging;
pub mod path;
pub mod value;

pub use dep::{Collector, Publisher, Subscriber, SubscriberId};
pub use error::{BindError, Result};
pub use path::Path;
pub use value::{Map, Value};
