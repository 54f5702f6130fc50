#![forbid(unsafe_code)]

//! Runtime: reactive state, instance proxy, and template compilation.
//!
//! - [`ReactiveState`]: the instrumented state tree. Every property owns a
//!   publisher; tracked reads register the active subscriber, writes notify.
//! - [`Proxy`]: top-level properties of the state exposed on the component.
//! - [`Template`] and [`compile`]: `{{ path }}` text templates bound to state.
//! - [`Component`]: the bootstrap tying the above to a mount element.
//!
//! # Architecture
//!
//! Single-threaded. State is shared through `Rc<RefCell<..>>`; bindings are
//! `Rc` and subscribers are held weakly by publishers, so dropping a
//! component unsubscribes everything it created. Notification is synchronous:
//! when a write returns, every affected text node is already updated.

pub mod compile;
pub mod component;
pub mod proxy;
pub mod state;
pub mod template;

pub use compile::{TextBinding, compile};
pub use component::{Component, ComponentOptions};
pub use proxy::{Prop, Proxy};
pub use state::ReactiveState;
pub use template::{Segment, Template};
