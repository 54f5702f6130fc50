#![forbid(unsafe_code)]

//! The document-tree contract consumed by the template compiler.
//!
//! The compiler never creates or removes nodes other than one scratch
//! fragment. It moves a mount element's children out and back, walks the
//! tree, and reads and writes text payloads. Hosts provide exactly that.
//!
//! All methods take `&self`: bindings keep a shared handle to the host and
//! write text long after compilation, so implementations use interior
//! mutability.

use std::fmt;

/// Node discrimination as far as the compiler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    /// Detached container produced by [`Host::create_fragment`].
    Fragment,
}

impl NodeKind {
    /// Whether the compiler descends into nodes of this kind.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Element | Self::Fragment)
    }
}

/// Host environment collaborator.
pub trait Host {
    /// Handle to one node. Cheap to clone.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Resolve a selector to the first matching element.
    fn query_element(&self, selector: &str) -> Option<Self::Node>;

    /// A new, empty, detached fragment.
    fn create_fragment(&self) -> Self::Node;

    /// Detach and return the first child of `from`.
    fn move_first_child(&self, from: &Self::Node) -> Option<Self::Node>;

    /// Append `node` as the last child of `container`, detaching it from any
    /// previous parent first.
    fn append_child(&self, container: &Self::Node, node: &Self::Node);

    /// Children of `node` in document order.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn node_kind(&self, node: &Self::Node) -> NodeKind;

    /// Text payload of a text node. Empty for other kinds.
    fn text(&self, node: &Self::Node) -> String;

    /// Replace the text payload of a text node. Ignored for other kinds.
    fn set_text(&self, node: &Self::Node, text: &str);
}
