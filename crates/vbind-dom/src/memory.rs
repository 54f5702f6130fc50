#![forbid(unsafe_code)]

//! Arena-backed in-memory document.
//!
//! [`MemoryDocument`] stores every node in one `Vec` and hands out [`NodeId`]
//! indices. Nodes are never freed; detaching only clears the parent link.
//! The document root is a fragment that holds the top-level nodes.
//!
//! Selectors are compound simple selectors: an optional tag name followed by
//! any number of `#id` and `.class` parts (`div`, `#app`, `p.note`,
//! `section#main.wide`). The first match in document order wins.

use std::cell::RefCell;
use std::fmt;

use crate::host::{Host, NodeKind};
use crate::markup::{self, MarkupError};

/// Index of a node inside a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Fragment,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeEntry {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// In-memory document tree implementing [`Host`].
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: RefCell<Vec<NodeEntry>>,
    root: NodeId,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeEntry {
            data: NodeData::Fragment,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: RefCell::new(vec![root]),
            root: NodeId(0),
        }
    }

    /// Build a document from an HTML fragment.
    ///
    /// Malformed markup is recovered the way a browser would, so the only
    /// failure is the parser's input stream itself.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::Read`] if the input could not be read.
    pub fn parse(source: &str) -> Result<Self, MarkupError> {
        let doc = Self::new();
        doc.append_markup(doc.root, source)?;
        Ok(doc)
    }

    /// Parse `source` and append the resulting nodes under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::Read`] if the input could not be read; nothing
    /// is attached in that case.
    pub fn append_markup(&self, parent: NodeId, source: &str) -> Result<Vec<NodeId>, MarkupError> {
        let before = self.children(parent).len();
        markup::parse_into(self, parent, source)?;
        Ok(self.children(parent)[before..].to_vec())
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes ever created, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    fn push(&self, data: NodeData) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_owned()))
    }

    pub fn create_fragment(&self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    /// Set or replace an attribute. Ignored on non-elements.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        if let NodeData::Element { attrs, .. } = &mut nodes[node.0].data {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_owned(),
                None => attrs.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    /// Concatenated text of `node` and all its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        collect_text(&nodes, node, &mut out);
        out
    }

    /// Serialized markup of `node` itself and its subtree.
    #[must_use]
    pub fn to_markup(&self, node: NodeId) -> String {
        markup::write_markup(&self.nodes.borrow(), node, true)
    }

    /// Serialized markup of `node`'s children only.
    #[must_use]
    pub fn inner_markup(&self, node: NodeId) -> String {
        markup::write_markup(&self.nodes.borrow(), node, false)
    }

    /// All attached elements matching `selector`, in document order.
    #[must_use]
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = nodes[self.root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let entry = &nodes[id.0];
            if selector.matches(&entry.data) {
                found.push(id);
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        found
    }

    /// All text nodes under `node`, in document order.
    #[must_use]
    pub fn text_nodes(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let entry = &nodes[id.0];
            if matches!(entry.data, NodeData::Text(_)) {
                found.push(id);
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        found
    }
}

fn collect_text(nodes: &[NodeEntry], node: NodeId, out: &mut String) {
    match &nodes[node.0].data {
        NodeData::Text(text) => out.push_str(text),
        _ => {
            for &child in &nodes[node.0].children {
                collect_text(nodes, child, out);
            }
        }
    }
}

// ─── Selectors ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        if source.is_empty() || source.contains(char::is_whitespace) {
            return None;
        }
        let mut selector = Self::default();
        let mut rest = source;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            selector.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '#' => selector.id = Some(name.to_owned()),
                _ => selector.classes.push(name.to_owned()),
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    fn matches(&self, data: &NodeData) -> bool {
        let NodeData::Element { tag, attrs } = data else {
            return false;
        };
        let attr = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        if self.tag.as_ref().is_some_and(|t| t != tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| attr("id") != Some(id)) {
            return false;
        }
        let class_list = attr("class").unwrap_or("");
        self.classes
            .iter()
            .all(|c| class_list.split_whitespace().any(|have| have == c))
    }
}

// ─── Host ────────────────────────────────────────────────────────────────────

impl Host for MemoryDocument {
    type Node = NodeId;

    fn query_element(&self, selector: &str) -> Option<NodeId> {
        let found = self.query_all(selector).into_iter().next();
        if found.is_none() {
            tracing::debug!(selector, "selector matched no element");
        }
        found
    }

    fn create_fragment(&self) -> NodeId {
        MemoryDocument::create_fragment(self)
    }

    fn move_first_child(&self, from: &NodeId) -> Option<NodeId> {
        let first = self.nodes.borrow()[from.0].children.first().copied()?;
        self.detach(first);
        Some(first)
    }

    fn append_child(&self, container: &NodeId, node: &NodeId) {
        self.append(*container, *node);
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.children(*node)
    }

    fn node_kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes.borrow()[node.0].data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Fragment => NodeKind::Fragment,
        }
    }

    fn text(&self, node: &NodeId) -> String {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Text(text) => text.clone(),
            _ => String::new(),
        }
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        if let NodeData::Text(current) = &mut self.nodes.borrow_mut()[node.0].data {
            text.clone_into(current);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
