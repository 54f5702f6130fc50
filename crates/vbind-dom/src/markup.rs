#![forbid(unsafe_code)]

//! HTML reading and writing for [`MemoryDocument`], backed by `html5ever`.
//!
//! Reading parses a fragment in a `<body>` context, then copies the parsed
//! tree into the document arena. Implied end tags, character references, and
//! error recovery are whatever the HTML parsing algorithm does. Comments,
//! doctypes, and processing instructions are dropped; `<template>` contents
//! are not copied.
//!
//! Writing drives `html5ever`'s serializer straight from the arena, so void
//! elements and escaping match what a browser would emit.

use std::io;

use html5ever::serialize::{self, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, ParseOpts, QualName, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as ParsedData, RcDom};
use thiserror::Error;

use crate::memory::{MemoryDocument, NodeData, NodeEntry, NodeId};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("failed to read markup: {0}")]
    Read(String),
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

fn attribute_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

/// Parse `source` and append the resulting top-level nodes under `parent`.
///
/// Nothing is attached unless the whole input was read.
pub(crate) fn parse_into(
    doc: &MemoryDocument,
    parent: NodeId,
    source: &str,
) -> Result<(), MarkupError> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        html_name("body"),
        Vec::new(),
    )
    .from_utf8()
    .read_from(&mut source.as_bytes())
    .map_err(|e| MarkupError::Read(e.to_string()))?;

    // Fragment parsing wraps the result in a synthetic <html> element.
    let mut pending: Vec<(NodeId, Handle)> = Vec::new();
    for wrapper in dom.document.children.borrow().iter() {
        for child in wrapper.children.borrow().iter().rev() {
            pending.push((parent, child.clone()));
        }
    }
    // Explicit stack: pathological nesting must not exhaust the call stack.
    while let Some((into, handle)) = pending.pop() {
        match &handle.data {
            ParsedData::Element { name, attrs, .. } => {
                let element = doc.create_element(name.local.as_ref());
                for attr in attrs.borrow().iter() {
                    doc.set_attribute(element, attr.name.local.as_ref(), &attr.value);
                }
                doc.append(into, element);
                for child in handle.children.borrow().iter().rev() {
                    pending.push((element, child.clone()));
                }
            }
            ParsedData::Text { contents } => {
                let text = doc.create_text(&contents.borrow());
                doc.append(into, text);
            }
            _ => {}
        }
    }
    Ok(())
}

/// One arena node as seen by the `html5ever` serializer.
struct Subtree<'a> {
    nodes: &'a [NodeEntry],
    node: NodeId,
}

impl Subtree<'_> {
    fn serialize_children<S: Serializer>(&self, serializer: &mut S) -> io::Result<()> {
        for &child in &self.nodes[self.node.index()].children {
            let subtree = Subtree {
                nodes: self.nodes,
                node: child,
            };
            subtree.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let entry = &self.nodes[self.node.index()];
        match (&entry.data, traversal_scope) {
            (NodeData::Element { tag, attrs }, TraversalScope::IncludeNode) => {
                let name = html_name(tag);
                let attrs: Vec<(QualName, &str)> = attrs
                    .iter()
                    .map(|(key, value)| (attribute_name(key), value.as_str()))
                    .collect();
                serializer.start_elem(name.clone(), attrs.iter().map(|(k, v)| (k, *v)))?;
                self.serialize_children(serializer)?;
                serializer.end_elem(name)
            }
            (NodeData::Text(text), TraversalScope::IncludeNode) => serializer.write_text(text),
            _ => self.serialize_children(serializer),
        }
    }
}

/// Serialize `node` (or only its children) into a string.
pub(crate) fn write_markup(nodes: &[NodeEntry], node: NodeId, include_node: bool) -> String {
    let traversal_scope = if include_node {
        TraversalScope::IncludeNode
    } else {
        TraversalScope::ChildrenOnly(None)
    };
    let opts = SerializeOpts {
        traversal_scope,
        ..SerializeOpts::default()
    };
    let mut out = Vec::new();
    if let Err(err) = serialize::serialize(&mut out, &Subtree { nodes, node }, opts) {
        tracing::warn!(%node, error = %err, "markup serialization stopped early");
    }
    String::from_utf8_lossy(&out).into_owned()
}
