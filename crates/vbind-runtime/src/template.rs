#![forbid(unsafe_code)]

//! Text templates with `{{ dotted.path }}` placeholders.
//!
//! A placeholder is `{{`, optional whitespace, a dotted identifier path,
//! optional whitespace, `}}`. Identifiers are `[A-Za-z_$][A-Za-z0-9_$]*`.
//! Anything else, including brace runs that do not form a placeholder, is
//! literal text.
//!
//! Templates are parsed once into literal and path segments, so rendering is
//! a concatenation and substituted values are never rescanned for
//! placeholders.

use std::sync::LazyLock;

use regex::Regex;
use vbind_core::{BindError, Collector, Path, Result, Value};

use crate::state::ReactiveState;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*)\s*\}\}")
        .expect("placeholder pattern is valid")
});

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Path(Path),
}

/// The parsed form of a text node's original content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `text`. `None` if it contains no placeholder.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_owned()));
            }
            segments.push(Segment::Path(Path::parse(path.as_str())));
            last = whole.end();
        }
        if segments.is_empty() {
            return None;
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_owned()));
        }
        Some(Self {
            source: text.to_owned(),
            segments,
        })
    }

    /// The original text, placeholders included.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder paths in textual order. Repeats are kept.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Path(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.paths().count()
    }

    /// Render with a caller-supplied lookup.
    ///
    /// Every path is looked up, left to right, even after a failure, so a
    /// tracking lookup sees all of the template's dependencies. The first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// The first error returned by `lookup`.
    pub fn render_with(&self, mut lookup: impl FnMut(&Path) -> Result<Value>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut first_error: Option<BindError> = None;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Path(path) => match lookup(path) {
                    Ok(value) => out.push_str(&value.to_string()),
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                },
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    /// Render against `state`, tracking every read through `collector`.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingDataPath`] for the first path that does not
    /// resolve.
    pub fn render(&self, state: &ReactiveState, collector: &Collector) -> Result<String> {
        self.render_with(|path| state.get_tracked(path, collector))
    }
}
