#![forbid(unsafe_code)]

//! Property paths into the state tree.

use std::fmt;

/// A property path: the ordered keys walked from the state root.
///
/// The textual form joins segments with `.`; `Path::parse("user.name")` has
/// segments `["user", "name"]`. Segments are stored individually so keys that
/// themselves contain dots stay unambiguous inside the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path (the state root).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a dotted path. Empty segments are dropped.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    #[must_use]
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    /// The path without its last segment. `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` lies strictly below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Path) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }

    /// Every non-empty prefix, shortest first: `a`, `a.b`, `a.b.c`.
    pub fn prefixes(&self) -> impl Iterator<Item = Path> + '_ {
        (1..=self.segments.len()).map(|n| Self {
            segments: self.segments[..n].to_vec(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for Path {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl From<String> for Path {
    fn from(dotted: String) -> Self {
        Self::parse(&dotted)
    }
}
