#![forbid(unsafe_code)]

//! Instance proxy: top-level state properties exposed on the component.
//!
//! The proxy is shallow. It captures the state's top-level keys once, and
//! each access delegates to the state tree, which stays the single source of
//! truth. Deeper properties are reached by chaining [`Prop::field`], which
//! walks the already-reactive tree.

use vbind_core::{BindError, Collector, Path, Result, Value};

use crate::state::ReactiveState;

/// Pass-through accessors for the state's top-level keys.
#[derive(Debug, Clone)]
pub struct Proxy {
    state: ReactiveState,
    keys: Vec<String>,
}

impl Proxy {
    #[must_use]
    pub fn new(state: &ReactiveState) -> Self {
        Self {
            state: state.clone(),
            keys: state.keys(),
        }
    }

    /// Keys mirrored at construction, in order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Handle to the top-level property `key`.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] if `key` was not a top-level key of the
    /// state when the proxy was built.
    pub fn prop(&self, key: &str) -> Result<Prop> {
        if !self.has(key) {
            return Err(BindError::unknown(Path::from_segments([key])));
        }
        Ok(Prop {
            state: self.state.clone(),
            path: Path::from_segments([key]),
        })
    }

    /// Untracked read of `key`.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] for keys outside the proxy.
    pub fn get(&self, key: &str) -> Result<Value> {
        let prop = self.prop(key)?;
        prop.get().ok_or_else(|| BindError::unknown(prop.path))
    }

    /// Write `key`, notifying its subscribers.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] for keys outside the proxy.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.prop(key)?.set(value)
    }
}

/// A property reached through the proxy.
#[derive(Debug, Clone)]
pub struct Prop {
    state: ReactiveState,
    path: Path,
}

impl Prop {
    /// The nested property `key` of this one.
    #[must_use]
    pub fn field(&self, key: &str) -> Prop {
        Prop {
            state: self.state.clone(),
            path: self.path.child(key),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Untracked read. `None` if the property does not exist (anymore).
    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.state.get(&self.path)
    }

    /// Tracked read, for code running under a collector.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingDataPath`] if a key along the path is absent.
    pub fn get_tracked(&self, collector: &Collector) -> Result<Value> {
        self.state.get_tracked(&self.path, collector)
    }

    /// Write through to the state tree.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] if the property does not exist.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        self.state.set(&self.path, value)
    }
}
