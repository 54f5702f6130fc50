#![forbid(unsafe_code)]

//! Component bootstrap.
//!
//! A [`Component`] is built from [`ComponentOptions`] in a fixed order:
//! instrument `data`, build the instance [`Proxy`], resolve the mount element
//! from `el`, compile the template under it. There is no re-initialization;
//! dropping the component drops its bindings, which unsubscribes them.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use vbind_core::Value;
//! use vbind_dom::MemoryDocument;
//! use vbind_runtime::{Component, ComponentOptions};
//!
//! let doc = Rc::new(MemoryDocument::parse(r#"<div id="app">Hello {{user.name}}</div>"#).unwrap());
//! let app = Component::new(
//!     Rc::clone(&doc),
//!     ComponentOptions::new("#app").data(Value::object([("user", Value::object([("name", "Ann")]))])),
//! )
//! .unwrap();
//! assert_eq!(doc.text_content(*app.el()), "Hello Ann");
//!
//! app.prop("user").unwrap().field("name").set("Bo").unwrap();
//! assert_eq!(doc.text_content(*app.el()), "Hello Bo");
//! ```

use std::fmt;
use std::rc::Rc;

use vbind_core::{BindError, Collector, Result, Value};
use vbind_dom::Host;

use crate::compile::{TextBinding, compile};
use crate::proxy::{Prop, Proxy};
use crate::state::ReactiveState;

/// Construction options: where to mount and what state to bind.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "options-config", derive(serde::Deserialize))]
pub struct ComponentOptions {
    /// Selector of the mount element.
    pub el: String,
    /// Initial state. Non-object data yields an empty state.
    #[cfg_attr(feature = "options-config", serde(default))]
    pub data: Value,
}

impl ComponentOptions {
    #[must_use]
    pub fn new(el: impl Into<String>) -> Self {
        Self {
            el: el.into(),
            data: Value::Null,
        }
    }

    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// Parse options from a JSON document such as
    /// `{"el": "#app", "data": {"count": 1}}`.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidOptions`] for malformed JSON or an empty `el`.
    #[cfg(feature = "options-config")]
    pub fn from_json_str(source: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(source)
            .map_err(|e| BindError::invalid_options(format!("json: {e}")))?;
        options.validated()
    }

    /// Parse options from TOML: a top-level `el` key and a `[data]` table.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidOptions`] for malformed TOML or an empty `el`.
    #[cfg(feature = "options-config")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let options: Self = toml::from_str(source)
            .map_err(|e| BindError::invalid_options(format!("toml: {e}")))?;
        options.validated()
    }

    #[cfg(feature = "options-config")]
    fn validated(self) -> Result<Self> {
        if self.el.trim().is_empty() {
            return Err(BindError::invalid_options("`el` must be a non-empty selector"));
        }
        Ok(self)
    }
}

/// A mounted component: reactive state bound to a document subtree.
pub struct Component<H: Host> {
    options: ComponentOptions,
    state: ReactiveState,
    proxy: Proxy,
    el: H::Node,
    bindings: Vec<TextBinding<H>>,
    collector: Rc<Collector>,
    host: Rc<H>,
}

impl<H: Host + 'static> Component<H> {
    /// Instrument, proxy, and compile.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidMountSelector`] if `el` matches nothing; the
    /// template is not compiled in that case.
    pub fn new(host: Rc<H>, options: ComponentOptions) -> Result<Self> {
        let span = tracing::debug_span!("component.new", el = %options.el);
        let _guard = span.enter();

        let state = ReactiveState::observe(options.data.clone());
        let proxy = Proxy::new(&state);
        let el = host
            .query_element(&options.el)
            .ok_or_else(|| BindError::InvalidMountSelector {
                selector: options.el.clone(),
            })?;
        let collector = Rc::new(Collector::new());
        let bindings = compile(&host, &el, &state, &collector)?;

        tracing::debug!(
            keys = proxy.keys().len(),
            properties = state.len(),
            bindings = bindings.len(),
            "component mounted"
        );
        Ok(Self {
            options,
            state,
            proxy,
            el,
            bindings,
            collector,
            host,
        })
    }
}

impl<H: Host> Component<H> {
    /// Untracked read of a top-level property.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] for keys the data did not have.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.proxy.get(key)
    }

    /// Write a top-level property; bound text updates before this returns.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] for keys the data did not have.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.proxy.set(key, value)
    }

    /// Handle to a top-level property, for chained nested access.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] for keys the data did not have.
    pub fn prop(&self, key: &str) -> Result<Prop> {
        self.proxy.prop(key)
    }

    /// Options as given at construction. Current values live in
    /// [`state`](Self::state).
    #[must_use]
    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }

    /// The mount element.
    #[must_use]
    pub fn el(&self) -> &H::Node {
        &self.el
    }

    #[must_use]
    pub fn state(&self) -> &ReactiveState {
        &self.state
    }

    #[must_use]
    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    #[must_use]
    pub fn bindings(&self) -> &[TextBinding<H>] {
        &self.bindings
    }

    #[must_use]
    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }
}

impl<H: Host> fmt::Debug for Component<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("el", &self.options.el)
            .field("mount", &self.el)
            .field("state", &self.state)
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
