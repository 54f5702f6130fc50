#![forbid(unsafe_code)]

//! Template compilation: binding text nodes to reactive state.
//!
//! # Design
//!
//! [`compile`] runs once per component. It moves the mount element's children
//! into a scratch fragment, walks the fragment depth-first, and turns every
//! text node whose content parses as a [`Template`] into a [`TextBinding`].
//! Each binding renders once immediately, then the children are moved back in
//! their original order.
//!
//! A binding owns one [`Subscriber`] whose callback re-runs the same render
//! routine. Every render, first or triggered, goes through
//! [`Collector::collect`], so the properties read during that render register
//! the binding. Renders are full: the whole text is recomputed from the
//! template and written over the node.
//!
//! # Invariants
//!
//! 1. After `compile` returns, every placeholder-bearing text node shows its
//!    template rendered against current state.
//! 2. Text nodes without placeholders, and all structure, are left as found.
//! 3. Bindings are only created here. None is ever removed while the owner
//!    holds it.
//!
//! # Failure Modes
//!
//! - **Missing data path**: the render fails, a warning is logged once for
//!   that attempt, the node keeps its previous text, and the binding stays
//!   subscribed to everything it managed to read.
//! - **Reentrant collection**: internal defect; returned from `compile` (after
//!   the children are reattached) or recorded on the binding when it happens
//!   during a notification.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vbind_core::{BindError, Collector, Path, Result, Subscriber, SubscriberId};
use vbind_dom::Host;

use crate::state::ReactiveState;
use crate::template::Template;

struct BindingInner<H: Host> {
    node: H::Node,
    template: Template,
    host: Rc<H>,
    state: ReactiveState,
    collector: Rc<Collector>,
    subscriber: Subscriber,
    renders: Cell<u64>,
    failures: Cell<u64>,
    last_error: RefCell<Option<BindError>>,
}

impl<H: Host> BindingInner<H> {
    /// One render under the collector. Content failures are contained here;
    /// only a collection defect is returned.
    fn run(&self) -> Result<()> {
        let rendered = self
            .collector
            .collect(&self.subscriber, || {
                self.template.render(&self.state, &self.collector)
            })
            .and_then(|render| render);
        match rendered {
            Ok(text) => {
                self.host.set_text(&self.node, &text);
                self.renders.set(self.renders.get() + 1);
                self.last_error.borrow_mut().take();
                tracing::trace!(subscriber = %self.subscriber.id(), node = ?self.node, "binding rendered");
                Ok(())
            }
            Err(defect) if defect.is_defect() => {
                self.record(defect.clone());
                Err(defect)
            }
            Err(err) => {
                tracing::warn!(
                    subscriber = %self.subscriber.id(),
                    node = ?self.node,
                    template = self.template.source(),
                    error = %err,
                    "binding render failed; keeping previous text"
                );
                self.record(err);
                Ok(())
            }
        }
    }

    fn record(&self, err: BindError) {
        self.failures.set(self.failures.get() + 1);
        *self.last_error.borrow_mut() = Some(err);
    }
}

/// One text node bound to the state it renders.
pub struct TextBinding<H: Host> {
    inner: Rc<BindingInner<H>>,
}

impl<H: Host + 'static> TextBinding<H> {
    fn new(
        node: H::Node,
        template: Template,
        host: &Rc<H>,
        state: &ReactiveState,
        collector: &Rc<Collector>,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<BindingInner<H>>| {
            let weak = weak.clone();
            let subscriber = Subscriber::new(move || {
                if let Some(binding) = weak.upgrade() {
                    // Defects are logged by the collector and recorded by run.
                    let _ = binding.run();
                }
            });
            BindingInner {
                node,
                template,
                host: Rc::clone(host),
                state: state.clone(),
                collector: Rc::clone(collector),
                subscriber,
                renders: Cell::new(0),
                failures: Cell::new(0),
                last_error: RefCell::new(None),
            }
        });
        Self { inner }
    }
}

impl<H: Host> TextBinding<H> {
    #[must_use]
    pub fn node(&self) -> &H::Node {
        &self.inner.node
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.inner.template
    }

    /// Placeholder paths in textual order.
    #[must_use]
    pub fn paths(&self) -> Vec<Path> {
        self.inner.template.paths().cloned().collect()
    }

    #[must_use]
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber.id()
    }

    /// Successful renders so far, the initial one included.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.inner.failures.get()
    }

    /// Error of the latest render, cleared by the next successful one.
    #[must_use]
    pub fn last_error(&self) -> Option<BindError> {
        self.inner.last_error.borrow().clone()
    }

    /// Render again now, exactly as a notification would.
    ///
    /// # Errors
    ///
    /// [`BindError::ReentrantCollection`] if called from inside another
    /// binding's render.
    pub fn refresh(&self) -> Result<()> {
        self.inner.run()
    }
}

impl<H: Host> fmt::Debug for TextBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBinding")
            .field("node", &self.inner.node)
            .field("template", &self.inner.template.source())
            .field("subscriber", &self.inner.subscriber.id())
            .field("renders", &self.inner.renders.get())
            .field("failures", &self.inner.failures.get())
            .finish()
    }
}

struct Compiler<'a, H: Host> {
    host: &'a Rc<H>,
    state: &'a ReactiveState,
    collector: &'a Rc<Collector>,
    bindings: Vec<TextBinding<H>>,
}

impl<H: Host + 'static> Compiler<'_, H> {
    fn walk(&mut self, node: &H::Node) -> Result<()> {
        for child in self.host.child_nodes(node) {
            if self.host.node_kind(&child).is_container() {
                self.walk(&child)?;
                continue;
            }
            let Some(template) = Template::parse(&self.host.text(&child)) else {
                continue;
            };
            let binding = TextBinding::new(child, template, self.host, self.state, self.collector);
            binding.inner.run()?;
            self.bindings.push(binding);
        }
        Ok(())
    }
}

/// Bind every placeholder-bearing text node under `mount`.
///
/// # Errors
///
/// [`BindError::ReentrantCollection`] if `collector` is already collecting.
/// Per-binding data errors are contained and reported on the binding.
pub fn compile<H: Host + 'static>(
    host: &Rc<H>,
    mount: &H::Node,
    state: &ReactiveState,
    collector: &Rc<Collector>,
) -> Result<Vec<TextBinding<H>>> {
    let span = tracing::debug_span!("template.compile", bindings = tracing::field::Empty);
    let _guard = span.enter();

    let fragment = host.create_fragment();
    while let Some(child) = host.move_first_child(mount) {
        host.append_child(&fragment, &child);
    }

    let mut compiler = Compiler {
        host,
        state,
        collector,
        bindings: Vec::new(),
    };
    let walked = compiler.walk(&fragment);

    while let Some(child) = host.move_first_child(&fragment) {
        host.append_child(mount, &child);
    }
    walked?;

    span.record("bindings", compiler.bindings.len());
    tracing::debug!(bindings = compiler.bindings.len(), "template compiled");
    Ok(compiler.bindings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
