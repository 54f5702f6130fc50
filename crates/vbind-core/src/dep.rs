#![forbid(unsafe_code)]

//! Dependency collection: publishers, subscribers, and the active collector.
//!
//! # Design
//!
//! A [`Publisher`] belongs to exactly one observable property and records the
//! [`Subscriber`]s that read it. A [`Collector`] marks which subscriber is
//! currently evaluating; every tracked read made while it is collecting
//! registers that subscriber with the publisher being read.
//!
//! The collector is an explicit value owned by one component instance and
//! handed to each tracked read, so no process-wide slot exists.
//!
//! # Invariants
//!
//! 1. A publisher notifies its subscribers in subscription order.
//! 2. A subscriber is registered at most once per publisher (set semantics).
//! 3. Publishers hold subscribers weakly; dropped subscribers are pruned
//!    lazily and never invoked.
//! 4. The collector is collecting only for the duration of one
//!    [`Collector::collect`] call, and returns to idle even if the evaluation
//!    panics.
//! 5. Collection is non-reentrant: starting a second collection while one is
//!    active fails with [`BindError::ReentrantCollection`].
//!
//! # Failure Modes
//!
//! - **Subscriber callback panics during notify**: the panic propagates to the
//!   writer; subscribers later in the order are not invoked for that write.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{BindError, Result};

// ─── Subscriber ID generation ────────────────────────────────────────────────

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

fn next_subscriber_id() -> SubscriberId {
    SubscriberId(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Unique identity of a [`Subscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

// ─── Subscriber ──────────────────────────────────────────────────────────────

struct SubscriberInner {
    id: SubscriberId,
    callback: Box<dyn Fn()>,
}

/// One reactive computation: a no-argument callback with an identity.
///
/// Cloning yields another handle to the same subscriber (same id).
#[derive(Clone)]
pub struct Subscriber {
    inner: Rc<SubscriberInner>,
}

impl Subscriber {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(SubscriberInner {
                id: next_subscriber_id(),
                callback: Box::new(callback),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Run the wrapped callback.
    pub fn update(&self) {
        (self.inner.callback)();
    }

    fn downgrade(&self) -> WeakSubscriber {
        WeakSubscriber {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.inner.id).finish()
    }
}

#[derive(Clone)]
struct WeakSubscriber {
    id: SubscriberId,
    inner: Weak<SubscriberInner>,
}

impl WeakSubscriber {
    fn upgrade(&self) -> Option<Subscriber> {
        self.inner.upgrade().map(|inner| Subscriber { inner })
    }

    fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ─── Publisher ───────────────────────────────────────────────────────────────

/// Per-property registry of interested subscribers.
#[derive(Default, Clone)]
pub struct Publisher {
    subs: Vec<WeakSubscriber>,
}

impl Publisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` unless it is already present.
    ///
    /// Returns `true` if the subscriber was added.
    pub fn depend(&mut self, subscriber: &Subscriber) -> bool {
        self.prune();
        if self.contains(subscriber.id()) {
            return false;
        }
        self.subs.push(subscriber.downgrade());
        true
    }

    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subs.iter().any(|s| s.id == id && s.is_live())
    }

    /// Live subscribers in subscription order.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.subs.iter().filter_map(WeakSubscriber::upgrade).collect()
    }

    /// Take over every live subscriber of `other`, appended after the current
    /// ones in `other`'s order, skipping duplicates.
    pub fn inherit(&mut self, other: &Publisher) {
        for sub in other.subscribers() {
            self.depend(&sub);
        }
    }

    /// Invoke every live subscriber in subscription order.
    ///
    /// The list is snapshotted first, so subscribers registered during the
    /// pass are not invoked until the next notification.
    pub fn notify(&self) {
        for sub in self.subscribers() {
            sub.update();
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.iter().filter(|s| s.is_live()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.subs.retain(WeakSubscriber::is_live);
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<SubscriberId> = self
            .subs
            .iter()
            .filter(|s| s.is_live())
            .map(|s| s.id)
            .collect();
        f.debug_struct("Publisher").field("subscribers", &ids).finish()
    }
}

// ─── Collector ───────────────────────────────────────────────────────────────

/// The active-collector slot: idle, or collecting for exactly one subscriber.
#[derive(Debug, Default)]
pub struct Collector {
    active: RefCell<Option<Subscriber>>,
}

/// Resets the slot to idle when dropped.
struct CollectGuard<'a> {
    slot: &'a RefCell<Option<Subscriber>>,
}

impl Drop for CollectGuard<'_> {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
    }
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `eval` with `subscriber` as the active collector.
    ///
    /// Every tracked read inside `eval` registers `subscriber`. The slot is
    /// cleared when `eval` returns or unwinds.
    ///
    /// # Errors
    ///
    /// [`BindError::ReentrantCollection`] if a collection is already active;
    /// `eval` is not run in that case.
    pub fn collect<R>(&self, subscriber: &Subscriber, eval: impl FnOnce() -> R) -> Result<R> {
        if let Some(active) = self.active() {
            tracing::error!(
                %active,
                requested = %subscriber.id(),
                "reentrant dependency collection refused"
            );
            return Err(BindError::ReentrantCollection {
                active,
                requested: subscriber.id(),
            });
        }
        *self.active.borrow_mut() = Some(subscriber.clone());
        let _guard = CollectGuard { slot: &self.active };
        Ok(eval())
    }

    /// Register the active subscriber, if any, with `publisher`.
    ///
    /// Returns `true` if a new registration was made.
    pub fn track(&self, publisher: &mut Publisher) -> bool {
        match self.active.borrow().as_ref() {
            Some(subscriber) => publisher.depend(subscriber),
            None => false,
        }
    }

    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.active.borrow().is_some()
    }

    #[must_use]
    pub fn active(&self) -> Option<SubscriberId> {
        self.active.borrow().as_ref().map(Subscriber::id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
