#![forbid(unsafe_code)]

//! The reactive state tree.
//!
//! # Design
//!
//! [`ReactiveState`] flattens a [`Value`] tree into one ordered arena keyed by
//! full property [`Path`]. Each entry is an observable property: its current
//! value (a leaf, or the ordered child keys of an object) and its own
//! [`Publisher`]. The root object is not itself a property; its keys are the
//! top-level properties.
//!
//! Reads come in two flavours. [`get`](ReactiveState::get) is untracked.
//! [`get_tracked`](ReactiveState::get_tracked) walks the path key by key and
//! registers the collector's active subscriber with every property it
//! touches, intermediates included, so a binding reading `user.name` also
//! depends on `user`.
//!
//! # Invariants
//!
//! 1. Every object at every depth has a slot per property, both after
//!    [`observe`](ReactiveState::observe) and after every
//!    [`set`](ReactiveState::set).
//! 2. A write notifies the written property's publisher exactly once, even if
//!    the value is unchanged.
//! 3. Subscriber callbacks run after the arena borrow is released, so they may
//!    read the state.
//! 4. Replacing an object rebinds by path: a fresh descendant publisher at a
//!    path that existed before inherits the old publisher's subscribers. Paths
//!    that vanish are dropped with their publishers.
//!
//! # Failure Modes
//!
//! - **Write to an unknown path**: [`BindError::UnknownProperty`]; nothing is
//!   written and nobody is notified. New properties cannot be added by writing.
//! - **Tracked read through a missing key**: [`BindError::MissingDataPath`];
//!   the prefixes that did resolve stay registered.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use vbind_core::{BindError, Collector, Map, Path, Publisher, Result, Value};

type SlotMap = IndexMap<Path, Slot, ahash::RandomState>;

#[derive(Debug, Clone)]
enum SlotValue {
    Leaf(Value),
    /// Child keys in insertion order; each child has its own slot.
    Object(Vec<String>),
}

#[derive(Debug)]
struct Slot {
    value: SlotValue,
    publisher: Publisher,
}

impl Slot {
    fn new(value: SlotValue) -> Self {
        Self {
            value,
            publisher: Publisher::new(),
        }
    }
}

#[derive(Debug, Default)]
struct StateTable {
    slots: SlotMap,
    roots: Vec<String>,
}

impl StateTable {
    /// Create slots for `value` at `path` and, for objects, every descendant.
    fn insert(&mut self, path: Path, value: Value) {
        match value {
            Value::Object(map) => {
                let keys = map.keys().cloned().collect();
                self.slots
                    .insert(path.clone(), Slot::new(SlotValue::Object(keys)));
                self.insert_children(&path, map);
            }
            leaf => {
                self.slots.insert(path, Slot::new(SlotValue::Leaf(leaf)));
            }
        }
    }

    fn insert_children(&mut self, parent: &Path, map: Map) {
        for (key, value) in map {
            self.insert(parent.child(key), value);
        }
    }

    fn value_at(&self, path: &Path) -> Option<Value> {
        if path.is_root() {
            return Some(self.object_from(&Path::root(), &self.roots));
        }
        match &self.slots.get(path)?.value {
            SlotValue::Leaf(value) => Some(value.clone()),
            SlotValue::Object(keys) => Some(self.object_from(path, keys)),
        }
    }

    fn object_from(&self, path: &Path, keys: &[String]) -> Value {
        let map = keys
            .iter()
            .filter_map(|key| {
                self.value_at(&path.child(key.as_str()))
                    .map(|v| (key.clone(), v))
            })
            .collect::<Map>();
        Value::Object(map)
    }

    /// Remove every slot strictly below `path` in place, returning their
    /// publishers.
    fn remove_descendants(&mut self, path: &Path) -> Vec<(Path, Publisher)> {
        let mut removed = Vec::new();
        self.slots.retain(|p, slot| {
            if p.is_descendant_of(path) {
                removed.push((p.clone(), std::mem::take(&mut slot.publisher)));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Write `value` at `path` and return a snapshot of its publisher.
    fn assign(&mut self, path: &Path, value: Value) -> Result<Publisher> {
        let was_object = match self.slots.get(path) {
            Some(slot) if !path.is_root() => matches!(slot.value, SlotValue::Object(_)),
            _ => return Err(BindError::unknown(path)),
        };
        let previous = if was_object {
            self.remove_descendants(path)
        } else {
            Vec::new()
        };

        let children = match value {
            Value::Object(map) => {
                let keys = map.keys().cloned().collect();
                self.set_slot_value(path, SlotValue::Object(keys));
                Some(map)
            }
            leaf => {
                self.set_slot_value(path, SlotValue::Leaf(leaf));
                None
            }
        };
        if let Some(map) = children {
            self.insert_children(path, map);
        }

        for (old_path, old_publisher) in &previous {
            if let Some(slot) = self.slots.get_mut(old_path) {
                slot.publisher.inherit(old_publisher);
            }
        }

        Ok(self
            .slots
            .get(path)
            .map(|slot| slot.publisher.clone())
            .unwrap_or_default())
    }

    fn set_slot_value(&mut self, path: &Path, value: SlotValue) {
        if let Some(slot) = self.slots.get_mut(path) {
            slot.value = value;
        }
    }
}

/// Shared handle to an instrumented state tree.
///
/// Cloning yields another handle to the **same** tree.
#[derive(Clone, Default)]
pub struct ReactiveState {
    table: Rc<RefCell<StateTable>>,
}

impl ReactiveState {
    /// Instrument `data`.
    ///
    /// Anything other than an object produces an empty tree; that is not an
    /// error.
    #[must_use]
    pub fn observe(data: Value) -> Self {
        let mut table = StateTable::default();
        match data {
            Value::Object(map) => {
                table.roots = map.keys().cloned().collect();
                table.insert_children(&Path::root(), map);
            }
            other => {
                tracing::debug!(kind = other.kind(), "observe target is not an object; state is empty");
            }
        }
        tracing::trace!(properties = table.slots.len(), "state instrumented");
        Self {
            table: Rc::new(RefCell::new(table)),
        }
    }

    /// Untracked read. Objects are reassembled from their slots.
    #[must_use]
    pub fn get(&self, path: impl Into<Path>) -> Option<Value> {
        self.table.borrow().value_at(&path.into())
    }

    /// Read `path`, registering the collector's active subscriber with every
    /// property on the way.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingDataPath`] naming the first key that does not
    /// resolve.
    pub fn get_tracked(&self, path: &Path, collector: &Collector) -> Result<Value> {
        let mut table = self.table.borrow_mut();
        for prefix in path.prefixes() {
            let Some(slot) = table.slots.get_mut(&prefix) else {
                let missing = prefix.last().unwrap_or_default().to_owned();
                return Err(BindError::missing(path, missing));
            };
            collector.track(&mut slot.publisher);
        }
        table
            .value_at(path)
            .ok_or_else(|| BindError::missing(path, path.last().unwrap_or_default()))
    }

    /// Write `value` at an existing property and notify its subscribers.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownProperty`] if `path` does not name a property.
    pub fn set(&self, path: impl Into<Path>, value: impl Into<Value>) -> Result<()> {
        let path = path.into();
        let publisher = self.table.borrow_mut().assign(&path, value.into())?;
        tracing::trace!(path = %path, subscribers = publisher.len(), "state write");
        publisher.notify();
        Ok(())
    }

    /// Top-level property keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.table.borrow().roots.clone()
    }

    #[must_use]
    pub fn contains(&self, path: impl Into<Path>) -> bool {
        self.table.borrow().slots.contains_key(&path.into())
    }

    /// Every property path, parents before their children.
    #[must_use]
    pub fn paths(&self) -> Vec<Path> {
        self.table.borrow().slots.keys().cloned().collect()
    }

    /// Number of observable properties at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live subscribers registered with the property at `path`.
    #[must_use]
    pub fn subscriber_count(&self, path: impl Into<Path>) -> usize {
        self.table
            .borrow()
            .slots
            .get(&path.into())
            .map_or(0, |slot| slot.publisher.len())
    }

    /// The whole tree as a plain value.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.table
            .borrow()
            .value_at(&Path::root())
            .unwrap_or_default()
    }
}

impl fmt::Debug for ReactiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("ReactiveState")
            .field("roots", &table.roots)
            .field("properties", &table.slots.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
