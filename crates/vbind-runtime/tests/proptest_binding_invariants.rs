//! Property-based invariant tests for state instrumentation and bindings.
//!
//! 1. Round-trip: a write followed by an untracked read returns the value
//! 2. Observe then snapshot reproduces the input object
//! 3. Render determinism: same template and state, same text
//! 4. Dependency precision: a write re-renders exactly the bindings that
//!    read the written property
//! 5. Rendered text always equals a fresh render against current state

use std::rc::Rc;

use proptest::prelude::*;
use vbind_core::{Collector, Path, Value};
use vbind_dom::{Host, MemoryDocument};
use vbind_runtime::{Component, ComponentOptions, ReactiveState, Template};

// ── Helpers ──────────────────────────────────────────────────────────

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

/// Objects over a small fixed key set, up to three levels deep.
fn arb_object() -> impl Strategy<Value = Value> {
    let leaf_or_object = arb_leaf().prop_recursive(3, 24, 4, |inner| {
        proptest::collection::vec((proptest::sample::select(KEYS.to_vec()), inner), 1..4)
            .prop_map(|entries| Value::object(entries))
    });
    proptest::collection::vec((proptest::sample::select(KEYS.to_vec()), leaf_or_object), 1..5)
        .prop_map(|entries| Value::object(entries))
}

/// Every leaf path in `value`, in order.
fn leaf_paths(value: &Value, at: &Path, out: &mut Vec<Path>) {
    match value.as_object() {
        Some(map) => {
            for (key, child) in map {
                leaf_paths(child, &at.child(key.as_str()), out);
            }
        }
        None if !at.is_root() => out.push(at.clone()),
        None => {}
    }
}

fn leaves(value: &Value) -> Vec<Path> {
    let mut out = Vec::new();
    leaf_paths(value, &Path::root(), &mut out);
    out
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn observe_then_snapshot_is_identity(data in arb_object()) {
        let state = ReactiveState::observe(data.clone());
        prop_assert_eq!(state.snapshot(), data);
    }

    #[test]
    fn write_then_read_returns_value(data in arb_object(), pick in any::<prop::sample::Index>(), value in arb_leaf()) {
        let paths = leaves(&data);
        prop_assume!(!paths.is_empty());
        let path = pick.get(&paths).clone();

        let state = ReactiveState::observe(data);
        state.set(&path, value.clone()).unwrap();
        prop_assert_eq!(state.get(&path), Some(value));
    }

    #[test]
    fn object_write_instruments_every_descendant(data in arb_object(), replacement in arb_object()) {
        let key = data.as_object().and_then(|m| m.keys().next().cloned()).unwrap();
        let state = ReactiveState::observe(data);
        state.set(key.as_str(), replacement.clone()).unwrap();

        prop_assert_eq!(state.get(key.as_str()), Some(replacement.clone()));
        for leaf in leaves(&replacement) {
            let mut full = Path::from_segments([key.as_str()]);
            for segment in leaf.segments() {
                full = full.child(segment.as_str());
            }
            prop_assert!(state.contains(&full), "missing slot {}", full);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Render determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn render_is_deterministic(data in arb_object(), prefix in "[a-z ]{0,6}", suffix in "[a-z ]{0,6}") {
        let paths = leaves(&data);
        prop_assume!(!paths.is_empty());
        let source: String = paths
            .iter()
            .map(|p| format!("{prefix}{{{{{p}}}}}{suffix}"))
            .collect();
        let template = Template::parse(&source).unwrap();
        prop_assert_eq!(template.placeholder_count(), paths.len());

        let state = ReactiveState::observe(data);
        let a = template.render(&state, &Collector::new()).unwrap();
        let b = template.render(&state, &Collector::new()).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Dependency precision through a mounted component
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn writes_rerender_exactly_the_readers(
        data in arb_object(),
        pick in any::<prop::sample::Index>(),
        value in arb_leaf(),
    ) {
        let paths = leaves(&data);
        prop_assume!(!paths.is_empty());
        let markup: String = std::iter::once(r#"<div id="app">"#.to_owned())
            .chain(paths.iter().map(|p| format!("<p>{{{{{p}}}}}</p>")))
            .chain(std::iter::once("</div>".to_owned()))
            .collect();

        let doc = Rc::new(MemoryDocument::parse(&markup).unwrap());
        let app = Component::new(Rc::clone(&doc), ComponentOptions::new("#app").data(data)).unwrap();
        prop_assert_eq!(app.bindings().len(), paths.len());

        let written = pick.get(&paths).clone();
        app.state().set(&written, value).unwrap();

        let collector = Collector::new();
        for binding in app.bindings() {
            let expected = if binding.paths()[0] == written { 2 } else { 1 };
            prop_assert_eq!(binding.render_count(), expected);

            let fresh = binding.template().render(app.state(), &collector).unwrap();
            prop_assert_eq!(doc.text(binding.node()), fresh);
        }
    }
}
