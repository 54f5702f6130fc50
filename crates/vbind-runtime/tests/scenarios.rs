//! End-to-end binding scenarios against the in-memory document.
//!
//! Each test mounts a [`Component`] on a parsed document, then drives state
//! through the proxy or the state tree and checks the rendered text.

use std::rc::Rc;

use pretty_assertions::assert_eq;
use vbind_core::{BindError, Path, Value};
use vbind_dom::{Host, MemoryDocument, NodeId};
use vbind_runtime::{Component, ComponentOptions};

// ── Helpers ──────────────────────────────────────────────────────────

fn mount(markup: &str, data: Value) -> (Rc<MemoryDocument>, Component<MemoryDocument>) {
    let doc = Rc::new(MemoryDocument::parse(markup).expect("markup parses"));
    let app = Component::new(Rc::clone(&doc), ComponentOptions::new("#app").data(data))
        .expect("component mounts");
    (doc, app)
}

fn text_of(doc: &MemoryDocument, selector: &str) -> String {
    let node: NodeId = doc.query_element(selector).expect("selector matches");
    doc.text_content(node)
}

// ═════════════════════════════════════════════════════════════════════════
// Scenarios
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn nested_name_renders_and_updates() {
    let (doc, app) = mount(
        r#"<div id="app">Hello {{user.name}}</div>"#,
        Value::object([("user", Value::object([("name", "Ann")]))]),
    );
    assert_eq!(text_of(&doc, "#app"), "Hello Ann");

    app.prop("user").unwrap().field("name").set("Bo").unwrap();
    assert_eq!(text_of(&doc, "#app"), "Hello Bo");
}

#[test]
fn write_updates_only_the_dependent_node() {
    let (doc, app) = mount(
        r#"<div id="app"><p class="a">{{a}}</p><p class="b">{{b}}</p></div>"#,
        Value::object([("a", 1), ("b", 2)]),
    );
    assert_eq!(text_of(&doc, ".a"), "1");
    assert_eq!(text_of(&doc, ".b"), "2");

    app.set("a", 5).unwrap();
    assert_eq!(text_of(&doc, ".a"), "5");
    assert_eq!(text_of(&doc, ".b"), "2");

    let renders: Vec<u64> = app.bindings().iter().map(|b| b.render_count()).collect();
    assert_eq!(renders, [2, 1]);
}

#[test]
fn parent_replacement_rebinds_by_path() {
    let (doc, app) = mount(
        r#"<div id="app">{{x.y}}</div>"#,
        Value::object([("x", Value::object([("y", 1)]))]),
    );
    assert_eq!(text_of(&doc, "#app"), "1");

    app.state().set("x.y", 9).unwrap();
    assert_eq!(text_of(&doc, "#app"), "9");

    app.set("x", Value::object([("y", 42)])).unwrap();
    assert_eq!(text_of(&doc, "#app"), "42");

    // The fresh `x.y` publisher serves the existing binding.
    app.state().set("x.y", 7).unwrap();
    assert_eq!(text_of(&doc, "#app"), "7");
    assert_eq!(app.state().subscriber_count("x.y"), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Deep reactivity and dependency precision
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn every_depth_is_observable() {
    let (doc, app) = mount(
        r#"<div id="app"><i class="deep">{{a.b.c.d}}</i><i class="mid">{{a.b.e}}</i></div>"#,
        Value::object([(
            "a",
            Value::object([(
                "b",
                Value::object([("c", Value::object([("d", "deep")])), ("e", Value::from("mid"))]),
            )]),
        )]),
    );
    assert_eq!(text_of(&doc, ".deep"), "deep");

    app.state().set("a.b.c.d", "deeper").unwrap();
    assert_eq!(text_of(&doc, ".deep"), "deeper");
    assert_eq!(text_of(&doc, ".mid"), "mid");

    let counts: Vec<u64> = app.bindings().iter().map(|b| b.render_count()).collect();
    assert_eq!(counts, [2, 1]);
}

#[test]
fn assigned_object_leaves_rerender_independently() {
    let (doc, app) = mount(
        r#"<div id="app"><p class="a">{{x.a}}</p><p class="b">{{x.b}}</p></div>"#,
        Value::object([("x", 0)]),
    );
    let counts = |app: &Component<MemoryDocument>| -> Vec<u64> {
        app.bindings().iter().map(|b| b.render_count()).collect()
    };
    assert_eq!(counts(&app), [0, 0]);

    app.set("x", Value::object([("a", 1), ("b", 2)])).unwrap();
    assert_eq!(text_of(&doc, ".a"), "1");
    assert_eq!(text_of(&doc, ".b"), "2");
    assert_eq!(counts(&app), [1, 1]);

    app.state().set("x.a", 5).unwrap();
    assert_eq!(text_of(&doc, ".a"), "5");
    assert_eq!(text_of(&doc, ".b"), "2");
    assert_eq!(counts(&app), [2, 1]);

    app.state().set("x.b", 6).unwrap();
    assert_eq!(counts(&app), [2, 2]);
    assert_eq!(app.state().subscriber_count("x.a"), 1);
    assert_eq!(app.state().subscriber_count("x.b"), 1);
}

#[test]
fn sibling_writes_do_not_rerender() {
    let (_doc, app) = mount(
        r#"<div id="app">{{user.name}}</div>"#,
        Value::object([("user", Value::object([("name", Value::from("Ann")), ("age", Value::from(30))]))]),
    );
    app.state().set("user.age", 31).unwrap();
    assert_eq!(app.bindings()[0].render_count(), 1);

    app.state().set("user.name", "Cy").unwrap();
    assert_eq!(app.bindings()[0].render_count(), 2);
}

#[test]
fn repeated_placeholder_renders_once_per_write() {
    let (doc, app) = mount(
        r#"<div id="app">{{n}}-{{n}}-{{n}}</div>"#,
        Value::object([("n", 0)]),
    );
    app.set("n", 3).unwrap();
    assert_eq!(text_of(&doc, "#app"), "3-3-3");
    assert_eq!(app.bindings()[0].render_count(), 2);
    assert_eq!(app.state().subscriber_count("n"), 1);
}

#[test]
fn unchanged_write_still_notifies() {
    let (_doc, app) = mount(r#"<div id="app">{{n}}</div>"#, Value::object([("n", 1)]));
    app.set("n", 1).unwrap();
    assert_eq!(app.bindings()[0].render_count(), 2);
}

#[test]
fn composite_values_render_as_plain_text() {
    let (doc, app) = mount(
        r#"<div id="app"><b>{{obj}}</b><u>{{list}}</u><s>{{none}}</s></div>"#,
        Value::object([
            ("obj", Value::object([("k", 1)])),
            ("list", Value::from(vec![1, 2, 3])),
            ("none", Value::Null),
        ]),
    );
    assert_eq!(text_of(&doc, "b"), "[object Object]");
    assert_eq!(text_of(&doc, "u"), "1,2,3");
    assert_eq!(text_of(&doc, "s"), "null");

    // Reading `obj` depends on `obj` only, not on its children.
    app.state().set("obj.k", 2).unwrap();
    assert_eq!(app.bindings()[0].render_count(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Failure containment
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn missing_path_is_contained_to_its_node() {
    let (doc, app) = mount(
        r#"<div id="app"><p class="ok">{{user.name}}</p><p class="bad">{{user.age}}</p></div>"#,
        Value::object([("user", Value::object([("name", "Ann")]))]),
    );
    assert_eq!(text_of(&doc, ".ok"), "Ann");
    assert_eq!(text_of(&doc, ".bad"), "{{user.age}}");

    let bad = &app.bindings()[1];
    assert_eq!(bad.failure_count(), 1);
    assert_eq!(
        bad.last_error(),
        Some(BindError::missing(&Path::parse("user.age"), "age"))
    );
}

#[test]
fn missing_path_recovers_when_parent_is_replaced() {
    let (doc, app) = mount(
        r#"<div id="app">{{user.name}} is {{user.age}}</div>"#,
        Value::object([("user", Value::object([("name", "Ann")]))]),
    );
    assert_eq!(text_of(&doc, "#app"), "{{user.name}} is {{user.age}}");

    // The failed render still subscribed to `user`.
    app.set("user", Value::object([("name", Value::from("Ann")), ("age", Value::from(30))]))
        .unwrap();
    assert_eq!(text_of(&doc, "#app"), "Ann is 30");
    assert_eq!(app.bindings()[0].last_error(), None);
}

#[test]
fn failed_render_keeps_previous_text() {
    let (doc, app) = mount(
        r#"<div id="app">{{a.b}}</div>"#,
        Value::object([("a", Value::object([("b", "first")]))]),
    );
    app.set("a", 1).unwrap();
    assert_eq!(text_of(&doc, "#app"), "first");
    assert_eq!(app.bindings()[0].failure_count(), 1);
    assert!(!app.state().contains("a.b"));
}

#[test]
fn unknown_writes_change_nothing() {
    let (doc, app) = mount(r#"<div id="app">{{a}}</div>"#, Value::object([("a", 1)]));
    assert_eq!(app.state().set("b", 2), Err(BindError::unknown("b")));
    assert_eq!(app.state().set("a.inner", 2), Err(BindError::unknown("a.inner")));
    assert_eq!(text_of(&doc, "#app"), "1");
    assert_eq!(app.bindings()[0].render_count(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Compile
// ═════════════════════════════════════════════════════════════════════════

const PAGE: &str = r#"<section id="app"><h1>{{title}}</h1><ul><li>{{items}}</li><li>static</li></ul>Total: {{count}} of {{ count }}</section>"#;

fn page_data() -> Value {
    Value::object([
        ("title", Value::from("Inbox")),
        ("items", Value::from(vec!["a", "b"])),
        ("count", Value::from(2)),
    ])
}

#[test]
fn compile_is_idempotent_across_instances() {
    let (first, _a) = mount(PAGE, page_data());
    let (second, _b) = mount(PAGE, page_data());
    assert_eq!(first.to_markup(first.root()), second.to_markup(second.root()));
    assert_eq!(
        first.inner_markup(first.query_element("#app").unwrap()),
        "<h1>Inbox</h1><ul><li>a,b</li><li>static</li></ul>Total: 2 of 2"
    );
}

#[test]
fn compile_preserves_structure_and_order() {
    let (doc, app) = mount(PAGE, page_data());
    let mount_node = *app.el();
    let tags: Vec<Option<String>> = doc
        .children(mount_node)
        .into_iter()
        .map(|n| doc.tag(n))
        .collect();
    assert_eq!(tags, [Some("h1".into()), Some("ul".into()), None]);
    assert_eq!(app.bindings().len(), 3);
}
