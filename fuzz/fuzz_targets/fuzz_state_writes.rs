#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vbind_core::{Collector, Value};
use vbind_dom::{Host, MemoryDocument};
use vbind_runtime::{Component, ComponentOptions};

const PATHS: [&str; 6] = ["a", "a.x", "a.y", "b", "b.x", "c"];

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Int(i64),
    Text(String),
    Object { x: i64, y: Option<i64> },
}

impl FuzzValue {
    fn into_value(self) -> Value {
        match self {
            Self::Int(n) => Value::from(n),
            Self::Text(s) => Value::from(s),
            Self::Object { x, y } => {
                let mut entries = vec![("x", Value::from(x))];
                if let Some(y) = y {
                    entries.push(("y", Value::from(y)));
                }
                Value::object(entries)
            }
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Write {
    path: u8,
    value: FuzzValue,
}

fuzz_target!(|writes: Vec<Write>| {
    let doc = Rc::new(
        MemoryDocument::parse(
            r#"<div id="app"><p>{{a.x}}</p><p>{{a.y}} {{b}}</p><p>{{b.x}}{{c}}</p></div>"#,
        )
        .expect("fixed markup parses"),
    );
    let data = Value::object([
        ("a", Value::object([("x", 1), ("y", 2)])),
        ("b", Value::from(3)),
        ("c", Value::from(4)),
    ]);
    let app = Component::new(Rc::clone(&doc), ComponentOptions::new("#app").data(data))
        .expect("fixed component mounts");

    for write in writes {
        let path = PATHS[usize::from(write.path) % PATHS.len()];
        let _ = app.state().set(path, write.value.into_value());

        // Every binding that last rendered successfully shows current state.
        let collector = Collector::new();
        for binding in app.bindings() {
            if let Ok(fresh) = binding.template().render(app.state(), &collector) {
                if binding.last_error().is_none() {
                    assert_eq!(doc.text(binding.node()), fresh);
                }
            }
        }
    }
});
