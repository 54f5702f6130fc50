#![no_main]

use libfuzzer_sys::fuzz_target;
use vbind_core::Value;
use vbind_runtime::{Segment, Template};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some(template) = Template::parse(text) else {
        return;
    };
    assert!(template.placeholder_count() > 0);

    // Rendering every path as empty text leaves exactly the literals.
    let literals: String = template
        .segments()
        .iter()
        .filter_map(|s| match s {
            Segment::Literal(l) => Some(l.as_str()),
            Segment::Path(_) => None,
        })
        .collect();
    let rendered = template
        .render_with(|_| Ok(Value::from("")))
        .expect("lookup never fails");
    assert_eq!(rendered, literals);
});
