#![no_main]

use libfuzzer_sys::fuzz_target;
use vbind_dom::{Host, MemoryDocument};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let doc = MemoryDocument::parse(source).expect("html parsing recovers from any input");

    // Text content is exactly the text nodes in document order.
    let text = doc.text_content(doc.root());
    let joined: String = doc
        .text_nodes(doc.root())
        .iter()
        .map(|node| doc.text(node))
        .collect();
    assert_eq!(joined, text);

    // Serialized output is always readable again.
    let markup = doc.to_markup(doc.root());
    MemoryDocument::parse(&markup).expect("serialized markup parses");
});
