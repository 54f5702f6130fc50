//! Property-based invariant tests for `Path` and the dependency protocol.
//!
//! 1. Display then parse is the identity for identifier segments
//! 2. Prefixes are ordered ancestors ending at the path itself
//! 3. `child` and `parent` are inverses
//! 4. A publisher notifies each live subscriber exactly once, in order,
//!    however often it was registered

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use vbind_core::{Collector, Path, Publisher, Subscriber};

fn arb_path() -> impl Strategy<Value = Path> {
    proptest::collection::vec("[A-Za-z_$][A-Za-z0-9_$]{0,6}", 1..6).prop_map(Path::from_segments)
}

proptest! {
    #[test]
    fn display_parse_roundtrip(path in arb_path()) {
        prop_assert_eq!(Path::parse(&path.to_string()), path);
    }

    #[test]
    fn prefixes_are_ordered_ancestors(path in arb_path()) {
        let prefixes: Vec<Path> = path.prefixes().collect();
        prop_assert_eq!(prefixes.len(), path.len());
        prop_assert_eq!(prefixes.last(), Some(&path));
        for (i, prefix) in prefixes.iter().enumerate() {
            prop_assert_eq!(prefix.len(), i + 1);
            if i + 1 < prefixes.len() {
                prop_assert!(path.is_descendant_of(prefix));
            }
        }
        prop_assert!(!path.is_descendant_of(&path));
    }

    #[test]
    fn child_then_parent(path in arb_path(), key in "[a-z]{1,5}") {
        let child = path.child(key.as_str());
        prop_assert_eq!(child.last(), Some(key.as_str()));
        prop_assert_eq!(child.parent(), Some(path));
    }
}

proptest! {
    #[test]
    fn notify_once_per_subscriber_in_order(
        count in 1usize..8,
        reads in proptest::collection::vec(0usize..8, 0..32),
    ) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subscribers: Vec<Subscriber> = (0..count)
            .map(|i| {
                let log = Rc::clone(&log);
                Subscriber::new(move || log.borrow_mut().push(i))
            })
            .collect();

        let collector = Collector::new();
        let mut publisher = Publisher::new();
        let mut expected = Vec::new();
        for read in reads {
            let i = read % count;
            collector
                .collect(&subscribers[i], || collector.track(&mut publisher))
                .unwrap();
            if !expected.contains(&i) {
                expected.push(i);
            }
        }

        publisher.notify();
        prop_assert_eq!(&*log.borrow(), &expected);
        prop_assert!(!collector.is_collecting());
    }
}
