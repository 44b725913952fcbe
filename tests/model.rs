//! Random operation sequences checked against `BTreeSet`.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rbdict::RBTree;
use rbdict::dictionary::{Dictionary, KeyValuePair};
use rbdict::non_concurrent::rbtree::{Color, RBTreeError};

#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Remove(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..128).prop_map(Op::Insert),
        2 => (0u16..128).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn behaves_like_a_set(ops in prop::collection::vec(op(), 0..300)) {
        let mut tree = RBTree::<u16>::new();
        let mut model = BTreeSet::new();

        for op in ops {
            let before: Vec<u16> = tree.iter().copied().collect();
            match op {
                Op::Insert(v) => match tree.insert(v) {
                    Ok(()) => prop_assert!(model.insert(v)),
                    Err(RBTreeError::DuplicateKey) => {
                        prop_assert!(model.contains(&v));
                        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), before);
                    }
                    Err(err) => prop_assert!(false, "unexpected {err}"),
                },
                Op::Remove(v) => match tree.remove(&v) {
                    Ok(removed) => {
                        prop_assert_eq!(removed, v);
                        prop_assert!(model.remove(&v));
                    }
                    Err(RBTreeError::NotFound) => {
                        prop_assert!(!model.contains(&v));
                        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), before);
                    }
                    Err(RBTreeError::EmptyTree) => prop_assert!(model.is_empty()),
                    Err(err) => prop_assert!(false, "unexpected {err}"),
                },
            }

            prop_assert!(tree.check_invariants().is_ok(), "{:?}", tree.check_invariants());
            prop_assert_eq!(tree.len(), model.len());
            prop_assert!(tree.iter().eq(model.iter()));
            if !tree.is_empty() {
                prop_assert_eq!(tree.root_color(), Some(Color::Black));
            }
        }
    }

    #[test]
    fn height_stays_logarithmic(values in prop::collection::btree_set(any::<u32>(), 1..2000)) {
        let tree: RBTree<u32> = values.iter().copied().collect();
        let bound = 2.0 * ((values.len() + 1) as f64).log2();
        prop_assert!(tree.height() as f64 <= bound);
    }

    #[test]
    fn binary_round_trip(values in prop::collection::vec(any::<i64>(), 0..500)) {
        let tree: RBTree<i64> = values.into_iter().collect();
        let mut bytes = Vec::new();
        tree.write_binary(&mut bytes).unwrap();

        let copy = RBTree::<i64>::read_binary(&mut bytes.as_slice()).unwrap();
        prop_assert!(copy.structural_eq(&tree));
        prop_assert_eq!(copy.len(), tree.len());
    }

    #[test]
    fn text_round_trip(values in prop::collection::vec("[a-z(), ]{0,8}", 0..200)) {
        let tree: RBTree<String> = values.iter().cloned().collect();
        match tree.to_text() {
            Ok(text) => {
                let copy = RBTree::<String>::read_text(&mut text.as_bytes()).unwrap();
                prop_assert!(copy.structural_eq(&tree));
                prop_assert_eq!(copy.len(), tree.len());
            }
            // only elements that cannot be told apart from the punctuation
            // around them are refused
            Err(RBTreeError::Io(err)) => {
                prop_assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
                prop_assert!(values.iter().any(|v| v.is_empty() || v.contains([' ', '(', ')', ','])));
            }
            Err(err) => prop_assert!(false, "unexpected {err}"),
        }
    }

    #[test]
    fn dictionary_text_round_trip(keys in prop::collection::vec("[a-z(),!.]{1,8}", 0..100)) {
        let mut dict = Dictionary::new();
        for (i, key) in keys.iter().enumerate() {
            let _ = dict.insert(KeyValuePair::new(key, i as u64));
        }
        let text = dict.to_text().unwrap();
        let copy = Dictionary::read_text(&mut text.as_bytes()).unwrap();
        prop_assert!(copy.structural_eq(&dict));
        prop_assert_eq!(copy.len(), dict.len());
    }

    #[test]
    fn truncated_binary_never_loads(values in prop::collection::btree_set(any::<u8>(), 1..64), cut in any::<prop::sample::Index>()) {
        let tree: RBTree<u8> = values.into_iter().collect();
        let mut bytes = Vec::new();
        tree.write_binary(&mut bytes).unwrap();
        let cut = cut.index(bytes.len());

        let mut target: RBTree<u8> = [200].into_iter().collect();
        let result = target.load_binary(&mut &bytes[..cut]);
        prop_assert!(matches!(result, Err(RBTreeError::CorruptStream { .. })), "{:?}", result);
        prop_assert_eq!(target.iter().copied().collect::<Vec<_>>(), vec![200]);
    }
}
