//! Property-based tests for AvlTree.
//!
//! These tests drive the tree with arbitrary insert/remove sequences and
//! check its structural invariants and its agreement with `BTreeMap`.

use avlbst::{AvlTree, NodeRef};
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Clone, Debug)]
enum Operation {
    Insert(i16, i32),
    Remove(i16),
}

/// Keys are drawn from a small range so that removals and overwrites hit
/// existing entries often.
fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0..128_i16, any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
        2 => (0..128_i16).prop_map(Operation::Remove),
    ]
}

fn arbitrary_tree(max_size: usize) -> impl Strategy<Value = AvlTree<i32, i32>> {
    prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_size)
        .prop_map(|entries| entries.into_iter().collect::<AvlTree<i32, i32>>())
}

fn shape<V>(tree: &AvlTree<i32, V>) -> Vec<(i32, i8)> {
    fn walk<V>(node: Option<NodeRef<'_, i32, V>>, out: &mut Vec<(i32, i8)>) {
        if let Some(node) = node {
            out.push((*node.key(), node.balance()));
            walk(node.left(), out);
            walk(node.right(), out);
        }
    }
    let mut out = Vec::new();
    walk(tree.root(), &mut out);
    out
}

#[allow(clippy::cast_precision_loss)]
fn height_bound(len: usize) -> f64 {
    1.44 * ((len + 2) as f64).log2()
}

// =============================================================================
// Structural Invariants
// =============================================================================

proptest! {
    /// Every mutation leaves an ordered, correctly linked, AVL-balanced tree.
    #[test]
    fn prop_operations_preserve_invariants(
        operations in prop::collection::vec(arbitrary_operation(), 0..200)
    ) {
        let mut tree = AvlTree::new();
        for operation in operations {
            match operation {
                Operation::Insert(key, value) => { tree.insert(key, value); }
                Operation::Remove(key) => { tree.remove(&key); }
            }
            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert!(tree.is_balanced());
        }
    }

    /// Height stays within the AVL bound.
    #[test]
    fn prop_height_is_logarithmic(tree in arbitrary_tree(300)) {
        #[allow(clippy::cast_precision_loss)]
        let height = tree.height() as f64;
        prop_assert!(height <= height_bound(tree.len()));
    }

    /// Every cursor-reported balance lies in {-1, 0, 1}.
    #[test]
    fn prop_balances_stay_in_range(tree in arbitrary_tree(100)) {
        for (_, balance) in shape(&tree) {
            prop_assert!((-1..=1).contains(&balance));
        }
    }
}

// =============================================================================
// Model Equivalence
// =============================================================================

proptest! {
    /// The tree behaves like `BTreeMap` for every operation.
    #[test]
    fn prop_agrees_with_btreemap(
        operations in prop::collection::vec(arbitrary_operation(), 0..200)
    ) {
        let mut tree = AvlTree::new();
        let mut model = BTreeMap::new();
        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    prop_assert_eq!(tree.insert(key, value), model.insert(key, value));
                }
                Operation::Remove(key) => {
                    prop_assert_eq!(tree.remove(&key), model.remove(&key));
                }
            }
            prop_assert_eq!(tree.len(), model.len());
        }
        let entries: Vec<(&i16, &i32)> = tree.iter().collect();
        let expected: Vec<(&i16, &i32)> = model.iter().collect();
        prop_assert_eq!(entries, expected);
        prop_assert_eq!(tree.first(), model.first_key_value());
        prop_assert_eq!(tree.last(), model.last_key_value());
    }

    /// In-order traversal yields strictly increasing keys.
    #[test]
    fn prop_in_order_is_sorted(tree in arbitrary_tree(100)) {
        let keys: Vec<&i32> = tree.keys().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Reverse iteration is the mirror of forward iteration.
    #[test]
    fn prop_reverse_iteration_mirrors_forward(tree in arbitrary_tree(100)) {
        let mut forward: Vec<&i32> = tree.keys().collect();
        let backward: Vec<&i32> = tree.keys().rev().collect();
        forward.reverse();
        prop_assert_eq!(forward, backward);
    }

    /// Neighbour queries agree with range queries on `BTreeMap`.
    #[test]
    fn prop_neighbours_agree_with_btreemap(
        entries in prop::collection::vec((-500..500_i32, any::<i32>()), 0..60),
        probe in -600..600_i32
    ) {
        let tree: AvlTree<i32, i32> = entries.iter().copied().collect();
        let model: BTreeMap<i32, i32> = entries.into_iter().collect();
        prop_assert_eq!(tree.predecessor(&probe), model.range(..probe).next_back());
        prop_assert_eq!(tree.successor(&probe), model.range(probe + 1..).next());
    }
}

// =============================================================================
// Get-Insert-Remove Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(mut tree in arbitrary_tree(50), key: i32, value: i32) {
        tree.insert(key, value);
        prop_assert_eq!(tree.get(&key), Some(&value));
    }

    /// Law: get after remove returns None.
    #[test]
    fn prop_get_remove_law(mut tree in arbitrary_tree(50), key: i32) {
        tree.remove(&key);
        prop_assert_eq!(tree.get(&key), None);
        prop_assert_eq!(tree.validate(), Ok(()));
    }

    /// Removing an absent key leaves the tree untouched, shape included.
    #[test]
    fn prop_remove_absent_is_noop(mut tree in arbitrary_tree(50), key: i32) {
        prop_assume!(!tree.contains_key(&key));
        let before = shape(&tree);
        let snapshot = tree.clone();

        prop_assert_eq!(tree.remove(&key), None);

        prop_assert_eq!(&tree, &snapshot);
        prop_assert_eq!(shape(&tree), before);
    }

    /// Overwriting an existing key never reshapes the tree.
    #[test]
    fn prop_overwrite_keeps_shape(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 1..50),
        index: prop::sample::Index,
        value: i32
    ) {
        let key = entries[index.index(entries.len())].0;
        let mut tree: AvlTree<i32, i32> = entries.into_iter().collect();
        let before = shape(&tree);

        prop_assert!(tree.insert(key, value).is_some());

        prop_assert_eq!(shape(&tree), before);
        prop_assert_eq!(tree.get(&key), Some(&value));
    }

    /// Draining from the front yields every key in order and leaves an empty
    /// tree.
    #[test]
    fn prop_pop_first_drains_in_order(mut tree in arbitrary_tree(80)) {
        let expected: Vec<i32> = tree.keys().copied().collect();
        let mut drained = Vec::new();
        while let Some((key, _)) = tree.pop_first() {
            prop_assert_eq!(tree.validate(), Ok(()));
            drained.push(key);
        }
        prop_assert_eq!(drained, expected);
        prop_assert!(tree.is_empty());
    }

    /// Trees holding the same entries compare equal whatever the insertion
    /// order.
    #[test]
    fn prop_equality_ignores_insertion_order(
        entries in prop::collection::btree_map(any::<i32>(), any::<i32>(), 0..50)
    ) {
        let forward: AvlTree<i32, i32> = entries.iter().map(|(&key, &value)| (key, value)).collect();
        let backward: AvlTree<i32, i32> = entries.iter().rev().map(|(&key, &value)| (key, value)).collect();
        prop_assert_eq!(forward, backward);
    }
}
