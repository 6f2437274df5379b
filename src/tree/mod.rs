//! Ordered maps backed by binary search trees.
//!
//! This module provides two tree flavours sharing one node representation:
//!
//! - [`AvlTree`]: a self-balancing AVL tree. Every node tracks its balance
//!   factor and the tree rotates after insertions and removals so that its
//!   height stays logarithmic.
//! - [`BinarySearchTree`]: the plain tree it is built on. It never rebalances
//!   and is useful for comparison and as a reference for shape-dependent
//!   behaviour.
//!
//! # Node storage
//!
//! Nodes live in a per-tree arena and link to each other through handles.
//! Each node knows its parent, which lets fix-up walks and iterators move
//! upward without recursion or auxiliary stacks.
//!
//! # Examples
//!
//! ## `AvlTree`
//!
//! ```rust
//! use avlbst::tree::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
//!     tree.insert(key, key * 100);
//! }
//! assert!(tree.is_balanced());
//! assert_eq!(tree.get(&4), Some(&400));
//!
//! // Entries are always in sorted order
//! let keys: Vec<&i32> = tree.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3, &4, &5, &6, &7, &8, &9]);
//!
//! // Neighbour queries work for absent keys too
//! assert_eq!(tree.predecessor(&10), Some((&9, &900)));
//! ```
//!
//! ## `BinarySearchTree`
//!
//! ```rust
//! use avlbst::tree::BinarySearchTree;
//!
//! let tree: BinarySearchTree<i32, ()> = (1..=5).map(|key| (key, ())).collect();
//! assert_eq!(tree.height(), 5);
//! assert!(!tree.is_balanced());
//! ```

mod arena;
mod avl;
mod cursor;
mod iter;
mod node;
mod search_tree;

pub use avl::AvlTree;
pub use cursor::NodeRef;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::Keys;
pub use iter::Values;
pub use search_tree::BinarySearchTree;
