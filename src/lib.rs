//! # avlbst
//!
//! An ordered key-value map backed by an AVL tree.
//!
//! ## Overview
//!
//! [`AvlTree`] keeps its entries in key order and guarantees logarithmic
//! insert, lookup and removal by maintaining a balance factor on every node
//! and rotating locally whenever a subtree becomes too tall on one side.
//!
//! - **Balanced engine**: incremental balance bookkeeping and the four
//!   rotation patterns (LL, LR, RR, RL) after insertion and removal.
//! - **Plain search tree**: [`BinarySearchTree`], the unbalanced base the
//!   engine builds on.
//! - **Read-only views**: in-order iterators and a [`NodeRef`] cursor that
//!   exposes the tree's shape.
//! - **Validation**: `validate` checks every structural invariant and
//!   reports the first violation as an [`InvariantViolation`].
//!
//! ## Feature Flags
//!
//! - `check-invariants`: re-validate the whole tree after every mutation in
//!   debug builds
//!
//! ## Logging
//!
//! Rotations and rebalances emit `trace`-level [`tracing`] events. Install a
//! subscriber to observe them; without one they cost nothing.
//!
//! ## Example
//!
//! ```rust
//! use avlbst::prelude::*;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(30, "thirty");
//! tree.insert(10, "ten");
//! tree.insert(20, "twenty");
//!
//! // 30, 10, 20 is the left-right case: 20 ends up at the root.
//! let root = tree.root().unwrap();
//! assert_eq!(root.key(), &20);
//! assert_eq!(root.balance(), 0);
//!
//! assert_eq!(tree.at(&10), Ok(&"ten"));
//! assert_eq!(tree.at(&40), Err(KeyError));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use avlbst::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::*;
    pub use crate::tree::*;
}

pub mod error;
pub mod tree;

pub use error::{InvariantViolation, KeyError};
pub use tree::{AvlTree, BinarySearchTree, NodeRef};
