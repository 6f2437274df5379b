//! Error types for tree queries and structural validation.
//!
//! Mutations never fail: inserting an existing key overwrites its value and
//! removing an absent key is a no-op. Errors only arise from strict lookups
//! ([`KeyError`]) and from [`validate`](crate::tree::AvlTree::validate)
//! ([`InvariantViolation`]).

/// Represents a strict lookup of a key that is not present in the tree.
///
/// # Examples
///
/// ```rust
/// use avlbst::{AvlTree, KeyError};
///
/// let tree: AvlTree<i32, &str> = [(1, "one")].into_iter().collect();
/// assert_eq!(tree.at(&1), Ok(&"one"));
/// assert_eq!(tree.at(&2), Err(KeyError));
/// assert_eq!(format!("{}", KeyError), "key not found in tree");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyError;

impl std::fmt::Display for KeyError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "key not found in tree")
    }
}

impl std::error::Error for KeyError {}

/// Describes which structural invariant a tree failed to uphold.
///
/// Returned by `validate` on both tree flavours. A violation always indicates
/// a defect in the tree implementation, never a condition callers can cause
/// through the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantViolation {
    /// An in-order neighbour pair was not strictly increasing.
    Unordered,
    /// A child's parent handle does not point back at its parent, or the
    /// root has a parent.
    ParentMismatch,
    /// The stored balance factor differs from the recomputed one.
    BalanceMismatch {
        /// The balance factor stored in the node.
        recorded: i8,
        /// `height(left) - height(right)` recomputed from the subtree.
        actual: i64,
    },
    /// A node's height difference lies outside `{-1, 0, 1}`.
    Unbalanced {
        /// The recomputed height difference.
        balance: i64,
    },
    /// The tracked entry count differs from the number of reachable nodes.
    LengthMismatch {
        /// The length stored in the tree.
        recorded: usize,
        /// The number of nodes reachable from the root.
        actual: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unordered => write!(formatter, "keys are not in strictly increasing order"),
            Self::ParentMismatch => write!(formatter, "parent handle does not match tree shape"),
            Self::BalanceMismatch { recorded, actual } => write!(
                formatter,
                "stored balance {recorded} does not match recomputed balance {actual}"
            ),
            Self::Unbalanced { balance } => {
                write!(formatter, "height difference {balance} exceeds AVL bound")
            }
            Self::LengthMismatch { recorded, actual } => write!(
                formatter,
                "tree records {recorded} entries but {actual} nodes are reachable"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_key_error_display() {
        assert_eq!(KeyError.to_string(), "key not found in tree");
    }

    #[rstest]
    #[case(InvariantViolation::Unordered, "keys are not in strictly increasing order")]
    #[case(
        InvariantViolation::BalanceMismatch { recorded: 1, actual: -1 },
        "stored balance 1 does not match recomputed balance -1"
    )]
    #[case(
        InvariantViolation::Unbalanced { balance: 2 },
        "height difference 2 exceeds AVL bound"
    )]
    #[case(
        InvariantViolation::LengthMismatch { recorded: 3, actual: 2 },
        "tree records 3 entries but 2 nodes are reachable"
    )]
    fn test_invariant_violation_display(
        #[case] violation: InvariantViolation,
        #[case] expected: &str,
    ) {
        assert_eq!(violation.to_string(), expected);
    }

    #[rstest]
    fn test_errors_are_std_errors() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(KeyError),
            Box::new(InvariantViolation::ParentMismatch),
        ];
        assert_eq!(errors.len(), 2);
    }
}
