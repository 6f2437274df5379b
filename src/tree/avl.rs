//! AVL tree: a binary search tree that stays height-balanced.
//!
//! [`AvlTree`] reuses the plain [`BinarySearchTree`] for storage, descent and
//! navigation, and layers the rebalancing engine on top:
//!
//! - every node stores its balance factor `height(left) - height(right)`;
//! - `insert` and `remove` update balance factors incrementally while walking
//!   from the modified node toward the root;
//! - a node whose balance reaches `±2` is repaired with one of four rotation
//!   patterns (LL, LR, RR, RL).
//!
//! Heights are never recomputed on the hot path, which keeps every mutation at
//! O(log N).
//!
//! # Insertion vs. removal
//!
//! After an insertion the walk continues while a node's balance becomes `±1`
//! (its subtree grew) and stops at `0`. A single rebalance always ends it.
//!
//! After a removal the walk continues while a node's balance becomes `0` (its
//! subtree shrank) and stops at `±1`. A rebalance ends the walk only when the
//! heavy child was perfectly balanced, since then the rotated subtree keeps
//! its height; otherwise the shrink propagates further up.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Index;

use tracing::trace;

use crate::error::{InvariantViolation, KeyError};

use super::cursor::NodeRef;
use super::iter::{IntoIter, Iter, Keys, Values};
use super::node::{NodeId, Side};
use super::search_tree::{BinarySearchTree, Placement};

/// Result of repairing a node whose balance reached `±2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rebalanced {
    /// Root of the repaired subtree.
    top: NodeId,
    /// `true` when the subtree has the same height as before the removal
    /// that unbalanced it.
    height_unchanged: bool,
}

/// An ordered map backed by an AVL tree.
///
/// Keys must implement `Ord`. Entries are kept in key order and the tree's
/// height never exceeds roughly `1.44 * log2(N + 2)`.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log N)   |
/// | `insert`       | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `first`/`last` | O(log N)   |
/// | `len`          | O(1)       |
/// | `validate`     | O(N log N) |
///
/// # Examples
///
/// ```rust
/// use avlbst::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for key in 1..=7 {
///     tree.insert(key, key.to_string());
/// }
///
/// assert_eq!(tree.height(), 3);
/// assert_eq!(tree.root().map(|root| *root.key()), Some(4));
/// assert_eq!(tree.remove(&4), Some("4".to_string()));
/// assert!(tree.is_balanced());
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V> {
    base: BinarySearchTree<K, V>,
}

static_assertions::assert_impl_all!(AvlTree<i32, String>: Send, Sync, Clone);
static_assertions::assert_impl_all!(NodeRef<'static, i32, String>: Copy, Send, Sync);

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, String> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: BinarySearchTree::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.base.len()
    }

    /// Returns `true` if the tree holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.base.clear();
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    #[must_use]
    pub fn height(&self) -> usize {
        self.base.height()
    }

    /// A read-only handle to the root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.base.root()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.base.first()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.base.last()
    }

    /// In-order iterator over `(key, value)` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
    /// let entries: Vec<(&i32, &char)> = tree.iter().collect();
    /// assert_eq!(entries, vec![(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.base.iter()
    }

    /// In-order iterator over keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.base.keys()
    }

    /// In-order iterator over values.
    pub fn values(&self) -> Values<'_, K, V> {
        self.base.values()
    }

    /// Returns `true` if every node's recomputed subtree heights differ by at
    /// most one. Always `true` for a correctly maintained tree.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.base.is_balanced()
    }

    /// The underlying search tree, for read-only queries.
    #[must_use]
    pub const fn as_search_tree(&self) -> &BinarySearchTree<K, V> {
        &self.base
    }

    #[inline]
    fn balance(&self, id: NodeId) -> i8 {
        self.base.nodes[id].balance
    }

    #[inline]
    fn set_balance(&mut self, id: NodeId, balance: i8) {
        self.base.nodes[id].balance = balance;
    }

    /// `height(left) - height(right)` recomputed from the subtree.
    fn recompute_balance(&self, id: NodeId) -> i64 {
        let node = &self.base.nodes[id];
        let left = self.base.nodes.subtree_height(node.left);
        let right = self.base.nodes.subtree_height(node.right);
        i64::try_from(left).unwrap_or(i64::MAX) - i64::try_from(right).unwrap_or(i64::MAX)
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    /// Rotates the subtree at `pivot` toward `direction`, lifting the child on
    /// the opposite side into `pivot`'s position, and returns that child.
    ///
    /// Only handles are rewired; balance factors are left to the caller.
    /// Returns `None` without changes if the child to lift is absent.
    fn rotate(&mut self, pivot: NodeId, direction: Side) -> Option<NodeId> {
        let lifted = self.base.nodes[pivot].child(direction.opposite())?;
        let inner = self.base.nodes[lifted].child(direction);
        let position = self.base.position_of(pivot);

        self.base.nodes[pivot].set_child(direction.opposite(), inner);
        if let Some(inner) = inner {
            self.base.nodes[inner].parent = Some(pivot);
        }

        self.base.nodes[lifted].set_child(direction, Some(pivot));
        self.base.nodes[lifted].parent = position.map(|(parent, _)| parent);
        self.base.replace_child(position, Some(lifted));
        self.base.nodes[pivot].parent = Some(lifted);

        trace!(
            rotation = match direction {
                Side::Left => "left",
                Side::Right => "right",
            },
            "rotated subtree"
        );
        Some(lifted)
    }

    /// Lifts the right child of `pivot` into its place and returns it.
    fn rotate_left(&mut self, pivot: NodeId) -> Option<NodeId> {
        self.rotate(pivot, Side::Left)
    }

    /// Lifts the left child of `pivot` into its place and returns it.
    fn rotate_right(&mut self, pivot: NodeId) -> Option<NodeId> {
        self.rotate(pivot, Side::Right)
    }

    /// Rotates so that the child on `heavy` rises, i.e. rotates toward the
    /// light side.
    fn rotate_toward_light(&mut self, pivot: NodeId, heavy: Side) -> Option<NodeId> {
        match heavy {
            Side::Left => self.rotate_right(pivot),
            Side::Right => self.rotate_left(pivot),
        }
    }

    /// Repairs `id`, whose balance is `±2`, and assigns the post-rotation
    /// balance factors.
    ///
    /// For a left-heavy node (mirror for right-heavy):
    ///
    /// | left child | rotation            | node | child | grandchild |
    /// |------------|---------------------|------|-------|------------|
    /// | +1         | right (LL)          | 0    | 0     |            |
    /// | 0          | right (LL)          | +1   | -1    |            |
    /// | -1, g = +1 | left-right (LR)     | -1   | 0     | 0          |
    /// | -1, g = 0  | left-right (LR)     | 0    | 0     | 0          |
    /// | -1, g = -1 | left-right (LR)     | 0    | +1    | 0          |
    fn rebalance(&mut self, id: NodeId) -> Option<Rebalanced> {
        let heavy = if self.balance(id) > 0 {
            Side::Left
        } else {
            Side::Right
        };
        let sign = heavy.growth();
        let child = self.base.nodes[id].child(heavy)?;
        let child_balance = self.balance(child);

        if child_balance * sign >= 0 {
            let top = self.rotate_toward_light(id, heavy)?;
            let height_unchanged = child_balance == 0;
            if height_unchanged {
                self.set_balance(id, sign);
                self.set_balance(child, -sign);
            } else {
                self.set_balance(id, 0);
                self.set_balance(child, 0);
            }
            trace!(
                case = match heavy {
                    Side::Left => "LL",
                    Side::Right => "RR",
                },
                "rebalanced subtree"
            );
            return Some(Rebalanced {
                top,
                height_unchanged,
            });
        }

        let grandchild = self.base.nodes[child].child(heavy.opposite())?;
        let grandchild_balance = self.balance(grandchild);
        self.rotate_toward_light(child, heavy.opposite())?;
        let top = self.rotate_toward_light(id, heavy)?;

        let (node_balance, child_balance) = if grandchild_balance == sign {
            (-sign, 0)
        } else if grandchild_balance == -sign {
            (0, sign)
        } else {
            (0, 0)
        };
        self.set_balance(id, node_balance);
        self.set_balance(child, child_balance);
        self.set_balance(grandchild, 0);
        trace!(
            case = match heavy {
                Side::Left => "LR",
                Side::Right => "RL",
            },
            "rebalanced subtree"
        );
        Some(Rebalanced {
            top,
            height_unchanged: false,
        })
    }

    // =========================================================================
    // Fix-up walks
    // =========================================================================

    /// Walks up from `id`, whose subtree just grew by one level.
    ///
    /// `id`'s own balance has already been adjusted by the caller.
    fn insert_fix(&mut self, mut id: NodeId) {
        loop {
            match self.balance(id) {
                0 => return,
                -1 | 1 => {
                    let Some((parent, side)) = self.base.position_of(id) else {
                        return;
                    };
                    self.base.nodes[parent].update_balance(side.growth());
                    if self.balance(parent) == 0 {
                        return;
                    }
                    id = parent;
                }
                _ => {
                    self.rebalance(id);
                    return;
                }
            }
        }
    }

    /// Walks up from `id` after one of its subtrees shrank, applying `diff`
    /// (-1 for a left shrink, +1 for a right shrink) at each level.
    fn remove_fix(&mut self, id: NodeId, diff: i8) {
        let mut pending = Some((id, diff));
        while let Some((id, diff)) = pending {
            self.base.nodes[id].update_balance(diff);
            let top = match self.balance(id) {
                -1 | 1 => return,
                0 => id,
                _ => match self.rebalance(id) {
                    Some(outcome) if !outcome.height_unchanged => outcome.top,
                    _ => return,
                },
            };
            pending = self
                .base
                .position_of(top)
                .map(|(parent, side)| (parent, side.shrink()));
        }
    }

    /// Exchanges the positions of two nodes together with their balance
    /// factors, so each position keeps the balance that describes it.
    fn node_swap(&mut self, first: NodeId, second: NodeId) {
        self.base.node_swap(first, second);
        let first_balance = self.balance(first);
        self.set_balance(first, self.balance(second));
        self.set_balance(second, first_balance);
    }

    /// Splices out `id` and rebalances. `id` must be live.
    fn remove_node(&mut self, id: NodeId) -> Option<(K, V)> {
        if self.base.nodes[id].has_two_children()
            && let Some(predecessor) = self.base.predecessor_of(id)
        {
            self.node_swap(id, predecessor);
        }
        let detached = self.base.detach(id)?;
        if let Some((parent, side)) = detached.parent {
            self.remove_fix(parent, side.shrink());
        }
        Some((detached.node.key, detached.node.value))
    }

    /// Verifies every structural invariant: search order, parent handles,
    /// length, stored balance factors against recomputed heights and the AVL
    /// bound.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.base.validate()?;
        for id in self.base.reachable() {
            let recorded = self.balance(id);
            let actual = self.recompute_balance(id);
            if i64::from(recorded) != actual {
                return Err(InvariantViolation::BalanceMismatch { recorded, actual });
            }
            if actual.abs() > 1 {
                return Err(InvariantViolation::Unbalanced { balance: actual });
            }
        }
        Ok(())
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(tree.get("hello"), Some(&42));
    /// assert_eq!(tree.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.get_mut(key)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.get_key_value(key)
    }

    /// Returns `true` if the tree holds `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.contains_key(key)
    }

    /// Strict lookup: the value under `key`, or [`KeyError`] if absent.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when `key` is not in the tree.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.at(key)
    }

    /// Strict mutable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when `key` is not in the tree.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.at_mut(key)
    }

    /// The entry with the largest key strictly less than `key`, which does
    /// not have to be present.
    #[must_use]
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.predecessor(key)
    }

    /// The entry with the smallest key strictly greater than `key`, which
    /// does not have to be present.
    #[must_use]
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.base.successor(key)
    }

    /// Inserts `key` with `value`, rebalancing as needed.
    ///
    /// If the key is already present its value is replaced in place and the
    /// previous value is returned; the tree's shape does not change.
    ///
    /// # Complexity
    ///
    /// O(log N), with at most one single or double rotation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.insert(10, "ten"), None);
    /// assert_eq!(tree.insert(20, "twenty"), None);
    /// assert_eq!(tree.insert(30, "thirty"), None);
    /// assert_eq!(tree.insert(10, "TEN"), Some("ten"));
    ///
    /// // 10, 20, 30 in order triggers a single left rotation.
    /// assert_eq!(tree.root().map(|root| *root.key()), Some(20));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let id = match self.base.place(key, value) {
            Placement::Replaced(previous) => return Some(previous),
            Placement::Attached(id) => id,
        };
        if let Some((parent, side)) = self.base.position_of(id) {
            let parent_was_leaf = self.balance(parent) == 0;
            self.base.nodes[parent].update_balance(side.growth());
            // A parent that already had a child is now perfectly balanced
            // and its height did not change.
            if parent_was_leaf {
                self.insert_fix(parent);
            }
        }
        self.check_invariants();
        None
    }

    /// Removes `key` and returns its value, rebalancing as needed.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor. Removing an absent key is a no-op that returns `None`.
    ///
    /// # Complexity
    ///
    /// O(log N), with at most O(log N) rotations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree: AvlTree<i32, ()> = [(20, ()), (10, ()), (30, ())].into_iter().collect();
    /// assert_eq!(tree.remove(&20), Some(()));
    ///
    /// // The predecessor takes the removed root's place.
    /// let root = tree.root().unwrap();
    /// assert_eq!(root.key(), &10);
    /// assert_eq!(root.right().map(|node| *node.key()), Some(30));
    /// assert_eq!(tree.remove(&99), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.base.internal_find(key)?;
        let removed = self.remove_node(id).map(|(_, value)| value);
        self.check_invariants();
        removed
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.base.root?;
        let entry = self.remove_node(self.base.nodes.leftmost(root));
        self.check_invariants();
        entry
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let root = self.base.root?;
        let entry = self.remove_node(self.base.nodes.rightmost(root));
        self.check_invariants();
        entry
    }

    #[inline]
    #[allow(clippy::missing_const_for_fn)]
    fn check_invariants(&self) {
        #[cfg(feature = "check-invariants")]
        debug_assert_eq!(self.validate(), Ok(()));
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for AvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, Q, V> Index<&Q> for AvlTree<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &Self::Output {
        &self.base[key]
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, formatter)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, formatter)
    }
}

// =============================================================================
// Tests
// =============================================================================
