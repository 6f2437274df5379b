//! Plain (unbalanced) binary search tree.
//!
//! [`BinarySearchTree`] owns the node arena and provides everything that does
//! not depend on balancing: key lookup, in-order navigation, strict lookups,
//! structural validation and the topology primitives the AVL engine builds on
//! (attaching leaves, splicing out nodes with at most one child and swapping
//! two nodes' positions).
//!
//! Its own [`insert`](BinarySearchTree::insert) and
//! [`remove`](BinarySearchTree::remove) never rebalance, so the height of a
//! plain tree depends on insertion order.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use crate::error::{InvariantViolation, KeyError};

use super::arena::NodeArena;
use super::cursor::NodeRef;
use super::iter::{IntoIter, Iter, Keys, Values};
use super::node::{Node, NodeId, Side};

/// Outcome of descending to a key's position.
pub(crate) enum Placement<V> {
    /// The key was present; its previous value is returned.
    Replaced(V),
    /// A new leaf was attached.
    Attached(NodeId),
}

/// A node that was spliced out of the tree.
pub(crate) struct Detached<K, V> {
    pub(crate) node: Node<K, V>,
    /// The former parent and the side the node hung on, `None` for the root.
    pub(crate) parent: Option<(NodeId, Side)>,
}

/// An ordered map backed by an unbalanced binary search tree.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `get`          | O(h)       |
/// | `insert`       | O(h)       |
/// | `remove`       | O(h)       |
/// | `first`/`last` | O(h)       |
/// | `len`          | O(1)       |
///
/// where `h` is the height, between `log2(n)` and `n`.
///
/// # Examples
///
/// ```rust
/// use avlbst::BinarySearchTree;
///
/// let mut tree = BinarySearchTree::new();
/// for key in 1..=4 {
///     tree.insert(key, key * 10);
/// }
///
/// // Sorted insertion degenerates into a chain.
/// assert_eq!(tree.height(), 4);
/// assert!(!tree.is_balanced());
/// assert_eq!(tree.get(&3), Some(&30));
/// ```
#[derive(Clone)]
pub struct BinarySearchTree<K, V> {
    pub(crate) nodes: NodeArena<K, V>,
    pub(crate) root: Option<NodeId>,
    pub(crate) length: usize,
}

impl<K, V> BinarySearchTree<K, V> {
    /// Creates an empty tree.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.length = 0;
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn height(&self) -> usize {
        self.nodes.subtree_height(self.root)
    }

    /// A read-only handle to the root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|id| NodeRef::new(&self.nodes, id))
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| self.entry(self.nodes.leftmost(root)))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| self.entry(self.nodes.rightmost(root)))
    }

    /// In-order iterator over `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.length)
    }

    /// In-order iterator over keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// In-order iterator over values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns `true` if every node's subtree heights differ by at most one.
    ///
    /// Heights are recomputed from scratch; stored balance factors are not
    /// consulted.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let heights = self.subtree_heights();
        self.reachable().into_iter().all(|id| {
            let node = &self.nodes[id];
            let difference = height_in(&heights, node.left) - height_in(&heights, node.right);
            difference.abs() <= 1
        })
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = &self.nodes[id];
        (&node.key, &node.value)
    }

    #[inline]
    pub(crate) fn predecessor_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.predecessor(id)
    }

    #[inline]
    pub(crate) fn successor_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.successor(id)
    }

    /// Every node reachable from the root, in pre-order.
    pub(crate) fn reachable(&self) -> Vec<NodeId> {
        let mut visited = Vec::with_capacity(self.length);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            visited.push(id);
            let node = &self.nodes[id];
            stack.extend(node.right);
            stack.extend(node.left);
        }
        visited
    }

    /// Subtree height of every reachable node, indexed by slot.
    pub(crate) fn subtree_heights(&self) -> Vec<i64> {
        let mut heights = vec![0_i64; self.nodes.slot_count()];
        // Children are pushed after their parent in pre-order, so walking the
        // pre-order backwards visits every child before its parent.
        for id in self.reachable().into_iter().rev() {
            let node = &self.nodes[id];
            heights[id.index()] =
                1 + height_in(&heights, node.left).max(height_in(&heights, node.right));
        }
        heights
    }

    /// Writes `child` into `parent`'s slot on `side`, or into the root slot
    /// when `parent` is `None`. The child's own parent handle is not touched.
    pub(crate) fn replace_child(&mut self, parent: Option<(NodeId, Side)>, child: Option<NodeId>) {
        match parent {
            Some((parent, side)) => self.nodes[parent].set_child(side, child),
            None => self.root = child,
        }
    }

    /// The parent of `id` together with the side `id` hangs on.
    #[inline]
    pub(crate) fn position_of(&self, id: NodeId) -> Option<(NodeId, Side)> {
        let parent = self.nodes[id].parent?;
        let side = self.nodes.side_of(id)?;
        Some((parent, side))
    }

    /// Exchanges the positions of `first` and `second` in the tree.
    ///
    /// Both nodes keep their keys and values; only parent/child handles and
    /// the root slot are rewired. Works when one node is the other's direct
    /// child and when both share a parent. Balance factors are not touched.
    pub(crate) fn node_swap(&mut self, first: NodeId, second: NodeId) {
        if first == second {
            return;
        }
        let first_position = self.position_of(first);
        let second_position = self.position_of(second);
        let (first_parent, first_left, first_right) = self.links(first);
        let (second_parent, second_left, second_right) = self.links(second);

        // A link to the partner becomes a link to oneself after the exchange.
        let exchange = |link: Option<NodeId>| match link {
            Some(id) if id == first => Some(second),
            Some(id) if id == second => Some(first),
            other => other,
        };

        {
            let node = &mut self.nodes[first];
            node.parent = exchange(second_parent);
            node.left = exchange(second_left);
            node.right = exchange(second_right);
        }
        {
            let node = &mut self.nodes[second];
            node.parent = exchange(first_parent);
            node.left = exchange(first_left);
            node.right = exchange(first_right);
        }

        // Point the former parents at their new children. A parent that was
        // the partner itself has already been handled by `exchange`.
        if second_parent != Some(first) {
            self.replace_child(second_position, Some(first));
        }
        if first_parent != Some(second) {
            self.replace_child(first_position, Some(second));
        }

        for id in [first, second] {
            let (_, left, right) = self.links(id);
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(id);
            }
        }
    }

    #[inline]
    fn links(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        let node = &self.nodes[id];
        (node.parent, node.left, node.right)
    }

    /// Splices out a node that has at most one child, moving that child into
    /// its position, and releases the node's slot.
    ///
    /// Returns `None` if `id` has two children or is not live.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<Detached<K, V>> {
        let node = self.nodes.get(id)?;
        if node.has_two_children() {
            return None;
        }
        let child = node.left.or(node.right);
        let parent = self.position_of(id);

        if let Some(child) = child {
            self.nodes[child].parent = parent.map(|(parent, _)| parent);
        }
        self.replace_child(parent, child);

        let node = self.nodes.release(id)?;
        self.length -= 1;
        Some(Detached { node, parent })
    }

    /// Checks ordering, parent handles and the entry count.
    fn validate_links(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        if let Some(root) = self.root
            && self.nodes[root].parent.is_some()
        {
            return Err(InvariantViolation::ParentMismatch);
        }

        let reachable = self.reachable();
        for &id in &reachable {
            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes[child].parent != Some(id) {
                    return Err(InvariantViolation::ParentMismatch);
                }
            }
        }

        if reachable.len() != self.length || self.nodes.len() != self.length {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.length,
                actual: reachable.len(),
            });
        }

        let mut keys = self.keys();
        if let Some(mut previous) = keys.next() {
            for key in keys {
                if previous >= key {
                    return Err(InvariantViolation::Unordered);
                }
                previous = key;
            }
        }
        Ok(())
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    /// Locates the node holding `key`.
    pub(crate) fn internal_find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::BinarySearchTree;
    ///
    /// let mut tree = BinarySearchTree::new();
    /// tree.insert("hello".to_string(), 42);
    /// assert_eq!(tree.get("hello"), Some(&42));
    /// assert_eq!(tree.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.internal_find(key).map(|id| &self.nodes[id].value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.internal_find(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.internal_find(key).map(|id| self.entry(id))
    }

    /// Returns `true` if the tree holds `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.internal_find(key).is_some()
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
        self.get(key).ok_or(KeyError)
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
        self.get_mut(key).ok_or(KeyError)
    }

    /// The entry with the largest key strictly less than `key`.
    ///
    /// `key` does not have to be present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::BinarySearchTree;
    ///
    /// let tree: BinarySearchTree<i32, char> = [(10, 'a'), (20, 'b'), (30, 'c')]
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(tree.predecessor(&20), Some((&10, &'a')));
    /// assert_eq!(tree.predecessor(&25), Some((&20, &'b')));
    /// assert_eq!(tree.predecessor(&10), None);
    /// ```
    #[must_use]
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(id) = self.internal_find(key) {
            return self.predecessor_of(id).map(|id| self.entry(id));
        }
        let mut candidate = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.key.borrow() < key {
                candidate = Some(id);
                current = node.right;
            } else {
                current = node.left;
            }
        }
        candidate.map(|id| self.entry(id))
    }

    /// The entry with the smallest key strictly greater than `key`.
    ///
    /// `key` does not have to be present.
    #[must_use]
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(id) = self.internal_find(key) {
            return self.successor_of(id).map(|id| self.entry(id));
        }
        let mut candidate = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.key.borrow() > key {
                candidate = Some(id);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        candidate.map(|id| self.entry(id))
    }

    /// Descends to `key`'s position. An existing key has its value replaced;
    /// otherwise a new leaf is attached with its parent handle set.
    pub(crate) fn place(&mut self, key: K, value: V) -> Placement<V> {
        let Some(mut current) = self.root else {
            let id = self.nodes.allocate(Node::leaf(key, value, None));
            self.root = Some(id);
            self.length += 1;
            return Placement::Attached(id);
        };

        let side = loop {
            let node = &mut self.nodes[current];
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    return Placement::Replaced(std::mem::replace(&mut node.value, value));
                }
            };
            match node.child(side) {
                Some(child) => current = child,
                None => break side,
            }
        };

        let id = self.nodes.allocate(Node::leaf(key, value, Some(current)));
        self.nodes[current].set_child(side, Some(id));
        self.length += 1;
        Placement::Attached(id)
    }

    /// Inserts `key` with `value` without rebalancing.
    ///
    /// Returns the previous value if the key was already present, in which
    /// case the tree's shape is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.place(key, value) {
            Placement::Replaced(previous) => Some(previous),
            Placement::Attached(_) => None,
        }
    }

    /// Removes `key` without rebalancing and returns its value.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor, so the node actually spliced out has at most one child.
    /// Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.internal_find(key)?;
        if self.nodes[id].has_two_children()
            && let Some(predecessor) = self.predecessor_of(id)
        {
            self.node_swap(id, predecessor);
        }
        self.detach(id).map(|detached| detached.node.value)
    }

    /// Verifies the search-tree invariants: strictly increasing in-order
    /// keys, consistent parent handles, a parentless root and an accurate
    /// length.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.validate_links()
    }
}

#[inline]
fn height_in(heights: &[i64], id: Option<NodeId>) -> i64 {
    id.map_or(0, |id| heights[id.index()])
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for BinarySearchTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BinarySearchTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for BinarySearchTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for BinarySearchTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::drain(self.nodes, self.root)
    }
}

impl<'a, K, V> IntoIterator for &'a BinarySearchTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, Q, V> Index<&Q> for BinarySearchTree<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => panic!("{}", KeyError),
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BinarySearchTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BinarySearchTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BinarySearchTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for BinarySearchTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
