//! Read-only view of individual tree nodes.

use std::fmt;

use super::arena::NodeArena;
use super::node::NodeId;

/// A borrowed handle to one node of a tree.
///
/// `NodeRef` exposes the shape of the tree (children, parent, balance
/// factor) without allowing structural changes. It is obtained from `root`
/// and navigated with [`left`](Self::left), [`right`](Self::right) and
/// [`parent`](Self::parent).
///
/// # Examples
///
/// ```rust
/// use avlbst::AvlTree;
///
/// let tree: AvlTree<i32, ()> = [(10, ()), (20, ()), (30, ())].into_iter().collect();
/// let root = tree.root().unwrap();
///
/// assert_eq!(root.key(), &20);
/// assert_eq!(root.left().map(|node| *node.key()), Some(10));
/// assert_eq!(root.right().map(|node| *node.key()), Some(30));
/// assert_eq!(root.balance(), 0);
/// ```
pub struct NodeRef<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) const fn new(nodes: &'a NodeArena<K, V>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    fn link(&self, target: Option<NodeId>) -> Option<Self> {
        target.map(|id| Self::new(self.nodes, id))
    }

    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.nodes[self.id].key
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> &'a V {
        &self.nodes[self.id].value
    }

    /// The stored balance factor, `height(left) - height(right)`.
    ///
    /// Always 0 for nodes of a plain [`BinarySearchTree`](super::BinarySearchTree),
    /// which does not track balance.
    #[must_use]
    pub fn balance(&self) -> i8 {
        self.nodes[self.id].balance
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    ///
    /// # Complexity
    ///
    /// O(size of the subtree)
    #[must_use]
    pub fn height(&self) -> usize {
        self.nodes.subtree_height(Some(self.id))
    }

    /// The left child, if any.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.link(self.nodes[self.id].left)
    }

    /// The right child, if any.
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.link(self.nodes[self.id].right)
    }

    /// The parent, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.link(self.nodes[self.id].parent)
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.nodes[self.id].is_leaf()
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

/// Two refs are equal when they point at the same node of the same tree.
impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.nodes, other.nodes) && self.id == other.id
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("balance", &self.balance())
            .finish()
    }
}
