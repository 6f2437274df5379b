//! Node representation shared by the plain and the balanced tree.

/// Handle addressing one node slot in a [`NodeArena`](super::arena::NodeArena).
///
/// Handles are only meaningful for the arena that issued them and are
/// invalidated when the node is released.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The balance delta a parent sees when its subtree on this side grows
    /// by one level.
    #[inline]
    pub(crate) const fn growth(self) -> i8 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }

    /// The balance delta a parent sees when its subtree on this side shrinks
    /// by one level.
    #[inline]
    pub(crate) const fn shrink(self) -> i8 {
        -self.growth()
    }
}

/// A tree node.
///
/// Child handles are owning in the sense that a node reachable only through
/// its parent's child slot is released together with the tree. The parent
/// handle is navigational only.
///
/// `balance` is `height(left) - height(right)`. The plain search tree leaves
/// it at 0; the AVL engine keeps it in `{-1, 0, 1}` between operations and
/// lets it reach `±2` only while a fix-up walk is in progress.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf with balance 0.
    pub(crate) const fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            balance: 0,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[inline]
    pub(crate) const fn has_two_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Adds `diff` to the balance factor.
    #[inline]
    pub(crate) const fn update_balance(&mut self, diff: i8) {
        self.balance += diff;
    }
}
