//! Slot storage for tree nodes.
//!
//! Every node of a tree lives in one [`NodeArena`]. Links between nodes are
//! [`NodeId`] handles into the arena instead of pointers, which lets a node
//! refer to its parent without creating an ownership cycle.

use std::ops::{Index, IndexMut};

use super::node::{Node, NodeId, Side};

/// A single arena slot.
#[derive(Clone, Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    /// A released slot, chained into the free list.
    Vacant { next_free: Option<NodeId> },
}

/// Owns the nodes of one tree and hands out stable [`NodeId`] handles.
///
/// Released slots are chained into a free list and reused by the next
/// allocation, so a long-lived tree with churn does not grow without bound.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<NodeId>,
    live: usize,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    /// Stores `node` and returns its handle.
    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        self.live += 1;
        match self.free_head {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                if let Slot::Vacant { next_free } = *slot {
                    self.free_head = next_free;
                }
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId::new(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Removes the node behind `id` and returns it.
    ///
    /// Returns `None` if the slot was already released.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let slot = self.slots.get_mut(id.index())?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let previous = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id);
        self.live -= 1;
        match previous {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Drops every node and forgets all handles.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }
}

// =============================================================================
// Navigation
// =============================================================================

impl<K, V> NodeArena<K, V> {
    /// Number of slots ever allocated, live or vacant. Every issued handle
    /// has an index below this.
    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Which child slot of its parent `id` occupies, or `None` for a root.
    pub(crate) fn side_of(&self, id: NodeId) -> Option<Side> {
        let parent = self[id].parent?;
        if self[parent].left == Some(id) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Leftmost node of the subtree rooted at `id`.
    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    /// Rightmost node of the subtree rooted at `id`.
    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// In-order successor: leftmost node of the right subtree, or the nearest
    /// ancestor whose left subtree contains `id`.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self[id].right {
            return Some(self.leftmost(right));
        }
        let mut current = id;
        while let Some(parent) = self[current].parent {
            if self[parent].left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// In-order predecessor: rightmost node of the left subtree, or the
    /// nearest ancestor whose right subtree contains `id`.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self[id].left {
            return Some(self.rightmost(left));
        }
        let mut current = id;
        while let Some(parent) = self[current].parent {
            if self[parent].right == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Height of the subtree rooted at `id` (absent is 0, a leaf is 1),
    /// measured level by level so degenerate trees do not recurse deeply.
    pub(crate) fn subtree_height(&self, id: Option<NodeId>) -> usize {
        let mut level: Vec<NodeId> = id.into_iter().collect();
        let mut height = 0;
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&node| [self[node].left, self[node].right])
                .flatten()
                .collect();
        }
        height
    }
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Indexing with a released handle is a defect in the tree code and panics,
/// like indexing a slice out of bounds.
impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node handle {} does not refer to a live node", id.index()),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node handle {} does not refer to a live node", id.index()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_returns_distinct_handles() {
        let mut arena = NodeArena::new();
        let first = arena.allocate(Node::leaf(1, "one", None));
        let second = arena.allocate(Node::leaf(2, "two", None));

        assert_ne!(first, second);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[first].key, 1);
        assert_eq!(arena[second].key, 2);
    }

    #[rstest]
    fn test_release_returns_node_and_frees_slot() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(Node::leaf(1, "one", None));

        let node = arena.release(id);
        assert_eq!(node.map(|node| node.value), Some("one"));
        assert_eq!(arena.len(), 0);
        assert!(arena.get(id).is_none());
    }

    #[rstest]
    fn test_double_release_is_rejected() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(Node::leaf(1, (), None));
        assert!(arena.release(id).is_some());
        assert!(arena.release(id).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[rstest]
    fn test_released_slots_are_reused_last_in_first_out() {
        let mut arena = NodeArena::new();
        let first = arena.allocate(Node::leaf(1, (), None));
        let second = arena.allocate(Node::leaf(2, (), None));
        arena.release(first);
        arena.release(second);

        assert_eq!(arena.allocate(Node::leaf(3, (), None)), second);
        assert_eq!(arena.allocate(Node::leaf(4, (), None)), first);
        let fresh = arena.allocate(Node::leaf(5, (), None));
        assert_eq!(fresh.index(), 2);
        assert_eq!(arena.len(), 3);
    }

    #[rstest]
    fn test_clear_drops_everything() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(Node::leaf(1, (), None));
        arena.clear();

        assert_eq!(arena.len(), 0);
        assert!(arena.get(id).is_none());
        assert_eq!(arena.allocate(Node::leaf(2, (), None)).index(), 0);
    }

    #[rstest]
    #[should_panic(expected = "does not refer to a live node")]
    fn test_index_with_released_handle_panics() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(Node::leaf(1, (), None));
        arena.release(id);
        let _ = &arena[id];
    }

    fn chain_arena() -> (NodeArena<i32, ()>, [NodeId; 3]) {
        // 2 at the root, 1 on the left, 3 on the right
        let mut arena = NodeArena::new();
        let root = arena.allocate(Node::leaf(2, (), None));
        let left = arena.allocate(Node::leaf(1, (), Some(root)));
        let right = arena.allocate(Node::leaf(3, (), Some(root)));
        arena[root].left = Some(left);
        arena[root].right = Some(right);
        (arena, [left, root, right])
    }

    #[rstest]
    fn test_navigation_follows_in_order() {
        let (arena, [left, root, right]) = chain_arena();

        assert_eq!(arena.leftmost(root), left);
        assert_eq!(arena.rightmost(root), right);
        assert_eq!(arena.successor(left), Some(root));
        assert_eq!(arena.successor(root), Some(right));
        assert_eq!(arena.successor(right), None);
        assert_eq!(arena.predecessor(right), Some(root));
        assert_eq!(arena.predecessor(root), Some(left));
        assert_eq!(arena.predecessor(left), None);
    }

    #[rstest]
    fn test_side_of_and_height() {
        let (arena, [left, root, right]) = chain_arena();

        assert_eq!(arena.side_of(left), Some(Side::Left));
        assert_eq!(arena.side_of(right), Some(Side::Right));
        assert_eq!(arena.side_of(root), None);
        assert_eq!(arena.subtree_height(Some(root)), 2);
        assert_eq!(arena.subtree_height(Some(left)), 1);
        assert_eq!(arena.subtree_height(None), 0);
    }
}
