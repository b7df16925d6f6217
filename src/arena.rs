// =============================================================================
// Node Arena
// =============================================================================
//
// Nodes live in a single `Vec` slab and refer to each other by 32-bit index.
// Rebuilds relink existing slots instead of reallocating, and freed slots are
// recycled through a free list.

/// Index of a node in the arena. `NodeId::NULL` marks an absent child.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);

    /// Panics once the slab outgrows the 32-bit index space; `u32::MAX` is
    /// reserved for `NULL`.
    #[inline]
    fn new(idx: usize) -> Self {
        match u32::try_from(idx) {
            Ok(raw) if raw != u32::MAX => Self(raw),
            _ => panic!("node arena exceeds u32 index space"),
        }
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    fn idx(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

/// Slab of tree nodes with a free list of vacated slots.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Allocates a childless node, reusing a vacant slot when one exists.
    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Node {
            key,
            value,
            left: NodeId::NULL,
            right: NodeId::NULL,
        };
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.idx()].is_none());
                self.slots[id.idx()] = Some(node);
                id
            }
            None => {
                let id = NodeId::new(self.slots.len());
                self.slots.push(Some(node));
                id
            }
        }
    }

    /// Vacates `id` and hands back its contents. Children are not touched.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.idx()].take();
        debug_assert!(node.is_some(), "double free of node {id:?}");
        self.free.push(id);
        match node {
            Some(node) => node,
            None => unreachable!("freed a vacant arena slot"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.idx()] {
            Some(node) => node,
            None => unreachable!("dangling node id {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.idx()] {
            Some(node) => node,
            None => unreachable!("dangling node id {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> NodeId {
        self.node(id).left
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> NodeId {
        self.node(id).right
    }

    #[inline]
    pub(crate) fn set_children(&mut self, id: NodeId, left: NodeId, right: NodeId) {
        let node = self.node_mut(id);
        node.left = left;
        node.right = right;
    }

    #[cfg(test)]
    pub(crate) fn free_slots(&self) -> &[NodeId] {
        &self.free
    }

    #[cfg(test)]
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        !id.is_null() && self.slots.get(id.idx()).is_some_and(Option::is_some)
    }
}
