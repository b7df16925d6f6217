//! Iterators and visitor-style traversal.
//!
//! Every iterator here borrows the tree, so the borrow checker rules out
//! mutation (and therefore rebuilds) while one is alive. Calling `iter()`
//! again always starts a fresh walk from the root.

use std::iter::FusedIterator;

use crate::arena::{NodeArena, NodeId};

/// Visiting order for [`ScapegoatTree::traverse`](crate::ScapegoatTree::traverse).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Left subtree, node, right subtree. Ascending key order.
    InOrder,
    /// Node before both subtrees.
    PreOrder,
    /// Both subtrees before the node.
    PostOrder,
}

pub(crate) fn traverse<K, V>(
    nodes: &NodeArena<K, V>,
    root: NodeId,
    order: Order,
    mut visit: impl FnMut(&K, &V),
) {
    if root.is_null() {
        return;
    }
    match order {
        Order::InOrder => {
            let mut stack = Vec::new();
            let mut current = root;
            loop {
                while !current.is_null() {
                    stack.push(current);
                    current = nodes.left(current);
                }
                let Some(id) = stack.pop() else {
                    break;
                };
                let node = nodes.node(id);
                visit(&node.key, &node.value);
                current = node.right;
            }
        }
        Order::PreOrder => {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                let node = nodes.node(id);
                visit(&node.key, &node.value);
                if !node.right.is_null() {
                    stack.push(node.right);
                }
                if !node.left.is_null() {
                    stack.push(node.left);
                }
            }
        }
        Order::PostOrder => {
            // (id, children already scheduled)
            let mut stack = vec![(root, false)];
            while let Some((id, expanded)) = stack.pop() {
                let node = nodes.node(id);
                if expanded {
                    visit(&node.key, &node.value);
                    continue;
                }
                stack.push((id, true));
                if !node.right.is_null() {
                    stack.push((node.right, false));
                }
                if !node.left.is_null() {
                    stack.push((node.left, false));
                }
            }
        }
    }
}

/// Ordered iterator over `(&K, &V)` pairs. Double-ended: `.rev()` walks keys
/// in descending order.
pub struct Iter<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    /// Left spine still to be yielded from the front.
    front: Vec<NodeId>,
    /// Right spine still to be yielded from the back.
    back: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(nodes: &'a NodeArena<K, V>, root: NodeId, len: usize) -> Self {
        let mut iter = Self {
            nodes,
            front: Vec::new(),
            back: Vec::new(),
            remaining: len,
        };
        iter.descend_left(root);
        iter.descend_right(root);
        iter
    }

    fn descend_left(&mut self, mut id: NodeId) {
        while !id.is_null() {
            self.front.push(id);
            id = self.nodes.left(id);
        }
    }

    fn descend_right(&mut self, mut id: NodeId) {
        while !id.is_null() {
            self.back.push(id);
            id = self.nodes.right(id);
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front.pop()?;
        let nodes = self.nodes;
        let node = nodes.node(id);
        self.descend_left(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back.pop()?;
        let nodes = self.nodes;
        let node = nodes.node(id);
        self.descend_right(node.left);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

/// Ordered iterator over keys.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Values in key order.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Owning iterator over `(K, V)` pairs in key order.
pub struct IntoIter<K, V> {
    pub(crate) inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}
