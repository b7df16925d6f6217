//! # scapegoat-tree
//!
//! An ordered map backed by a scapegoat tree: a binary search tree that keeps
//! no per-node balance metadata and instead rebuilds whole subtrees when an
//! insertion lands too deep or deletions shrink the tree too far.
//!
//! Based on "Scapegoat Trees" (SODA 1993, Galperin and Rivest).
//!
//! ## Example
//!
//! ```rust
//! use scapegoat_tree::{ScapegoatTree, TreeError};
//!
//! let mut tree = ScapegoatTree::with_alpha(0.6)?;
//! tree.insert(2, "two");
//! tree.insert(1, "one");
//!
//! assert_eq!(tree.get(&1), Ok(&"one"));
//! assert_eq!(tree.remove(&2), Ok("two"));
//! assert_eq!(tree.get(&2), Err(TreeError::KeyNotFound));
//! # Ok::<(), TreeError>(())
//! ```
//!
//! The tree is a plain single-threaded container. Share it across threads
//! behind a lock: a rebuild may relink any number of nodes.

mod arena;
mod config;
mod error;
mod iter;
mod rebuild;
mod render;
mod tracing_helpers;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use arena::{NodeArena, NodeId};
use rebuild::{build_balanced, flatten, height_bound, max_depth, subtree_size};
use tracing_helpers::{debug_log, trace_log};

pub use config::Alpha;
pub use error::TreeError;
pub use iter::{IntoIter, Iter, Keys, Order, Values};

// =============================================================================
// Configuration
// =============================================================================

/// Initial capacity of the descent path; covers trees far beyond memory size.
const PATH_CAPACITY: usize = 64;

// =============================================================================
// ScapegoatTree
// =============================================================================

/// Counters of rebuilds performed since the tree was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Subtree rebuilds rooted at a scapegoat, triggered by deep insertions.
    pub partial: u64,
    /// Whole-tree rebuilds, triggered by deletions or [`ScapegoatTree::rebuild`].
    pub full: u64,
}

/// An ordered map kept loosely balanced by scapegoat rebuilds.
///
/// - Arena-backed nodes addressed by 32-bit index, no parent pointers
/// - Inserting an existing key overwrites its value
/// - A deep insertion rebuilds the lowest ancestor subtree that is too short
///   for its size; a deletion that leaves fewer than `alpha * max_size`
///   entries, or that leaves the tree taller than its new size allows,
///   rebuilds the whole tree
/// - No node is ever deeper than `floor(log_{1/alpha}(len))` once an
///   operation returns
pub struct ScapegoatTree<K, V> {
    nodes: NodeArena<K, V>,
    root: NodeId,
    alpha: Alpha,
    count: usize,
    /// Largest `count` since the last whole-tree rebuild.
    max_count: usize,
    /// Upper bound on the depth of the deepest node. Exact after a whole-tree
    /// rebuild, raised only by insertions.
    height: usize,
    stats: RebuildStats,
}

impl<K, V> ScapegoatTree<K, V> {
    /// Creates an empty tree with [`Alpha::DEFAULT`].
    pub fn new() -> Self {
        Self::with_config(Alpha::DEFAULT)
    }

    /// Creates an empty tree, rejecting `alpha` outside (0.5, 1.0).
    pub fn with_alpha(alpha: f64) -> Result<Self, TreeError> {
        Ok(Self::with_config(Alpha::new(alpha)?))
    }

    pub fn with_config(alpha: Alpha) -> Self {
        Self {
            nodes: NodeArena::new(),
            root: NodeId::NULL,
            alpha,
            count: 0,
            max_count: 0,
            height: 0,
            stats: RebuildStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha.get()
    }

    /// Largest size reached since the last whole-tree rebuild.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_count
    }

    #[inline]
    pub fn stats(&self) -> RebuildStats {
        self.stats
    }

    /// `floor(log_{1/alpha}(len))`: no node sits deeper than this between
    /// operations.
    pub fn depth_bound(&self) -> usize {
        height_bound(self.count, self.alpha.inverse())
    }

    /// Depth of the deepest node, with the root at depth 0.
    ///
    /// Walks the whole tree. Balancing decisions never use it.
    pub fn depth(&self) -> Result<usize, TreeError> {
        max_depth(&self.nodes, self.root).ok_or(TreeError::EmptyTree)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeId::NULL;
        self.count = 0;
        self.max_count = 0;
        self.height = 0;
    }

    /// Rebuilds the whole tree into a perfectly balanced shape and resets
    /// `max_size` to the current size. Returns the number of nodes relinked.
    pub fn rebuild(&mut self) -> usize {
        self.rebuild_all()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.count)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Calls `visit` on every entry in the given order.
    pub fn traverse(&self, order: Order, visit: impl FnMut(&K, &V)) {
        iter::traverse(&self.nodes, self.root, order, visit);
    }

    /// Entry with the smallest key.
    pub fn find_min(&self) -> Result<(&K, &V), TreeError> {
        let mut current = self.root;
        if current.is_null() {
            return Err(TreeError::EmptyTree);
        }
        while !self.nodes.left(current).is_null() {
            current = self.nodes.left(current);
        }
        let node = self.nodes.node(current);
        Ok((&node.key, &node.value))
    }

    /// Entry with the largest key.
    pub fn find_max(&self) -> Result<(&K, &V), TreeError> {
        let mut current = self.root;
        if current.is_null() {
            return Err(TreeError::EmptyTree);
        }
        while !self.nodes.right(current).is_null() {
            current = self.nodes.right(current);
        }
        let node = self.nodes.node(current);
        Ok((&node.key, &node.value))
    }

    fn rebuild_all(&mut self) -> usize {
        let ids = flatten(&self.nodes, self.root);
        debug_assert_eq!(ids.len(), self.count);
        debug_assert_eq!(self.nodes.live(), self.count);
        self.root = build_balanced(&mut self.nodes, &ids);
        self.max_count = self.count;
        self.height = ids.len().checked_ilog2().map_or(0, |h| h as usize);
        self.stats.full += 1;
        debug_log!(size = ids.len(), "rebuilt whole tree");
        ids.len()
    }

    /// Points whichever child link of `parent` held `old` at `new`, or the
    /// root when `parent` is `NULL`.
    #[inline]
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_null() {
            debug_assert_eq!(self.root, old);
            self.root = new;
            return;
        }
        let node = self.nodes.node_mut(parent);
        if node.left == old {
            node.left = new;
        } else {
            debug_assert_eq!(node.right, old);
            node.right = new;
        }
    }
}

impl<K: Ord, V> ScapegoatTree<K, V> {
    fn find<Q>(&self, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while !current.is_null() {
            let node = self.nodes.node(current);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return current,
            };
        }
        NodeId::NULL
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key);
        if id.is_null() {
            return Err(TreeError::KeyNotFound);
        }
        Ok(&self.nodes.node(id).value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key);
        if id.is_null() {
            return Err(TreeError::KeyNotFound);
        }
        Ok(&mut self.nodes.node_mut(id).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_null()
    }

    /// Inserts `key`, returning the previous value if the key was present.
    ///
    /// An existing key keeps its node and only has its value replaced, so the
    /// tree never holds two nodes with equal keys.
    ///
    /// # Panics
    ///
    /// Panics if the tree would need more than `u32::MAX - 1` node slots.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.root.is_null() {
            self.root = self.nodes.alloc(key, value);
            self.count = 1;
            self.max_count = self.max_count.max(1);
            self.height = 0;
            return None;
        }

        // Descend, recording every ancestor of the new leaf.
        let mut path: Vec<NodeId> = Vec::with_capacity(PATH_CAPACITY);
        let mut current = self.root;
        let went_left = loop {
            let node = self.nodes.node(current);
            let (next, left) = match key.cmp(&node.key) {
                Ordering::Less => (node.left, true),
                Ordering::Greater => (node.right, false),
                Ordering::Equal => {
                    let slot = &mut self.nodes.node_mut(current).value;
                    return Some(std::mem::replace(slot, value));
                }
            };
            path.push(current);
            if next.is_null() {
                break left;
            }
            current = next;
        };

        let leaf = self.nodes.alloc(key, value);
        let parent = self.nodes.node_mut(current);
        if went_left {
            parent.left = leaf;
        } else {
            parent.right = leaf;
        }
        self.count += 1;
        self.max_count = self.max_count.max(self.count);

        let depth = path.len();
        if depth > self.depth_bound() {
            trace_log!(depth, size = self.count, "insertion is too deep");
            // Everything in the rebuilt subtree ends above `depth`, so the
            // recorded height still covers it.
            self.rebuild_scapegoat(&path, leaf);
        } else {
            self.height = self.height.max(depth);
        }
        debug_assert!(self.height <= self.depth_bound());
        None
    }

    /// Walks up from the freshly inserted `leaf` and rebuilds the subtree of
    /// the first ancestor `x` whose height above the leaf exceeds
    /// `floor(log_{1/alpha}(size(x)))`.
    ///
    /// That ancestor is never alpha-weight-balanced: the child on the path
    /// already holds at least `(1/alpha)^(h-1)` nodes, more than
    /// `alpha * size(x)`. Its balanced rebuild has height at most `h - 1`, so
    /// every node in it ends above the leaf's old depth. The root always
    /// qualifies because the leaf was deep.
    fn rebuild_scapegoat(&mut self, path: &[NodeId], leaf: NodeId) {
        let inv_alpha = self.alpha.inverse();
        let mut child = leaf;
        let mut child_size = 1usize;
        let mut scapegoat = (0, self.count);

        for (height, i) in (0..path.len()).rev().enumerate().map(|(d, i)| (d + 1, i)) {
            let ancestor = path[i];
            let node = self.nodes.node(ancestor);
            let sibling = if node.left == child {
                node.right
            } else {
                node.left
            };
            // Only the sibling is counted; the path side is carried upward.
            let size = child_size + 1 + subtree_size(&self.nodes, sibling);
            if height > height_bound(size, inv_alpha) {
                scapegoat = (i, size);
                break;
            }
            child = ancestor;
            child_size = size;
        }

        let (i, size) = scapegoat;
        let goat = path[i];
        let parent = if i == 0 { NodeId::NULL } else { path[i - 1] };

        let ids = flatten(&self.nodes, goat);
        debug_assert_eq!(ids.len(), size);
        let rebuilt = build_balanced(&mut self.nodes, &ids);
        self.replace_child(parent, goat, rebuilt);
        self.stats.partial += 1;
        debug_log!(
            subtree = size,
            depth = i,
            size = self.count,
            "rebuilt scapegoat subtree"
        );
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` and returns the stored key together with its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V), TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut parent = NodeId::NULL;
        let mut current = self.root;
        loop {
            if current.is_null() {
                return Err(TreeError::KeyNotFound);
            }
            let node = self.nodes.node(current);
            let next = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => break,
            };
            parent = current;
            current = next;
        }

        let node = self.nodes.node(current);
        let (left, right) = (node.left, node.right);
        let replacement = if left.is_null() {
            right
        } else if right.is_null() {
            left
        } else {
            // Relink the in-order successor into the removed node's place.
            let mut succ_parent = current;
            let mut succ = right;
            while !self.nodes.left(succ).is_null() {
                succ_parent = succ;
                succ = self.nodes.left(succ);
            }
            if succ_parent == current {
                self.nodes.node_mut(succ).left = left;
            } else {
                let succ_right = self.nodes.right(succ);
                self.nodes.node_mut(succ_parent).left = succ_right;
                self.nodes.set_children(succ, left, right);
            }
            succ
        };
        self.replace_child(parent, current, replacement);

        let removed = self.nodes.free(current);
        self.count -= 1;

        let shrunk = (self.count as f64) < self.alpha.get() * self.max_count as f64;
        if shrunk || self.height > self.depth_bound() {
            self.rebuild_all();
        }
        Ok((removed.key, removed.value))
    }
}

impl<K, V> Default for ScapegoatTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for ScapegoatTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            alpha: self.alpha,
            count: self.count,
            max_count: self.max_count,
            height: self.height,
            stats: self.stats,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ScapegoatTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ScapegoatTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for ScapegoatTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, Q, V> Index<&Q> for ScapegoatTree<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Panics if the key is absent, like `BTreeMap`.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Ok(v) => v,
            Err(_) => panic!("key not found in ScapegoatTree"),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ScapegoatTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for ScapegoatTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let ids = flatten(&self.nodes, self.root);
        let items: Vec<(K, V)> = ids
            .into_iter()
            .map(|id| {
                let node = self.nodes.free(id);
                (node.key, node.value)
            })
            .collect();
        IntoIter {
            inner: items.into_iter(),
        }
    }
}


#[cfg(test)]
mod proptests;
