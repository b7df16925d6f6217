//! Subtree flattening and balanced reconstruction.
//!
//! These work directly on a [`NodeArena`] and hold no state of their own.
//! A rebuild never moves keys or values: it collects the subtree's node ids
//! in key order and relinks the same slots into a perfectly balanced shape.

use crate::arena::{NodeArena, NodeId};

/// In-order node ids of the subtree rooted at `root`.
pub(crate) fn flatten<K, V>(nodes: &NodeArena<K, V>, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut current = root;
    loop {
        while !current.is_null() {
            stack.push(current);
            current = nodes.left(current);
        }
        let Some(id) = stack.pop() else {
            break;
        };
        out.push(id);
        current = nodes.right(id);
    }
    out
}

/// Relinks `sorted` into a perfectly balanced subtree and returns its root.
///
/// The middle element becomes the root, so a slice of `n` ids produces a
/// subtree of height `floor(log2(n))`. Recursion depth is logarithmic.
pub(crate) fn build_balanced<K, V>(nodes: &mut NodeArena<K, V>, sorted: &[NodeId]) -> NodeId {
    if sorted.is_empty() {
        return NodeId::NULL;
    }
    let mid = sorted.len() / 2;
    let left = build_balanced(nodes, &sorted[..mid]);
    let right = build_balanced(nodes, &sorted[mid + 1..]);
    nodes.set_children(sorted[mid], left, right);
    sorted[mid]
}

/// Number of nodes in the subtree rooted at `root` (0 for `NULL`).
pub(crate) fn subtree_size<K, V>(nodes: &NodeArena<K, V>, root: NodeId) -> usize {
    if root.is_null() {
        return 0;
    }
    let mut count = 0usize;
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        count += 1;
        let node = nodes.node(id);
        if !node.left.is_null() {
            stack.push(node.left);
        }
        if !node.right.is_null() {
            stack.push(node.right);
        }
    }
    count
}

/// Depth of the deepest node below `root`, counting `root` as depth 0.
pub(crate) fn max_depth<K, V>(nodes: &NodeArena<K, V>, root: NodeId) -> Option<usize> {
    if root.is_null() {
        return None;
    }
    let mut deepest = 0usize;
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        let node = nodes.node(id);
        if !node.left.is_null() {
            stack.push((node.left, depth + 1));
        }
        if !node.right.is_null() {
            stack.push((node.right, depth + 1));
        }
    }
    Some(deepest)
}

/// `floor(log_{inv_alpha}(n))`, the deepest level a tree of `n` nodes may use.
///
/// `inv_alpha` is `1 / alpha` and lies in (1, 2). Zero for `n <= 1`.
pub(crate) fn height_bound(n: usize, inv_alpha: f64) -> usize {
    debug_assert!(inv_alpha > 1.0 && inv_alpha < 2.0);
    if n <= 1 {
        return 0;
    }
    let n = n as f64;
    let mut k = (n.ln() / inv_alpha.ln()).floor() as usize;
    // The quotient can land a hair off an exact power; settle on the largest
    // k with inv_alpha^k <= n.
    if inv_alpha.powi(k as i32 + 1) <= n {
        k += 1;
    } else if k > 0 && inv_alpha.powi(k as i32) > n {
        k -= 1;
    }
    k
}
