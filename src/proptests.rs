use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, HashSet};

/// Structural audit: BST order, size bookkeeping, arena consistency.
fn validate_tree<K: Ord + Clone + fmt::Debug, V>(t: &ScapegoatTree<K, V>) {
    assert!(t.max_count >= t.count, "max_size must never drop below len");
    assert_eq!(t.nodes.live(), t.count, "live arena nodes must match len");

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut reachable = 0usize;
    // (node, exclusive lower bound, exclusive upper bound)
    let mut stack: Vec<(NodeId, Option<K>, Option<K>)> = Vec::new();
    if !t.root.is_null() {
        stack.push((t.root, None, None));
    }
    while let Some((id, lo, hi)) = stack.pop() {
        assert!(t.nodes.is_live(id), "reachable node must be live");
        assert!(
            !t.nodes.free_slots().contains(&id),
            "reachable node must not sit on the free list"
        );
        assert!(seen.insert(id), "node reachable twice: {id:?}");
        reachable += 1;

        let node = t.nodes.node(id);
        if let Some(lo) = &lo {
            assert!(node.key > *lo, "{:?} must exceed {:?}", node.key, lo);
        }
        if let Some(hi) = &hi {
            assert!(node.key < *hi, "{:?} must be below {:?}", node.key, hi);
        }
        if !node.left.is_null() {
            stack.push((node.left, lo.clone(), Some(node.key.clone())));
        }
        if !node.right.is_null() {
            stack.push((node.right, Some(node.key.clone()), hi));
        }
    }
    assert_eq!(reachable, t.count, "reachable node count must match len");

    if let Some(depth) = max_depth(&t.nodes, t.root) {
        assert!(t.height >= depth, "recorded height {} below depth {depth}", t.height);
    }
    assert!(t.height <= t.depth_bound(), "recorded height exceeds the bound for len");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u16..512")] u16, u64),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u16..512")] u16),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "0u16..512")] u16),
}

fn alpha_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.51), Just(0.6), Just(2.0 / 3.0), Just(0.75), 0.501f64..0.999]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(alpha in alpha_strategy(), ops in prop::collection::vec(any::<Op>(), 0..=1500)) {
        let mut t: ScapegoatTree<u16, u64> = ScapegoatTree::with_alpha(alpha).unwrap();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(key, value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                    prop_assert_eq!(t.get(&key), Ok(&value));
                }
                Op::Remove(key) => {
                    let len = t.len();
                    let old_t = t.remove(&key).ok();
                    let old_m = m.remove(&key);
                    prop_assert_eq!(old_t, old_m);
                    if old_m.is_some() {
                        prop_assert_eq!(t.len(), len - 1);
                        prop_assert_eq!(t.get(&key), Err(TreeError::KeyNotFound));
                    } else {
                        prop_assert_eq!(t.len(), len);
                    }
                }
                Op::Get(key) => {
                    let len = t.len();
                    prop_assert_eq!(t.get(&key).ok(), m.get(&key));
                    prop_assert_eq!(t.len(), len);
                }
            }

            prop_assert_eq!(t.len(), m.len());
            if let Ok(depth) = t.depth() {
                prop_assert!(
                    depth <= t.depth_bound(),
                    "depth {} exceeds bound {} at len {}", depth, t.depth_bound(), t.len()
                );
            }
        }

        validate_tree(&t);
        let got: Vec<(u16, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_insert_only_depth_bound(
        alpha in alpha_strategy(),
        keys in prop::collection::vec(any::<i32>(), 1..=800),
    ) {
        let mut t = ScapegoatTree::with_alpha(alpha).unwrap();
        for (i, k) in keys.iter().enumerate() {
            t.insert(*k, i);
            let depth = t.depth().unwrap();
            prop_assert!(
                depth <= t.depth_bound(),
                "depth {} exceeds bound {} at len {}", depth, t.depth_bound(), t.len()
            );
        }
        validate_tree(&t);
    }

    #[test]
    fn prop_rebuild_preserves_contents(
        keys in prop::collection::btree_set(any::<u32>(), 0..=300),
        alpha in alpha_strategy(),
    ) {
        let mut t = ScapegoatTree::with_alpha(alpha).unwrap();
        for k in &keys {
            t.insert(*k, u64::from(*k) * 3);
        }
        let before: Vec<(u32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        t.rebuild();
        let after: Vec<(u32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
        if let Ok(depth) = t.depth() {
            prop_assert_eq!(depth, (t.len() as f64).log2().floor() as usize);
        }
        validate_tree(&t);
    }

    #[test]
    fn prop_reverse_iteration(keys in prop::collection::vec(any::<u8>(), 0..=200)) {
        let t: ScapegoatTree<u8, ()> = keys.iter().map(|k| (*k, ())).collect();
        let fwd: Vec<u8> = t.keys().copied().collect();
        let mut rev: Vec<u8> = t.keys().rev().copied().collect();
        rev.reverse();
        prop_assert_eq!(&fwd, &rev);
        prop_assert!(fwd.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(fwd.len(), t.len());
    }
}

/// Steps `items` to the next lexicographic ordering; false once it wraps
/// back to ascending.
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        items.reverse();
        return false;
    };
    let swap = items
        .iter()
        .rposition(|x| *x > items[pivot])
        .unwrap_or(pivot + 1);
    items.swap(pivot, swap);
    items[pivot + 1..].reverse();
    true
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    let mut order = keys.clone();
    let mut seen = 0;
    loop {
        let mut t = ScapegoatTree::with_alpha(0.55).unwrap();
        for (i, k) in order.iter().enumerate() {
            assert_eq!(t.insert(*k, i), None);
            assert!(t.depth().unwrap() <= t.depth_bound(), "order {order:?}");
        }
        validate_tree(&t);
        let got: Vec<u32> = t.keys().copied().collect();
        assert_eq!(got, keys);

        seen += 1;
        if !next_permutation(&mut order) {
            break;
        }
    }
    assert_eq!(seen, 5040);
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree = ScapegoatTree::new();
    let mut base_map: BTreeMap<u32, u32> = BTreeMap::new();
    for k in &keys {
        assert_eq!(base_tree.insert(*k, k * 7), base_map.insert(*k, k * 7));
    }

    let mut order = keys.clone();
    loop {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in &order {
            assert_eq!(t.remove(k).ok(), m.remove(k));
            assert_eq!(t.len(), m.len());
            if let Ok(depth) = t.depth() {
                assert!(depth <= t.depth_bound(), "order {order:?}");
            }
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_null());

        if !next_permutation(&mut order) {
            break;
        }
    }
}
