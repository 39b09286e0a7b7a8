//! Bulk load: build a tree directly from an already-sorted sequence of
//! pairs, bottom-up, instead of one `set` at a time (spec §4.9). Leaves are
//! packed evenly rather than greedily filled to `maxNodeSize`, so a bulk
//! load doesn't leave behind the single trailing underfull leaf that
//! naive "chunk by maxNodeSize" packing would create.

use crate::comparator::Comparator;
use crate::error::{ErrorKind, Result};
use crate::node::{self, InternalNode, NodeData, NodeRef};
use itertools::Itertools;
use std::cmp::Ordering;

/// Builds a tree node from `pairs`, which must be strictly ascending under
/// `cmp`. Returns the root and its size; `pairs` must be non-empty only when
/// the caller itself guarantees so — an empty slice yields an empty leaf.
pub(crate) fn build_from_sorted<K: Clone, V: Clone, C: Comparator<K>>(
    pairs: Vec<(K, V)>,
    cmp: &C,
    max_node_size: usize,
) -> Result<NodeRef<K, V>> {
    log::trace!("bulk loading {} pairs, maxNodeSize={}", pairs.len(), max_node_size);
    for (prev, next) in pairs.iter().tuple_windows() {
        if cmp.compare(&prev.0, &next.0) != Ordering::Less {
            return Err(ErrorKind::BulkLoadOrder.into());
        }
    }
    if pairs.is_empty() {
        return Ok(node::empty_leaf());
    }

    let leaves = pack_leaves(pairs, max_node_size);
    let mut level: Vec<NodeRef<K, V>> = leaves
        .into_iter()
        .map(|(keys, values)| node::leaf_from_sorted(keys, values))
        .collect();

    while level.len() > 1 {
        level = pack_internal_level(level, max_node_size);
    }
    Ok(level.into_iter().next().expect("non-empty pairs produce at least one node"))
}

/// Splits `pairs` into `ceil(n / maxNodeSize)` leaves of as-even-as-possible
/// size, rather than `maxNodeSize`-sized chunks with a short last leaf.
fn pack_leaves<K, V>(pairs: Vec<(K, V)>, max_node_size: usize) -> Vec<(Vec<K>, Vec<V>)> {
    let n = pairs.len();
    let leaf_count = (n + max_node_size - 1) / max_node_size;
    let base = n / leaf_count;
    let extra = n % leaf_count;

    let mut out = Vec::with_capacity(leaf_count);
    let mut iter = pairs.into_iter();
    for i in 0..leaf_count {
        let this_len = base + if i < extra { 1 } else { 0 };
        let mut keys = Vec::with_capacity(this_len);
        let mut values = Vec::with_capacity(this_len);
        for _ in 0..this_len {
            let (k, v) = iter.next().expect("leaf packing arithmetic accounts for every pair");
            keys.push(k);
            values.push(v);
        }
        out.push((keys, values));
    }
    out
}

/// Groups one level of already-built nodes into parents, evenly distributed
/// the same way `pack_leaves` does, so a bulk load never produces an
/// internal node with just one child, even at the top of an odd-sized run.
fn pack_internal_level<K: Clone, V>(nodes: Vec<NodeRef<K, V>>, max_node_size: usize) -> Vec<NodeRef<K, V>> {
    let n = nodes.len();
    if n <= max_node_size {
        return vec![wrap_internal(nodes)];
    }
    let group_count = (n + max_node_size - 1) / max_node_size;
    let base = n / group_count;
    let extra = n % group_count;

    let mut out = Vec::with_capacity(group_count);
    let mut iter = nodes.into_iter();
    for i in 0..group_count {
        let this_len = base + if i < extra { 1 } else { 0 };
        let mut group = Vec::with_capacity(this_len);
        for _ in 0..this_len {
            if let Some(node) = iter.next() {
                group.push(node);
            }
        }
        out.push(wrap_internal(group));
    }
    out
}

fn wrap_internal<K: Clone, V>(children: Vec<NodeRef<K, V>>) -> NodeRef<K, V> {
    std::rc::Rc::new(NodeData::Internal(InternalNode::from_children(children)))
}
