use super::{InsertOutcome, NodeData, NodeRef};
use crate::comparator::Comparator;
use std::cmp::Ordering;
use std::rc::Rc;

/// A leaf node: parallel `keys`/`values` arrays, strictly ascending under
/// the tree's comparator (spec §3 invariant 1, §4.2).
#[derive(Debug, Clone)]
pub(crate) struct LeafNode<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

/// Result of an in-place edit callback applied to one pair during
/// `forRange`/`editRange` (spec §4.2, §6). `value`/`delete`/`brk` compose
/// freely, matching `{}` | `{value}` | `{delete:true}` | `{break:R}` or any
/// combination of break with one of the first two.
pub struct EditAction<V, R> {
    pub value: Option<V>,
    pub delete: bool,
    pub brk: Option<R>,
}

impl<V, R> EditAction<V, R> {
    pub fn keep() -> Self {
        EditAction { value: None, delete: false, brk: None }
    }
    pub fn replace(v: V) -> Self {
        EditAction { value: Some(v), delete: false, brk: None }
    }
    pub fn delete() -> Self {
        EditAction { value: None, delete: true, brk: None }
    }
    pub fn with_break(mut self, r: R) -> Self {
        self.brk = Some(r);
        self
    }
}

/// Outcome of rebalancing an underfull leaf against a sibling, named after
/// the teacher's own `FillUpResult` (`tree/imp/flush.rs`): either the pair
/// merged into one node, or keys were redistributed and the new separator
/// must propagate to the parent.
pub(crate) enum FillUpResult<K> {
    Rebalanced(K),
    Merged,
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        LeafNode { keys: Vec::new(), values: Vec::new() }
    }

    pub(crate) fn from_sorted(keys: Vec<K>, values: Vec<V>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        LeafNode { keys, values }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn max_key(&self) -> &K {
        self.keys.last().expect("max_key on empty leaf")
    }

    pub(crate) fn min_key(&self) -> &K {
        self.keys.first().expect("min_key on empty leaf")
    }

    pub(crate) fn is_too_small(&self, max_node_size: usize) -> bool {
        self.len() < (max_node_size + 1) / 2
    }

    pub(crate) fn is_full(&self, max_node_size: usize) -> bool {
        self.len() >= max_node_size
    }

    /// Binary search returning the match index, or (following spec's
    /// `indexOf`) the insertion point on the error side, exactly like
    /// `slice::binary_search_by`'s own convention.
    pub(crate) fn index_of<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Result<usize, usize> {
        self.keys.binary_search_by(|k| cmp.compare(k, key))
    }

    pub(crate) fn get<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Option<&V> {
        self.index_of(key, cmp).ok().map(|i| &self.values[i])
    }

    pub(crate) fn get_at(&self, i: usize) -> (&K, &V) {
        (&self.keys[i], &self.values[i])
    }
}

impl<K: Clone, V: Clone> LeafNode<K, V> {
    pub(crate) fn insert<C: Comparator<K>>(
        &mut self,
        key: K,
        value: V,
        overwrite: bool,
        cmp: &C,
        max_node_size: usize,
    ) -> InsertOutcome<K, V> {
        match self.index_of(&key, cmp) {
            Ok(i) => {
                if overwrite {
                    let old = std::mem::replace(&mut self.values[i], value);
                    InsertOutcome::Replaced(old)
                } else {
                    InsertOutcome::Unchanged
                }
            }
            Err(at) => {
                self.keys.insert(at, key);
                self.values.insert(at, value);
                if self.keys.len() > max_node_size {
                    let split_at = self.keys.len() / 2;
                    let right = self.split_off_right(split_at);
                    log::debug!("leaf split: {} | {} keys", self.len(), right.len());
                    InsertOutcome::Split(Rc::new(NodeData::Leaf(right)))
                } else {
                    InsertOutcome::Inserted
                }
            }
        }
    }

    pub(crate) fn delete<C: Comparator<K>>(&mut self, key: &K, cmp: &C) -> Option<V> {
        match self.index_of(key, cmp) {
            Ok(i) => {
                self.keys.remove(i);
                Some(self.values.remove(i))
            }
            Err(_) => None,
        }
    }

    pub(crate) fn for_range<C, F, R>(
        &mut self,
        low: Option<&K>,
        high: Option<&K>,
        include_high: bool,
        cmp: &C,
        on_found: &mut F,
    ) -> Option<R>
    where
        C: Comparator<K>,
        F: FnMut(&K, &mut V) -> EditAction<V, R>,
    {
        let mut i = match low {
            Some(l) => match self.index_of(l, cmp) {
                Ok(i) => i,
                Err(i) => i,
            },
            None => 0,
        };
        let mut to_delete = Vec::new();
        let mut result = None;
        while i < self.keys.len() {
            if let Some(h) = high {
                let ord = cmp.compare(&self.keys[i], h);
                let past_high = if include_high { ord == Ordering::Greater } else { ord != Ordering::Less };
                if past_high {
                    break;
                }
            }
            let action = on_found(&self.keys[i], &mut self.values[i]);
            if let Some(v) = action.value {
                self.values[i] = v;
            }
            if action.delete {
                to_delete.push(i);
            }
            i += 1;
            if let Some(r) = action.brk {
                result = Some(r);
                break;
            }
        }
        for idx in to_delete.into_iter().rev() {
            self.keys.remove(idx);
            self.values.remove(idx);
        }
        result
    }

    /// Splits off the tail starting at `at` into a new leaf, leaving the
    /// head (lower keys) in `self`.
    pub(crate) fn split_off_right(&mut self, at: usize) -> LeafNode<K, V> {
        LeafNode {
            keys: self.keys.split_off(at),
            values: self.values.split_off(at),
        }
    }

    /// Splits off the head `[0, at)` into a new leaf, leaving the tail
    /// (higher keys) in `self`.
    pub(crate) fn split_off_left(&mut self, at: usize) -> LeafNode<K, V> {
        let new_keys: Vec<K> = self.keys.drain(0..at).collect();
        let new_values: Vec<V> = self.values.drain(0..at).collect();
        LeafNode { keys: new_keys, values: new_values }
    }

    pub(crate) fn take_from_left(&mut self, left: &mut LeafNode<K, V>) {
        let k = left.keys.pop().expect("take_from_left on empty sibling");
        let v = left.values.pop().unwrap();
        self.keys.insert(0, k);
        self.values.insert(0, v);
    }

    pub(crate) fn take_from_right(&mut self, right: &mut LeafNode<K, V>) {
        let k = right.keys.remove(0);
        let v = right.values.remove(0);
        self.keys.push(k);
        self.values.push(v);
    }

    pub(crate) fn merge_right(&mut self, mut rhs: LeafNode<K, V>) {
        self.keys.append(&mut rhs.keys);
        self.values.append(&mut rhs.values);
    }

    /// `self` is the left sibling of `sibling`; merges if the combined size
    /// fits in one node, otherwise redistributes evenly.
    pub(crate) fn leaf_rebalance(
        &mut self,
        sibling: &mut LeafNode<K, V>,
        max_node_size: usize,
    ) -> FillUpResult<K> {
        let total = self.len() + sibling.len();
        if total <= max_node_size {
            self.merge_right(std::mem::replace(sibling, LeafNode::new()));
            log::debug!("leaf merge: {} keys", self.len());
            FillUpResult::Merged
        } else {
            let target_left = total / 2;
            if self.len() < target_left {
                let need = target_left - self.len();
                let moved_keys: Vec<K> = sibling.keys.drain(0..need).collect();
                let moved_values: Vec<V> = sibling.values.drain(0..need).collect();
                self.keys.extend(moved_keys);
                self.values.extend(moved_values);
            } else if self.len() > target_left {
                let excess = self.len() - target_left;
                let start = self.len() - excess;
                let moved_keys: Vec<K> = self.keys.split_off(start);
                let moved_values: Vec<V> = self.values.split_off(start);
                sibling.keys.splice(0..0, moved_keys);
                sibling.values.splice(0..0, moved_values);
            }
            log::debug!("leaf rebalance: {} | {} keys", self.len(), sibling.len());
            FillUpResult::Rebalanced(self.max_key().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::OrdComparator;

    fn leaf(pairs: &[(i32, i32)]) -> LeafNode<i32, i32> {
        LeafNode::from_sorted(pairs.iter().map(|p| p.0).collect(), pairs.iter().map(|p| p.1).collect())
    }

    #[test]
    fn split_off_right_keeps_order() {
        let mut l = leaf(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let right = l.split_off_right(2);
        assert_eq!(l.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[3, 4]);
    }

    #[test]
    fn rebalance_merges_when_it_fits() {
        let mut left = leaf(&[(1, 1)]);
        let mut right = leaf(&[(2, 2)]);
        match left.leaf_rebalance(&mut right, 8) {
            FillUpResult::Merged => {}
            _ => panic!("expected merge"),
        }
        assert_eq!(left.keys(), &[1, 2]);
    }

    #[test]
    fn rebalance_redistributes_when_it_does_not_fit() {
        let mut left = leaf(&[(1, 1)]);
        let mut right = leaf(&[(2, 2), (3, 3), (4, 4)]);
        match left.leaf_rebalance(&mut right, 3) {
            FillUpResult::Rebalanced(_) => {}
            _ => panic!("expected rebalance"),
        }
        assert_eq!(left.len() + right.len(), 4);
        assert!(left.len() >= 1 && right.len() >= 1);
    }

    #[test]
    fn insert_splits_when_over_capacity() {
        let mut l = leaf(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let cmp = OrdComparator::default();
        match l.insert(5, 5, true, &cmp, 4) {
            InsertOutcome::Split(_) => {}
            _ => panic!("expected split"),
        }
    }
}
