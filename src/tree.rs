//! The public ordered-map container: `Tree<K, V, C>`.
//!
//! Mirrors the teacher's `Tree<X, M, I>` / `Inner<R, I, M>` split (a thin
//! public wrapper delegating to the actual node machinery) without the
//! on-disk object-pointer layer — everything here lives in memory, behind
//! `Rc` structural sharing (`crate::node`).

use crate::comparator::{Comparator, OrdComparator};
use crate::error::{ErrorKind, Result};
use crate::node::{self, EditAction, InternalNode, NodeData, NodeRef};
use std::rc::Rc;

/// Clamped bounds for `maxNodeSize` (spec §4.1): below 4, rotation/merge
/// logic has no room to operate; above 256, a node's linear scan degrades
/// the asymptotics the tree exists to avoid.
pub const MIN_NODE_SIZE: usize = 4;
pub const MAX_NODE_SIZE: usize = 256;
pub const DEFAULT_NODE_SIZE: usize = 32;

fn clamp_node_size(requested: usize) -> usize {
    let clamped = requested.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE);
    if clamped != requested {
        log::warn!("maxNodeSize {} out of range, clamped to {}", requested, clamped);
    }
    clamped
}

/// An ordered, in-memory key→value container with O(1) structural clones.
///
/// Cloning a `Tree` (`Clone::clone`, or [`Tree::clone_shared`]) shares the
/// entire node spine via `Rc`; a write path clones only the nodes along the
/// path it touches (`Rc::make_mut`), never the whole tree (spec §4.4).
#[derive(Debug)]
pub struct Tree<K, V, C: Comparator<K> = OrdComparator<K>> {
    root: NodeRef<K, V>,
    max_node_size: usize,
    cmp: C,
    frozen: bool,
}

impl<K, V, C: Comparator<K> + Default> Default for Tree<K, V, C> {
    fn default() -> Self {
        Tree::with_comparator(C::default(), DEFAULT_NODE_SIZE)
    }
}

impl<K, V, C: Comparator<K>> Clone for Tree<K, V, C> {
    /// O(1): shares the root `Rc`, matching spec §4.4's clone semantics.
    fn clone(&self) -> Self {
        Tree {
            root: Rc::clone(&self.root),
            max_node_size: self.max_node_size,
            cmp: self.cmp.clone(),
            frozen: self.frozen,
        }
    }
}

impl<K, V, C: Comparator<K> + Default> Tree<K, V, C> {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn with_node_size(max_node_size: usize) -> Self {
        Tree::with_comparator(C::default(), max_node_size)
    }
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    /// Wraps an already-built, already-valid node as the root of a fresh
    /// tree. Used by bulk load and the set operations, which build their
    /// result bottom-up rather than key by key.
    pub(crate) fn from_root(root: NodeRef<K, V>, cmp: C, max_node_size: usize) -> Self {
        Tree { root, max_node_size, cmp, frozen: false }
    }

    pub fn with_comparator(cmp: C, max_node_size: usize) -> Self {
        Tree {
            root: node::empty_leaf(),
            max_node_size: clamp_node_size(max_node_size),
            cmp,
            frozen: false,
        }
    }

    pub fn max_node_size(&self) -> usize {
        self.max_node_size
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub(crate) fn root_for_cursor(&self) -> &NodeData<K, V> {
        &self.root
    }

    /// The root's `Rc` handle itself, for callers (the `diff`/`setops`
    /// subtree-sharing walk) that need `Rc::ptr_eq` rather than just a
    /// borrow of the pointee.
    pub(crate) fn root_rc(&self) -> &NodeRef<K, V> {
        &self.root
    }

    pub fn size(&self) -> usize {
        self.root.subtree_size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn height(&self) -> u32 {
        self.root.height()
    }

    pub fn min_key(&self) -> Option<&K> {
        if self.is_empty() {
            None
        } else {
            Some(self.root.min_key())
        }
    }

    pub fn max_key(&self) -> Option<&K> {
        if self.is_empty() {
            None
        } else {
            Some(self.root.max_key())
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.root.get(key, &self.cmp)
    }

    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            log::debug!("rejected mutation on a frozen tree");
            Err(ErrorKind::FrozenMutation.into())
        } else {
            Ok(())
        }
    }

    /// O(1) structural-sharing clone; an explicit alias for `Clone::clone`
    /// so call sites can distinguish it from [`Tree::greedy_clone`].
    pub fn clone_shared(&self) -> Self
    where
        C: Clone,
    {
        self.clone()
    }

    /// Deep-copies every node reachable from the root, even ones that are
    /// not currently shared, when `force` is true. When `force` is false,
    /// only nodes with `Rc::strong_count() > 1` are copied (the ordinary
    /// copy-on-write discipline already gives every future mutator its own
    /// exclusive path, so an unforced `greedy_clone` is just `clone_shared`
    /// plus a reminder that no guarantee beyond "next write is cheap" is
    /// made).
    pub fn greedy_clone(&self, force: bool) -> Self
    where
        K: Clone,
        V: Clone,
        C: Clone,
    {
        let root = if force { deep_clone(&self.root) } else { Rc::new((*self.root).deep_copy_if_shared()) };
        Tree { root, max_node_size: self.max_node_size, cmp: self.cmp.clone(), frozen: self.frozen }
    }
}

impl<K: Clone, V: Clone, C: Comparator<K>> Tree<K, V, C> {
    /// Inserts or overwrites `key` → `value`. Returns the previous value, if
    /// any (spec §6 `set`).
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.ensure_mutable()?;
        self.cmp.validate(&key)?;
        use crate::node::InsertOutcome;
        let node = Rc::make_mut(&mut self.root);
        match node.insert(key, value, true, &self.cmp, self.max_node_size) {
            InsertOutcome::Inserted => Ok(None),
            InsertOutcome::Replaced(old) => Ok(Some(old)),
            InsertOutcome::Unchanged => unreachable!("overwrite=true never yields Unchanged"),
            InsertOutcome::Split(right) => {
                let left = Rc::clone(&self.root);
                self.root = node::internal_from_children(vec![left, right]);
                log::trace!("root split, height now {}", self.root.height());
                Ok(None)
            }
        }
    }

    /// Inserts only if `key` is absent; returns whether it was inserted
    /// (spec §6 `setIfNotPresent`).
    pub fn set_if_not_present(&mut self, key: K, value: V) -> Result<bool> {
        self.ensure_mutable()?;
        self.cmp.validate(&key)?;
        use crate::node::InsertOutcome;
        let node = Rc::make_mut(&mut self.root);
        match node.insert(key, value, false, &self.cmp, self.max_node_size) {
            InsertOutcome::Inserted => Ok(true),
            InsertOutcome::Unchanged => Ok(false),
            InsertOutcome::Replaced(_) => unreachable!("overwrite=false never yields Replaced"),
            InsertOutcome::Split(right) => {
                let left = Rc::clone(&self.root);
                self.root = node::internal_from_children(vec![left, right]);
                Ok(true)
            }
        }
    }

    pub fn delete(&mut self, key: &K) -> Result<Option<V>> {
        self.ensure_mutable()?;
        let node = Rc::make_mut(&mut self.root);
        let removed = node.delete(key, &self.cmp);
        self.collapse_root();
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.root = node::empty_leaf();
        Ok(())
    }

    fn collapse_root(&mut self) {
        loop {
            if self.root.fanout() == 0 && !self.root.is_leaf() {
                self.root = node::empty_leaf();
                log::debug!("root emptied, collapsed to a fresh leaf");
                return;
            }
            if !self.root.root_should_collapse() {
                return;
            }
            let root_mut = Rc::make_mut(&mut self.root);
            self.root = root_mut.sole_child();
            log::debug!("root collapsed, height now {}", self.root.height());
        }
    }

    /// Walks `[low, high]` (or an open-ended side when `None`), invoking
    /// `f` for every pair and applying whatever it requests (spec §6
    /// `forRange`/`editRange`). Returns the value passed to `{break: r}`,
    /// if any.
    pub fn edit_range<F, R>(
        &mut self,
        low: Option<&K>,
        high: Option<&K>,
        include_high: bool,
        mut f: F,
    ) -> Result<Option<R>>
    where
        F: FnMut(&K, &mut V) -> EditAction<V, R>,
    {
        self.ensure_mutable()?;
        let node = Rc::make_mut(&mut self.root);
        let result = node.for_range(low, high, include_high, &self.cmp, &mut f, self.max_node_size);
        self.collapse_root();
        Ok(result)
    }

    /// Removes every key in `[low, high]`.
    pub fn delete_range(&mut self, low: Option<&K>, high: Option<&K>, include_high: bool) -> Result<usize> {
        let mut count = 0usize;
        self.edit_range::<_, ()>(low, high, include_high, |_, _| {
            count += 1;
            EditAction::delete()
        })?;
        Ok(count)
    }
}

impl<K: Clone, V: Clone, C: Comparator<K> + Clone> Tree<K, V, C> {
    /// Builds a tree directly from an already-ascending run of pairs (spec
    /// §4.9 bulk load), bottom-up, instead of one `set` per pair.
    pub fn from_sorted_pairs(pairs: Vec<(K, V)>, cmp: C, max_node_size: usize) -> Result<Self> {
        let max_node_size = clamp_node_size(max_node_size);
        let root = crate::bulk::build_from_sorted(pairs, &cmp, max_node_size)?;
        Ok(Tree::from_root(root, cmp, max_node_size))
    }

    /// Returns a new tree with `key` → `value` set, leaving `self`
    /// untouched (spec §6 `with`). Cheap: clones the spine via `Rc`, then
    /// mutates only the touched path.
    pub fn with(&self, key: K, value: V) -> Result<Self> {
        let mut t = self.clone();
        t.set(key, value)?;
        Ok(t)
    }

    /// Returns a new tree with `key` removed, leaving `self` untouched (spec
    /// §6 `without`). When `return_this_if_unchanged` is set and `key` was
    /// already absent, returns a structural clone of `self` instead of an
    /// unnecessary (if still O(1)) fresh root.
    pub fn without(&self, key: &K, return_this_if_unchanged: bool) -> Result<Self> {
        if return_this_if_unchanged && !self.has(key) {
            return Ok(self.clone());
        }
        let mut t = self.clone();
        t.delete(key)?;
        Ok(t)
    }

    pub fn with_pairs<I: IntoIterator<Item = (K, V)>>(&self, pairs: I, overwrite: bool) -> Result<Self> {
        let mut t = self.clone();
        for (k, v) in pairs {
            if overwrite {
                t.set(k, v)?;
            } else {
                t.set_if_not_present(k, v)?;
            }
        }
        Ok(t)
    }

    pub fn without_keys<'a, I: IntoIterator<Item = &'a K>>(
        &self,
        keys: I,
        return_this_if_unchanged: bool,
    ) -> Result<Self>
    where
        K: 'a,
    {
        let mut t = self.clone();
        let mut changed = false;
        for k in keys {
            if t.delete(k)?.is_some() {
                changed = true;
            }
        }
        if return_this_if_unchanged && !changed {
            return Ok(self.clone());
        }
        Ok(t)
    }

    /// Returns a new tree containing only the pairs whose key appears in
    /// `keys` (spec §6 `withKeys`): the dual of [`Tree::without_keys`],
    /// restricting rather than removing. Keys absent from `self` are simply
    /// not present in the result. When `return_this_if_unchanged` is set and
    /// every key of `self` was kept, returns a structural clone of `self`.
    pub fn with_keys<'a, I: IntoIterator<Item = &'a K>>(
        &self,
        keys: I,
        return_this_if_unchanged: bool,
    ) -> Self
    where
        K: 'a,
    {
        let mut pairs: Vec<(K, V)> = keys
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| (k.clone(), v.clone())))
            .collect();
        pairs.sort_by(|(ka, _), (kb, _)| self.cmp.compare(ka, kb));
        pairs.dedup_by(|(ka, _), (kb, _)| self.cmp.compare(ka, kb) == std::cmp::Ordering::Equal);
        if return_this_if_unchanged && pairs.len() == self.size() {
            return self.clone();
        }
        let root = crate::bulk::build_from_sorted(pairs, &self.cmp, self.max_node_size)
            .expect("deduplicated, sorted-by-comparator pairs are strictly ascending");
        Tree::from_root(root, self.cmp.clone(), self.max_node_size)
    }

    pub fn without_range(
        &self,
        low: Option<&K>,
        high: Option<&K>,
        include_high: bool,
        return_this_if_unchanged: bool,
    ) -> Result<Self> {
        let mut t = self.clone();
        let removed = t.delete_range(low, high, include_high)?;
        if return_this_if_unchanged && removed == 0 {
            return Ok(self.clone());
        }
        Ok(t)
    }

    /// Returns a new tree keeping only pairs for which `pred` returns true.
    /// Rebuilt via bulk load rather than per-key deletion.
    pub fn filter<F: FnMut(&K, &V) -> bool>(&self, mut pred: F) -> Self {
        let pairs: Vec<(K, V)> =
            self.iter().filter(|(k, v)| pred(k, v)).map(|(k, v)| (k.clone(), v.clone())).collect();
        let root = crate::bulk::build_from_sorted(pairs, &self.cmp, self.max_node_size)
            .expect("entries read from an existing tree are already strictly ascending");
        Tree::from_root(root, self.cmp.clone(), self.max_node_size)
    }

    /// Returns a new tree with every value replaced by `f(key, value)`; keys
    /// and structure are unaffected (spec §6 `mapValues`).
    pub fn map_values<V2: Clone, F: FnMut(&K, &V) -> V2>(&self, mut f: F) -> Tree<K, V2, C> {
        let pairs: Vec<(K, V2)> = self.iter().map(|(k, v)| (k.clone(), f(k, v))).collect();
        let root = crate::bulk::build_from_sorted(pairs, &self.cmp, self.max_node_size)
            .expect("entries read from an existing tree are already strictly ascending");
        Tree::from_root(root, self.cmp.clone(), self.max_node_size)
    }
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    pub fn for_each_pair<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    pub fn iter(&self) -> crate::iter::AscIter<'_, K, V, C> {
        crate::iter::AscIter::new(&self.root, None, None, false, &self.cmp)
    }

    pub fn iter_range<'a>(
        &'a self,
        low: Option<&'a K>,
        high: Option<&'a K>,
        include_high: bool,
    ) -> crate::iter::AscIter<'a, K, V, C> {
        crate::iter::AscIter::new(&self.root, low, high, include_high, &self.cmp)
    }

    pub fn iter_rev(&self) -> crate::iter::DescIter<'_, K, V, C> {
        crate::iter::DescIter::new(&self.root, None, None, false, &self.cmp)
    }

    pub fn iter_range_rev<'a>(
        &'a self,
        low: Option<&'a K>,
        high: Option<&'a K>,
        include_high: bool,
    ) -> crate::iter::DescIter<'a, K, V, C> {
        crate::iter::DescIter::new(&self.root, low, high, include_high, &self.cmp)
    }

    pub fn get_range(
        &self,
        low: Option<&K>,
        high: Option<&K>,
        include_high: bool,
        max_length: Option<usize>,
    ) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let it = self.iter_range(low, high, include_high).map(|(k, v)| (k.clone(), v.clone()));
        match max_length {
            Some(n) => it.take(n).collect(),
            None => it.collect(),
        }
    }

    /// Smallest key strictly greater than `key` (spec §6 `nextHigherPair`).
    pub fn next_higher_pair(&self, key: &K) -> Option<(&K, &V)> {
        let mut it = self.iter_range(Some(key), None, false);
        match it.next() {
            Some((k, _)) if self.cmp.compare(k, key) == std::cmp::Ordering::Equal => it.next(),
            other => other,
        }
    }

    /// Largest key strictly smaller than `key` (spec §6 `nextLowerPair`).
    pub fn next_lower_pair(&self, key: &K) -> Option<(&K, &V)> {
        let mut it = self.iter_range_rev(None, Some(key), true);
        match it.next() {
            Some((k, _)) if self.cmp.compare(k, key) == std::cmp::Ordering::Equal => it.next(),
            other => other,
        }
    }

    pub fn next_higher_key(&self, key: &K) -> Option<&K> {
        self.next_higher_pair(key).map(|(k, _)| k)
    }

    pub fn next_lower_key(&self, key: &K) -> Option<&K> {
        self.next_lower_pair(key).map(|(k, _)| k)
    }

    /// The pair at `key`, or the nearest pair with a smaller key if `key` is
    /// absent (spec §6 `getPairOrNextLower`).
    pub fn get_pair_or_next_lower(&self, key: &K) -> Option<(&K, &V)> {
        self.iter_range_rev(None, Some(key), true).next()
    }

    /// The pair at `key`, or the nearest pair with a larger key if `key` is
    /// absent (spec §6 `getPairOrNextHigher`).
    pub fn get_pair_or_next_higher(&self, key: &K) -> Option<(&K, &V)> {
        self.iter_range(Some(key), None, false).next()
    }

    /// Re-verifies every structural invariant from spec §3 from scratch.
    /// Intended for tests and debugging, not the hot path.
    pub fn check_valid(&self) -> Result<()>
    where
        K: Clone,
    {
        check_node(&self.root, self.max_node_size, &self.cmp, None, None, true)
    }
}

/// Builds an `InternalInvariant` error, logging the broken invariant first:
/// `checkValid` is the one place a violation here indicates a bug in this
/// crate rather than caller misuse, so it's worth a `warn!` even outside a
/// debug build.
fn invariant_violation(detail: &str) -> crate::error::Error {
    log::warn!("checkValid: {}", detail);
    ErrorKind::InternalInvariant(detail.into()).into()
}

fn check_node<K: Clone, V, C: Comparator<K>>(
    node: &NodeData<K, V>,
    max_node_size: usize,
    cmp: &C,
    lower: Option<&K>,
    upper: Option<&K>,
    is_root: bool,
) -> Result<()> {
    use std::cmp::Ordering;
    match node {
        NodeData::Leaf(l) => {
            // Spec invariant 5 requires only `1 <= k <= MaxNodeSize` for a
            // non-root leaf — a leaf left below the usual half-full
            // rebalancing target (by a point `delete`, or by an editRange
            // unwind that had no neighbor to absorb into) is explicitly
            // tolerated, not a structural violation. Only a fully emptied
            // non-root leaf (which should have been spliced out of its
            // parent) is a bug.
            if !is_root && l.len() == 0 {
                return Err(invariant_violation("leaf is empty"));
            }
            if l.len() > max_node_size {
                return Err(invariant_violation("leaf overfull"));
            }
            let keys = l.keys();
            for w in keys.windows(2) {
                if cmp.compare(&w[0], &w[1]) != Ordering::Less {
                    return Err(invariant_violation("leaf keys not strictly ascending"));
                }
            }
            if let (Some(k), Some(lo)) = (keys.first(), lower) {
                if cmp.compare(k, lo) == Ordering::Less {
                    return Err(invariant_violation("leaf key below lower bound"));
                }
            }
            if let (Some(k), Some(hi)) = (keys.last(), upper) {
                if cmp.compare(k, hi) == Ordering::Greater {
                    return Err(invariant_violation("leaf key above upper bound"));
                }
            }
            Ok(())
        }
        NodeData::Internal(i) => {
            if i.len() < 2 && !is_root {
                return Err(invariant_violation("internal node has fewer than two children"));
            }
            if i.len() > max_node_size {
                return Err(invariant_violation("internal node overfull"));
            }
            let keys = i.keys();
            for w in keys.windows(2) {
                if cmp.compare(&w[0], &w[1]) != Ordering::Less {
                    return Err(invariant_violation("internal separators not strictly ascending"));
                }
            }
            let mut prev_bound = lower;
            for (idx, child) in i.children().iter().enumerate() {
                if cmp.compare(child.max_key(), &keys[idx]) != Ordering::Equal {
                    return Err(invariant_violation("cached separator does not match child max_key"));
                }
                let child_upper = Some(&keys[idx]);
                let this_upper = if idx + 1 == i.len() { upper } else { child_upper };
                check_node(child, max_node_size, cmp, prev_bound, this_upper, false)?;
                if child.height() + 1 != i.height() {
                    return Err(invariant_violation("child height inconsistent with parent"));
                }
                prev_bound = child_upper;
            }
            let computed_size: usize = i.children().iter().map(|c| c.subtree_size()).sum();
            if computed_size != i.size() {
                return Err(invariant_violation("cached subtree size mismatch"));
            }
            Ok(())
        }
    }
}

fn deep_clone<K: Clone, V: Clone>(node: &NodeRef<K, V>) -> NodeRef<K, V> {
    match &**node {
        NodeData::Leaf(l) => Rc::new(NodeData::Leaf(l.clone())),
        NodeData::Internal(i) => {
            let children = i.children().iter().map(deep_clone).collect();
            node::internal_from_children(children)
        }
    }
}

trait DeepCopyIfShared<K, V> {
    fn deep_copy_if_shared(&self) -> NodeData<K, V>;
}

impl<K: Clone, V: Clone> DeepCopyIfShared<K, V> for NodeData<K, V> {
    fn deep_copy_if_shared(&self) -> NodeData<K, V> {
        match self {
            NodeData::Leaf(l) => NodeData::Leaf(l.clone()),
            NodeData::Internal(i) => {
                let children = i
                    .children()
                    .iter()
                    .map(|c| {
                        if Rc::strong_count(c) > 1 {
                            Rc::new(c.deep_copy_if_shared())
                        } else {
                            Rc::clone(c)
                        }
                    })
                    .collect();
                NodeData::Internal(InternalNode::from_children(children))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::OrdComparator;

    fn tree() -> Tree<i32, i32, OrdComparator<i32>> {
        Tree::new()
    }

    #[test]
    fn empty_tree_basics() {
        let t = tree();
        assert_eq!(t.size(), 0);
        assert!(t.is_empty());
        assert_eq!(t.min_key(), None);
        assert_eq!(t.get(&1), None);
    }

    #[test]
    fn set_get_delete_roundtrip() {
        let mut t = tree();
        for i in 0..200 {
            assert_eq!(t.set(i, i * 2).unwrap(), None);
        }
        assert_eq!(t.size(), 200);
        t.check_valid().unwrap();
        for i in 0..200 {
            assert_eq!(t.get(&i), Some(&(i * 2)));
        }
        for i in 0..100 {
            assert_eq!(t.delete(&i).unwrap(), Some(i * 2));
        }
        t.check_valid().unwrap();
        assert_eq!(t.size(), 100);
        assert_eq!(t.min_key(), Some(&100));
    }

    #[test]
    fn clone_is_structural_until_mutated() {
        let mut t = tree();
        for i in 0..50 {
            t.set(i, i).unwrap();
        }
        let snapshot = t.clone();
        t.set(1000, 1000).unwrap();
        assert_eq!(snapshot.size(), 50);
        assert_eq!(t.size(), 51);
        snapshot.check_valid().unwrap();
        t.check_valid().unwrap();
    }

    #[test]
    fn iteration_is_sorted_and_bounded() {
        let mut t = tree();
        for i in (0..100).rev() {
            t.set(i, i).unwrap();
        }
        let all: Vec<_> = t.iter().map(|(k, _)| *k).collect();
        let expected: Vec<i32> = (0..100).collect();
        assert_eq!(all, expected);

        let bounded: Vec<_> = t.iter_range(Some(&10), Some(&20), true).map(|(k, _)| *k).collect();
        assert_eq!(bounded, (10..=20).collect::<Vec<_>>());

        let rev: Vec<_> = t.iter_rev().map(|(k, _)| *k).collect();
        let mut expected_rev = expected.clone();
        expected_rev.reverse();
        assert_eq!(rev, expected_rev);
    }

    #[test]
    fn edit_range_deletes_and_breaks() {
        let mut t = tree();
        for i in 0..30 {
            t.set(i, i).unwrap();
        }
        let removed = t.delete_range(Some(&10), Some(&19), true).unwrap();
        assert_eq!(removed, 10);
        t.check_valid().unwrap();
        assert_eq!(t.size(), 20);

        let stopped_at = t.edit_range(None, None, false, |k, _| {
            if *k == 5 {
                EditAction::keep().with_break(*k)
            } else {
                EditAction::keep()
            }
        });
        assert_eq!(stopped_at.unwrap(), Some(5));
    }

    #[test]
    fn frozen_tree_rejects_mutation() {
        let mut t = tree();
        t.set(1, 1).unwrap();
        t.freeze();
        assert!(t.set(2, 2).is_err());
        assert!(t.delete(&1).is_err());
    }

    #[test]
    fn neighbor_queries_find_adjacent_keys() {
        let mut t = tree();
        for k in [10, 20, 30, 40] {
            t.set(k, k).unwrap();
        }
        assert_eq!(t.next_higher_key(&20), Some(&30));
        assert_eq!(t.next_higher_key(&40), None);
        assert_eq!(t.next_lower_key(&20), Some(&10));
        assert_eq!(t.next_lower_key(&10), None);
        assert_eq!(t.get_pair_or_next_lower(&25), Some((&20, &20)));
        assert_eq!(t.get_pair_or_next_lower(&20), Some((&20, &20)));
        assert_eq!(t.get_pair_or_next_higher(&25), Some((&30, &30)));
        assert_eq!(t.get_pair_or_next_higher(&30), Some((&30, &30)));
        assert_eq!(t.get_pair_or_next_lower(&5), None);
        assert_eq!(t.get_pair_or_next_higher(&50), None);
    }

    #[test]
    fn get_range_respects_max_length() {
        let mut t = tree();
        for i in 0..20 {
            t.set(i, i).unwrap();
        }
        let limited = t.get_range(None, None, false, Some(5));
        assert_eq!(limited, (0..5).map(|i| (i, i)).collect::<Vec<_>>());
        let unlimited = t.get_range(None, None, false, None);
        assert_eq!(unlimited.len(), 20);
    }

    #[test]
    fn with_keys_restricts_to_a_key_set() {
        let mut t = tree();
        for i in 0..10 {
            t.set(i, i * 10).unwrap();
        }
        let restricted = t.with_keys([1, 3, 5, 100].iter(), false);
        restricted.check_valid().unwrap();
        assert_eq!(restricted.size(), 3);
        assert_eq!(restricted.get(&3), Some(&30));
        assert_eq!(restricted.get(&100), None);

        let all_keys: Vec<i32> = t.iter().map(|(k, _)| *k).collect();
        let unchanged = t.with_keys(all_keys.iter(), true);
        assert_eq!(unchanged.size(), t.size());
    }

    #[test]
    fn without_and_without_keys_can_report_unchanged() {
        let mut t = tree();
        t.set(1, 1).unwrap();
        t.set(2, 2).unwrap();

        let same = t.without(&999, true).unwrap();
        assert_eq!(same.size(), t.size());

        let removed = t.without(&1, true).unwrap();
        assert_eq!(removed.size(), 1);

        let same_keys = t.without_keys([100, 200].iter(), true).unwrap();
        assert_eq!(same_keys.size(), t.size());

        let fewer = t.without_keys([1].iter(), true).unwrap();
        assert_eq!(fewer.size(), 1);
    }
}
