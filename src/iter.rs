//! Read-only ascending/descending entry iterators (spec §4.7). These never
//! clone a node: they hold borrowed references into the tree's existing
//! `Rc` spine, so `forEachPair`/`getRange`/iteration cost nothing beyond the
//! walk itself, unlike `editRange`'s copy-on-write descent.

use crate::comparator::Comparator;
use crate::node::{InternalNode, NodeData, NodeRef};
use std::cmp::Ordering;

enum Frame<'a, K, V> {
    Leaf { keys: &'a [K], values: &'a [V], idx: usize },
    Internal { children: &'a [NodeRef<K, V>], idx: usize },
}

fn internal_of<K, V>(node: &InternalNode<K, V>) -> &[NodeRef<K, V>] {
    node.children()
}

/// Ascending iterator over `(key, value)` pairs, optionally bounded below by
/// `low` (inclusive) and above by `high` (inclusive iff `include_high`).
pub struct AscIter<'a, K, V, C: Comparator<K>> {
    stack: Vec<Frame<'a, K, V>>,
    high: Option<&'a K>,
    include_high: bool,
    cmp: &'a C,
    exhausted: bool,
}

impl<'a, K, V, C: Comparator<K>> AscIter<'a, K, V, C> {
    pub(crate) fn new(
        root: &'a NodeData<K, V>,
        low: Option<&'a K>,
        high: Option<&'a K>,
        include_high: bool,
        cmp: &'a C,
    ) -> Self {
        let mut stack = Vec::new();
        descend_left(root, low, cmp, &mut stack);
        AscIter { stack, high, include_high, cmp, exhausted: false }
    }

    fn advance_after_leaf_exhausted(&mut self) {
        loop {
            self.stack.pop();
            match self.stack.last_mut() {
                None => return,
                Some(Frame::Internal { children, idx }) => {
                    *idx += 1;
                    if *idx < children.len() {
                        let next: &'a NodeData<K, V> = &children[*idx];
                        descend_left(next, None, self.cmp, &mut self.stack);
                        return;
                    }
                    // fall through: pop this exhausted internal frame too
                }
                Some(Frame::Leaf { .. }) => return,
            }
        }
    }
}

fn descend_left<'a, K, V, C: Comparator<K>>(
    mut node: &'a NodeData<K, V>,
    low: Option<&K>,
    cmp: &C,
    stack: &mut Vec<Frame<'a, K, V>>,
) {
    loop {
        match node {
            NodeData::Leaf(l) => {
                let idx = match low {
                    Some(lo) => match l.index_of(lo, cmp) {
                        Ok(i) => i,
                        Err(i) => i,
                    },
                    None => 0,
                };
                stack.push(Frame::Leaf { keys: l.keys(), values: l.values(), idx });
                return;
            }
            NodeData::Internal(i) => {
                let children = internal_of(i);
                let idx = match low {
                    Some(lo) => i.child_index_for(lo, cmp),
                    None => 0,
                };
                stack.push(Frame::Internal { children, idx });
                node = &children[idx];
            }
        }
    }
}

impl<'a, K, V, C: Comparator<K>> Iterator for AscIter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.stack.last_mut() {
                None => {
                    self.exhausted = true;
                    return None;
                }
                Some(Frame::Leaf { keys, values, idx }) => {
                    if *idx >= keys.len() {
                        self.advance_after_leaf_exhausted();
                        continue;
                    }
                    let k = &keys[*idx];
                    if let Some(h) = self.high {
                        let ord = self.cmp.compare(k, h);
                        let past = if self.include_high { ord == Ordering::Greater } else { ord != Ordering::Less };
                        if past {
                            self.exhausted = true;
                            return None;
                        }
                    }
                    let v = &values[*idx];
                    *idx += 1;
                    return Some((k, v));
                }
                Some(Frame::Internal { .. }) => {
                    self.advance_after_leaf_exhausted();
                    continue;
                }
            }
        }
    }
}

/// Descending mirror of [`AscIter`].
pub struct DescIter<'a, K, V, C: Comparator<K>> {
    stack: Vec<Frame<'a, K, V>>,
    low: Option<&'a K>,
    cmp: &'a C,
    exhausted: bool,
}

fn descend_right<'a, K, V, C: Comparator<K>>(
    mut node: &'a NodeData<K, V>,
    high: Option<&K>,
    include_high: bool,
    cmp: &C,
    stack: &mut Vec<Frame<'a, K, V>>,
) {
    loop {
        match node {
            NodeData::Leaf(l) => {
                let idx = match high {
                    Some(hi) => match l.index_of(hi, cmp) {
                        Ok(i) => {
                            if include_high {
                                i
                            } else if i == 0 {
                                // nothing below hi in this leaf; idx will underflow the
                                // exhausted check in next() since len()==0 isn't true,
                                // so signal empty by pointing one before the start.
                                usize::MAX
                            } else {
                                i - 1
                            }
                        }
                        Err(i) => {
                            if i == 0 {
                                usize::MAX
                            } else {
                                i - 1
                            }
                        }
                    },
                    None => l.len().wrapping_sub(1),
                };
                stack.push(Frame::Leaf { keys: l.keys(), values: l.values(), idx });
                return;
            }
            NodeData::Internal(i) => {
                let children = internal_of(i);
                let idx = match high {
                    Some(hi) => i.child_index_for(hi, cmp),
                    None => children.len() - 1,
                };
                stack.push(Frame::Internal { children, idx });
                node = &children[idx];
            }
        }
    }
}

impl<'a, K, V, C: Comparator<K>> DescIter<'a, K, V, C> {
    pub(crate) fn new(
        root: &'a NodeData<K, V>,
        low: Option<&'a K>,
        high: Option<&'a K>,
        include_high: bool,
        cmp: &'a C,
    ) -> Self {
        let mut stack = Vec::new();
        descend_right(root, high, include_high, cmp, &mut stack);
        DescIter { stack, low, cmp, exhausted: false }
    }

    fn advance_after_leaf_exhausted(&mut self) {
        loop {
            self.stack.pop();
            match self.stack.last_mut() {
                None => return,
                Some(Frame::Internal { idx, .. }) => {
                    if *idx == 0 {
                        continue;
                    }
                    *idx -= 1;
                    let node: &'a NodeData<K, V> = match self.stack.last() {
                        Some(Frame::Internal { children, idx }) => &children[*idx],
                        _ => unreachable!(),
                    };
                    descend_right(node, None, true, self.cmp, &mut self.stack);
                    return;
                }
                Some(Frame::Leaf { .. }) => return,
            }
        }
    }
}

impl<'a, K, V, C: Comparator<K>> Iterator for DescIter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.stack.last_mut() {
                None => {
                    self.exhausted = true;
                    return None;
                }
                Some(Frame::Leaf { keys, idx, .. }) if *idx == usize::MAX || keys.is_empty() => {
                    self.advance_after_leaf_exhausted();
                    continue;
                }
                Some(Frame::Leaf { keys, values, idx }) => {
                    let k = &keys[*idx];
                    if let Some(lo) = self.low {
                        if self.cmp.compare(k, lo) == Ordering::Less {
                            self.exhausted = true;
                            return None;
                        }
                    }
                    let v = &values[*idx];
                    if *idx == 0 {
                        *idx = usize::MAX;
                    } else {
                        *idx -= 1;
                    }
                    return Some((k, v));
                }
                Some(Frame::Internal { .. }) => {
                    self.advance_after_leaf_exhausted();
                    continue;
                }
            }
        }
    }
}
