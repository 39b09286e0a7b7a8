//! Two-tree set operations: `intersect`, `union`, `subtract`. `intersect`/
//! `union` take a caller-supplied `combine(k, vA, vB)` for the keys present
//! on both sides, matching spec §4.7/§6 exactly (`union`'s combine may
//! return `None` to drop the key — spec §8 concrete scenario 4).
//!
//! Each operation decomposes its two input trees the same way
//! [`crate::diff`] does: recurse down matching internal nodes
//! ([`crate::diff::same_shape`]) and the moment a pair of children are the
//! same `Rc` allocation, stop — that whole subtree is reused verbatim in
//! the result with no `combine` calls and no rebuild, which is the entire
//! point of keeping trees behind `Rc` in the first place (two 99%-identical
//! clones diff/union/intersect/subtract in time proportional to the 1% that
//! differs). Wherever shapes diverge (different child counts, or
//! mismatched separators) the recursion falls back to flattening the
//! mismatched pair through the ascending iterators and bulk-loading a fresh
//! subtree, which is always correct.
//!
//! One subtlety a pure per-child recursion gets wrong: a child pair that
//! falls back to the flattened rebuild can come out *taller* (or shorter)
//! than its still-reused siblings — a leaf pair can flatten into more keys
//! than fit in one leaf, for instance — and splicing a mismatched-height
//! subtree into `InternalNode::from_children` alongside uniform-height
//! siblings would produce an internal node whose children sit at different
//! depths. Every `decompose_*` function below checks, after collecting a
//! level's children, that they all share one height; if they don't, it
//! discards that partial result and flattens the *entire* `(a, b)` pair at
//! this level — not just the mismatched child — through the iterator merge
//! instead, which always yields one single, internally-consistent subtree.
//! This is the reduced, check-and-retreat stand-in for spec §4.8's general
//! height-aware spine reassembly (see DESIGN.md).
//!
//! `combine` is caller-supplied and may be stateful (`FnMut`), so skipping
//! it for an `Rc`-identical pair of shared subtrees is an observable change
//! in how many times it runs, not just an internal optimization — see
//! DESIGN.md for why that's judged acceptable for `intersect`/`union`
//! (never for [`crate::diff::for_each_shared_key`], which promises a call
//! for every shared key regardless of subtree sharing).

use crate::comparator::Comparator;
use crate::diff::same_shape;
use crate::error::{ErrorKind, Result};
use crate::node::{InternalNode, NodeData, NodeRef};
use crate::tree::Tree;
use std::cmp::Ordering;
use std::rc::Rc;

/// All set operations require matching comparators; structural-reuse
/// operations (union, intersect, subtract) additionally require matching
/// `maxNodeSize`, since the reused subtrees are spliced directly into a
/// result built under that tree's own node-size discipline (spec §6).
pub(crate) fn ensure_structurally_compatible<K, V, C: Comparator<K>>(
    a: &Tree<K, V, C>,
    b: &Tree<K, V, C>,
) -> Result<()> {
    crate::diff::ensure_comparable(a, b)?;
    if a.max_node_size() != b.max_node_size() {
        return Err(ErrorKind::BranchingFactorMismatch(a.max_node_size(), b.max_node_size()).into());
    }
    Ok(())
}

/// Keys in both `a` and `b`; the surviving value is `combine(k, vA, vB)`
/// (spec §4.7/§6 `intersect(other, combine)`).
pub fn intersect<K, V, C, F>(a: &Tree<K, V, C>, b: &Tree<K, V, C>, mut combine: F) -> Result<Tree<K, V, C>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Clone,
    F: FnMut(&K, &V, &V) -> V,
{
    ensure_structurally_compatible(a, b)?;
    log::trace!("intersect: |a|={}, |b|={}", a.size(), b.size());
    if Rc::ptr_eq(a.root_rc(), b.root_rc()) {
        return Ok(a.clone());
    }
    let cmp = a.comparator();
    match decompose_intersect(a.root_for_cursor(), b.root_for_cursor(), cmp, &mut combine, a.max_node_size()) {
        Some(root) => Ok(Tree::from_root(root, cmp.clone(), a.max_node_size())),
        None => Ok(Tree::with_comparator(cmp.clone(), a.max_node_size())),
    }
}

fn decompose_intersect<K, V, C, F>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    combine: &mut F,
    max_node_size: usize,
) -> Option<NodeRef<K, V>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
    F: FnMut(&K, &V, &V) -> V,
{
    if let (NodeData::Internal(ia), NodeData::Internal(ib)) = (a, b) {
        if same_shape(ia, ib, cmp) {
            let mut kept: Vec<NodeRef<K, V>> = Vec::new();
            for (ca, cb) in ia.children().iter().zip(ib.children().iter()) {
                if Rc::ptr_eq(ca, cb) {
                    kept.push(Rc::clone(ca));
                    continue;
                }
                if let Some(child) = decompose_intersect(ca, cb, cmp, combine, max_node_size) {
                    kept.push(child);
                }
            }
            if uniform_height(&kept) {
                if kept.len() >= 2 {
                    return Some(Rc::new(NodeData::Internal(InternalNode::from_children(kept))));
                }
                if let Some(only) = kept.into_iter().next() {
                    return Some(only);
                }
                return None;
            }
            // A kept child came back at a different height than its
            // siblings (see the module doc): retreat to flattening the
            // whole `(a, b)` pair instead of splicing uneven depths.
        }
    }
    flatten_intersect(a, b, cmp, combine, max_node_size)
}

/// True when every node in `children` has the same height — the condition
/// under which they can be spliced together as one internal node's
/// children (or, for a singleton/empty list, trivially true).
fn uniform_height<K, V>(children: &[NodeRef<K, V>]) -> bool {
    children.windows(2).all(|w| w[0].height() == w[1].height())
}

fn flatten_intersect<K, V, C, F>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    combine: &mut F,
    max_node_size: usize,
) -> Option<NodeRef<K, V>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
    F: FnMut(&K, &V, &V) -> V,
{
    let mut ia = crate::iter::AscIter::new(a, None, None, false, cmp).peekable();
    let mut ib = crate::iter::AscIter::new(b, None, None, false, cmp).peekable();
    let mut out = Vec::new();
    while let (Some(&(ka, _)), Some(&(kb, _))) = (ia.peek(), ib.peek()) {
        match cmp.compare(ka, kb) {
            Ordering::Less => {
                ia.next();
            }
            Ordering::Greater => {
                ib.next();
            }
            Ordering::Equal => {
                let (k, va) = ia.next().unwrap();
                let (_, vb) = ib.next().unwrap();
                out.push((k.clone(), combine(k, va, vb)));
            }
        }
    }
    if out.is_empty() {
        return None;
    }
    Some(crate::bulk::build_from_sorted(out, cmp, max_node_size).expect("merged iterators are strictly ascending"))
}

/// Every key in `a` or `b`; a key present in only one side keeps that side's
/// value, a key present in both takes `combine(k, vA, vB)`, which may return
/// `None` to omit the key from the result entirely (spec §4.7/§6
/// `union(other, combine)`, concrete scenario 4's "deleting combine").
pub fn union<K, V, C, F>(a: &Tree<K, V, C>, b: &Tree<K, V, C>, mut combine: F) -> Result<Tree<K, V, C>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Clone,
    F: FnMut(&K, &V, &V) -> Option<V>,
{
    ensure_structurally_compatible(a, b)?;
    log::trace!("union: |a|={}, |b|={}", a.size(), b.size());
    if Rc::ptr_eq(a.root_rc(), b.root_rc()) {
        return Ok(a.clone());
    }
    let cmp = a.comparator();
    let root = decompose_union(a.root_for_cursor(), b.root_for_cursor(), cmp, &mut combine, a.max_node_size());
    Ok(Tree::from_root(root, cmp.clone(), a.max_node_size()))
}

fn decompose_union<K, V, C, F>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    combine: &mut F,
    max_node_size: usize,
) -> NodeRef<K, V>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
    F: FnMut(&K, &V, &V) -> Option<V>,
{
    if let (NodeData::Internal(ia), NodeData::Internal(ib)) = (a, b) {
        if same_shape(ia, ib, cmp) {
            let children: Vec<NodeRef<K, V>> = ia
                .children()
                .iter()
                .zip(ib.children())
                .map(|(ca, cb)| {
                    if Rc::ptr_eq(ca, cb) {
                        Rc::clone(ca)
                    } else {
                        decompose_union(ca, cb, cmp, combine, max_node_size)
                    }
                })
                .collect();
            if uniform_height(&children) {
                return Rc::new(NodeData::Internal(InternalNode::from_children(children)));
            }
            // A child pair flattened to a height that doesn't match its
            // siblings (see the module doc): retreat to flattening the
            // whole `(a, b)` pair instead of splicing uneven depths.
        }
    }
    flatten_union(a, b, cmp, combine, max_node_size)
}

fn flatten_union<K, V, C, F>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    combine: &mut F,
    max_node_size: usize,
) -> NodeRef<K, V>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
    F: FnMut(&K, &V, &V) -> Option<V>,
{
    let mut ia = crate::iter::AscIter::new(a, None, None, false, cmp).peekable();
    let mut ib = crate::iter::AscIter::new(b, None, None, false, cmp).peekable();
    let mut out = Vec::new();
    loop {
        match (ia.peek(), ib.peek()) {
            (None, None) => break,
            (Some(_), None) => {
                let (k, v) = ia.next().unwrap();
                out.push((k.clone(), v.clone()));
            }
            (None, Some(_)) => {
                let (k, v) = ib.next().unwrap();
                out.push((k.clone(), v.clone()));
            }
            (Some(&(ka, va)), Some(&(kb, vb))) => match cmp.compare(ka, kb) {
                Ordering::Less => {
                    out.push((ka.clone(), va.clone()));
                    ia.next();
                }
                Ordering::Greater => {
                    out.push((kb.clone(), vb.clone()));
                    ib.next();
                }
                Ordering::Equal => {
                    if let Some(v) = combine(ka, va, vb) {
                        out.push((ka.clone(), v));
                    }
                    ia.next();
                    ib.next();
                }
            },
        }
    }
    crate::bulk::build_from_sorted(out, cmp, max_node_size).expect("merged iterators are strictly ascending")
}

/// Keys in `a` that are absent from `b`, with `a`'s values.
pub fn subtract<K, V, C>(a: &Tree<K, V, C>, b: &Tree<K, V, C>) -> Result<Tree<K, V, C>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Clone,
{
    ensure_structurally_compatible(a, b)?;
    log::trace!("subtract: |a|={}, |b|={}", a.size(), b.size());
    if Rc::ptr_eq(a.root_rc(), b.root_rc()) {
        return Ok(Tree::with_comparator(a.comparator().clone(), a.max_node_size()));
    }
    let cmp = a.comparator();
    match decompose_subtract(a.root_for_cursor(), b.root_for_cursor(), cmp, a.max_node_size()) {
        Some(root) => Ok(Tree::from_root(root, cmp.clone(), a.max_node_size())),
        None => Ok(Tree::with_comparator(cmp.clone(), a.max_node_size())),
    }
}

fn decompose_subtract<K, V, C>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    max_node_size: usize,
) -> Option<NodeRef<K, V>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
{
    if let (NodeData::Internal(ia), NodeData::Internal(ib)) = (a, b) {
        if same_shape(ia, ib, cmp) {
            let mut kept: Vec<NodeRef<K, V>> = Vec::new();
            for (ca, cb) in ia.children().iter().zip(ib.children().iter()) {
                if Rc::ptr_eq(ca, cb) {
                    continue;
                }
                if let Some(child) = decompose_subtract(ca, cb, cmp, max_node_size) {
                    kept.push(child);
                }
            }
            if uniform_height(&kept) {
                if kept.len() >= 2 {
                    return Some(Rc::new(NodeData::Internal(InternalNode::from_children(kept))));
                }
                return kept.into_iter().next();
            }
            // A kept child came back at a different height than its
            // siblings (see the module doc): retreat to flattening the
            // whole `(a, b)` pair instead of splicing uneven depths.
        }
    }
    flatten_subtract(a, b, cmp, max_node_size)
}

fn flatten_subtract<K, V, C>(
    a: &NodeData<K, V>,
    b: &NodeData<K, V>,
    cmp: &C,
    max_node_size: usize,
) -> Option<NodeRef<K, V>>
where
    K: Clone,
    V: Clone,
    C: Comparator<K>,
{
    let mut ia = crate::iter::AscIter::new(a, None, None, false, cmp).peekable();
    let mut ib = crate::iter::AscIter::new(b, None, None, false, cmp).peekable();
    let mut out = Vec::new();
    loop {
        let (ka, va): (&K, &V) = match ia.peek() {
            Some(&(k, v)) => (k, v),
            None => break,
        };
        while let Some(&(kb, _)) = ib.peek() {
            if cmp.compare(kb, ka) == Ordering::Less {
                ib.next();
            } else {
                break;
            }
        }
        let present_in_b = matches!(ib.peek(), Some(&(kb, _)) if cmp.compare(kb, ka) == Ordering::Equal);
        if !present_in_b {
            out.push((ka.clone(), va.clone()));
        }
        ia.next();
    }
    if out.is_empty() {
        return None;
    }
    Some(crate::bulk::build_from_sorted(out, cmp, max_node_size).expect("merged iterators are strictly ascending"))
}
