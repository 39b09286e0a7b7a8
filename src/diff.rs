//! Two-tree diff (spec §4.6): walk both trees in ascending key order at
//! once and classify every key as present only in `a`, only in `b`, or in
//! both with a possibly-different value.
//!
//! The spec's reference design keeps an explicit per-tree spine stack and
//! skips a pair of subtrees outright when they are the *same* `Rc`
//! allocation (structural sharing from a common ancestor tree), making the
//! walk sublinear in the size of the unchanged portion. This crate reaches
//! the same result without a dedicated cursor abstraction: [`walk_diff`]/
//! [`walk_not_in`] recurse directly over the two trees' `NodeData`, and at
//! every pair of internal nodes whose separators line up exactly
//! ([`same_shape`]) they recurse child-by-child instead of flattening,
//! short-circuiting the instant two children are the same `Rc` allocation
//! (`Rc::ptr_eq`) — the entire subtree contributes no diffs, by definition,
//! without visiting a single key in it. Two trees descended from a common
//! ancestor with only a few localized edits keep every untouched sibling at
//! the same position and the same allocation, so this is the common case,
//! not a rare one. When shapes diverge (different child counts, or
//! different separators — two trees with no common ancestor, or whose
//! shared ancestor has since been edited into a different shape on both
//! sides) the walk falls back to merging the mismatched subtrees' ascending
//! streams directly, which is always correct and is exactly what this
//! module used to do unconditionally. See DESIGN.md.

use crate::comparator::Comparator;
use crate::error::{ErrorKind, Result};
use crate::node::{InternalNode, NodeData};
use crate::tree::Tree;
use std::cmp::Ordering;
use std::rc::Rc;

/// What a key contributes when walking two trees together.
pub enum DiffEntry<'a, K, V> {
    OnlyA(&'a K, &'a V),
    OnlyB(&'a K, &'a V),
    Different(&'a K, &'a V, &'a V),
}

/// True when two internal nodes have identical separator arrays under
/// `cmp` *and* the same height: every child at index `i` then covers the
/// same key range at the same depth in both trees, so it is safe to
/// recurse into `(children[i], children[i])` pairs directly rather than
/// re-deriving bounds from scratch. Two internal nodes can coincidentally
/// share a separator array while rooting subtrees of different height
/// (e.g. two unrelated trees of very different size); without the height
/// check, `setops`'s decomposition could be tempted to treat their
/// children as aligned pairs when they are not.
pub(crate) fn same_shape<K, V, C: Comparator<K>>(ia: &InternalNode<K, V>, ib: &InternalNode<K, V>, cmp: &C) -> bool {
    ia.len() == ib.len()
        && ia.height() == ib.height()
        && ia.keys().iter().zip(ib.keys()).all(|(x, y)| cmp.compare(x, y) == Ordering::Equal)
}

/// Visits every key present in `a` or `b` (or both, with unequal values —
/// equal-valued shared keys are skipped) in ascending order. `f` may stop
/// the walk early by returning `Some(r)`.
pub fn diff_against<K, V, C, F, R>(a: &Tree<K, V, C>, b: &Tree<K, V, C>, mut f: F) -> Result<Option<R>>
where
    C: Comparator<K>,
    V: PartialEq,
    F: FnMut(DiffEntry<'_, K, V>) -> Option<R>,
{
    ensure_comparable(a, b)?;
    log::trace!("diffAgainst: |a|={}, |b|={}", a.size(), b.size());
    if Rc::ptr_eq(a.root_rc(), b.root_rc()) {
        return Ok(None);
    }
    Ok(walk_diff(a.root_for_cursor(), b.root_for_cursor(), a.comparator(), &mut f))
}

fn walk_diff<K, V, C, F, R>(a: &NodeData<K, V>, b: &NodeData<K, V>, cmp: &C, f: &mut F) -> Option<R>
where
    C: Comparator<K>,
    V: PartialEq,
    F: FnMut(DiffEntry<'_, K, V>) -> Option<R>,
{
    match (a, b) {
        (NodeData::Internal(ia), NodeData::Internal(ib)) if same_shape(ia, ib, cmp) => {
            for (ca, cb) in ia.children().iter().zip(ib.children().iter()) {
                if Rc::ptr_eq(ca, cb) {
                    continue;
                }
                if let Some(r) = walk_diff(ca, cb, cmp, f) {
                    return Some(r);
                }
            }
            None
        }
        _ => merge_diff(a, b, cmp, f),
    }
}

fn merge_diff<K, V, C, F, R>(a: &NodeData<K, V>, b: &NodeData<K, V>, cmp: &C, f: &mut F) -> Option<R>
where
    C: Comparator<K>,
    V: PartialEq,
    F: FnMut(DiffEntry<'_, K, V>) -> Option<R>,
{
    let mut ia = crate::iter::AscIter::new(a, None, None, false, cmp).peekable();
    let mut ib = crate::iter::AscIter::new(b, None, None, false, cmp).peekable();
    loop {
        let ord = match (ia.peek(), ib.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(&(ka, _)), Some(&(kb, _))) => cmp.compare(ka, kb),
        };
        let outcome = match ord {
            Ordering::Less => {
                let (k, v) = ia.next().unwrap();
                f(DiffEntry::OnlyA(k, v))
            }
            Ordering::Greater => {
                let (k, v) = ib.next().unwrap();
                f(DiffEntry::OnlyB(k, v))
            }
            Ordering::Equal => {
                let (ka, va) = ia.next().unwrap();
                let (_, vb) = ib.next().unwrap();
                if va == vb {
                    None
                } else {
                    f(DiffEntry::Different(ka, va, vb))
                }
            }
        };
        if outcome.is_some() {
            return outcome;
        }
    }
}

/// Visits every key present in both `a` and `b`, regardless of whether the
/// values match (spec §6 `forEachSharedKey`). Unlike [`diff_against`], every
/// shared key must reach `f` even inside an identical shared subtree — `f`
/// is caller-supplied and may be stateful, so skipping invocations there
/// would silently change how many times it runs. This keeps the
/// straightforward two-iterator merge rather than the `Rc`-skip walk.
pub fn for_each_shared_key<K, V, C, F, R>(a: &Tree<K, V, C>, b: &Tree<K, V, C>, mut f: F) -> Result<Option<R>>
where
    C: Comparator<K>,
    F: FnMut(&K, &V, &V) -> Option<R>,
{
    ensure_comparable(a, b)?;
    log::trace!("forEachSharedKey: |a|={}, |b|={}", a.size(), b.size());
    let cmp = a.comparator();
    let mut ia = a.iter().peekable();
    let mut ib = b.iter().peekable();
    loop {
        let ord = match (ia.peek(), ib.peek()) {
            (Some(&(ka, _)), Some(&(kb, _))) => cmp.compare(ka, kb),
            _ => return Ok(None),
        };
        match ord {
            Ordering::Less => {
                ia.next();
            }
            Ordering::Greater => {
                ib.next();
            }
            Ordering::Equal => {
                let (ka, va) = ia.next().unwrap();
                let (_, vb) = ib.next().unwrap();
                if let Some(r) = f(ka, va, vb) {
                    return Ok(Some(r));
                }
            }
        }
    }
}

/// Visits every key in `a` that is absent from `b` (spec §6
/// `forEachKeyNotIn`). A key inside a subtree that is `Rc`-identical between
/// `a` and `b` is present in `b` by definition, so (unlike
/// `forEachSharedKey`) such a subtree never contributes a callback and can
/// be skipped outright — no callback is lost, since none would have fired.
pub fn for_each_key_not_in<K, V, C, F, R>(a: &Tree<K, V, C>, b: &Tree<K, V, C>, mut f: F) -> Result<Option<R>>
where
    C: Comparator<K>,
    F: FnMut(&K, &V) -> Option<R>,
{
    ensure_comparable(a, b)?;
    log::trace!("forEachKeyNotIn: |a|={}, |b|={}", a.size(), b.size());
    if Rc::ptr_eq(a.root_rc(), b.root_rc()) {
        return Ok(None);
    }
    Ok(walk_not_in(a.root_for_cursor(), b.root_for_cursor(), a.comparator(), &mut f))
}

fn walk_not_in<K, V, C, F, R>(a: &NodeData<K, V>, b: &NodeData<K, V>, cmp: &C, f: &mut F) -> Option<R>
where
    C: Comparator<K>,
    F: FnMut(&K, &V) -> Option<R>,
{
    match (a, b) {
        (NodeData::Internal(ia), NodeData::Internal(ib)) if same_shape(ia, ib, cmp) => {
            for (ca, cb) in ia.children().iter().zip(ib.children().iter()) {
                if Rc::ptr_eq(ca, cb) {
                    continue;
                }
                if let Some(r) = walk_not_in(ca, cb, cmp, f) {
                    return Some(r);
                }
            }
            None
        }
        _ => merge_not_in(a, b, cmp, f),
    }
}

fn merge_not_in<K, V, C, F, R>(a: &NodeData<K, V>, b: &NodeData<K, V>, cmp: &C, f: &mut F) -> Option<R>
where
    C: Comparator<K>,
    F: FnMut(&K, &V) -> Option<R>,
{
    let mut ia = crate::iter::AscIter::new(a, None, None, false, cmp).peekable();
    let mut ib = crate::iter::AscIter::new(b, None, None, false, cmp).peekable();
    loop {
        let &(ka, _) = ia.peek()?;
        while let Some(&(kb, _)) = ib.peek() {
            if cmp.compare(kb, ka) == Ordering::Less {
                ib.next();
            } else {
                break;
            }
        }
        let present_in_b = matches!(ib.peek(), Some(&(kb, _)) if cmp.compare(kb, ka) == Ordering::Equal);
        let (k, v) = ia.next().unwrap();
        if !present_in_b {
            if let Some(r) = f(k, v) {
                return Some(r);
            }
        }
    }
}

/// All set operations require matching comparators (spec §6); structural-
/// reuse operations additionally require matching `maxNodeSize` (see
/// [`crate::setops::ensure_structurally_compatible`]), but `diffAgainst`/
/// `forEachSharedKey`/`forEachKeyNotIn` do not rebuild any nodes and so have
/// no need of it.
pub(crate) fn ensure_comparable<K, V, C: Comparator<K>>(a: &Tree<K, V, C>, b: &Tree<K, V, C>) -> Result<()> {
    if !a.comparator().same_as(b.comparator()) {
        return Err(ErrorKind::ComparatorMismatch.into());
    }
    Ok(())
}
