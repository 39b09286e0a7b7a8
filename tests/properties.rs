//! Property tests for the algebraic laws two-tree set operations and plain
//! insert/delete are expected to satisfy, in the teacher's own
//! `quickcheck`/`quickcheck_macros` style.

use cow_btree::comparator::OrdComparator;
use cow_btree::{intersect, subtract, union, Tree};
use std::collections::BTreeMap;

fn tree_from(pairs: &[(i16, i16)]) -> Tree<i16, i16, OrdComparator<i16>> {
    let mut t = Tree::with_node_size(4);
    for &(k, v) in pairs {
        t.set(k, v).unwrap();
    }
    t
}

fn reference(pairs: &[(i16, i16)]) -> BTreeMap<i16, i16> {
    pairs.iter().copied().collect()
}

#[quickcheck_macros::quickcheck]
fn insert_then_get_matches_a_btreemap(pairs: Vec<(i16, i16)>) -> bool {
    let t = tree_from(&pairs);
    let reference = reference(&pairs);
    if t.check_valid().is_err() {
        return false;
    }
    reference.iter().all(|(k, v)| t.get(k) == Some(v)) && t.size() == reference.len()
}

#[quickcheck_macros::quickcheck]
fn delete_every_key_empties_the_tree(pairs: Vec<(i16, i16)>) -> bool {
    let mut t = tree_from(&pairs);
    let reference = reference(&pairs);
    for k in reference.keys() {
        if t.delete(k).unwrap().is_none() {
            return false;
        }
    }
    t.check_valid().is_ok() && t.is_empty()
}

#[quickcheck_macros::quickcheck]
fn union_is_commutative_on_keys(a: Vec<(i16, i16)>, b: Vec<(i16, i16)>) -> bool {
    let ta = tree_from(&a);
    let tb = tree_from(&b);
    let ab = union(&ta, &tb, |_, va, _| Some(*va)).unwrap();
    let ba = union(&tb, &ta, |_, va, _| Some(*va)).unwrap();
    let keys_ab: Vec<_> = ab.iter().map(|(k, _)| *k).collect();
    let keys_ba: Vec<_> = ba.iter().map(|(k, _)| *k).collect();
    keys_ab == keys_ba
}

#[quickcheck_macros::quickcheck]
fn intersect_subtract_reconstruct_union(a: Vec<(i16, i16)>, b: Vec<(i16, i16)>) -> bool {
    let ta = tree_from(&a);
    let tb = tree_from(&b);
    let u = union(&ta, &tb, |_, va, _| Some(*va)).unwrap();
    let i = intersect(&ta, &tb, |_, va, _| *va).unwrap();
    let sub_a = subtract(&ta, &tb).unwrap();
    let sub_b = subtract(&tb, &ta).unwrap();

    if u.check_valid().is_err() || i.check_valid().is_err() {
        return false;
    }
    sub_a.size() + sub_b.size() + i.size() == u.size()
}

#[quickcheck_macros::quickcheck]
fn subtract_removes_exactly_the_shared_keys(a: Vec<(i16, i16)>, b: Vec<(i16, i16)>) -> bool {
    let ta = tree_from(&a);
    let tb = tree_from(&b);
    let diff = subtract(&ta, &tb).unwrap();
    diff.iter().all(|(k, _)| ta.has(k) && !tb.has(k))
        && ta.iter().all(|(k, _)| tb.has(k) || diff.has(k))
}

#[quickcheck_macros::quickcheck]
fn union_with_an_omitting_combine_drops_exactly_the_conflicting_keys(a: Vec<(i16, i16)>, b: Vec<(i16, i16)>) -> bool {
    let ta = tree_from(&a);
    let tb = tree_from(&b);
    // A combine that always omits shared keys should yield the symmetric
    // difference: every key in exactly one of the two trees.
    let u = union(&ta, &tb, |_, _, _| None).unwrap();
    if u.check_valid().is_err() {
        return false;
    }
    u.iter().all(|(k, _)| ta.has(k) != tb.has(k))
        && ta.iter().chain(tb.iter()).all(|(k, _)| (ta.has(k) != tb.has(k)) == u.has(k))
}

#[quickcheck_macros::quickcheck]
fn neighbor_queries_agree_with_a_btreemap(pairs: Vec<(i16, i16)>, probe: i16) -> bool {
    let t = tree_from(&pairs);
    let reference = reference(&pairs);

    let expect_higher = reference.range((std::ops::Bound::Excluded(probe), std::ops::Bound::Unbounded)).next();
    let expect_lower = reference.range((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(probe))).next_back();
    let expect_or_higher = reference.range(probe..).next();
    let expect_or_lower = reference.range(..=probe).next_back();

    t.next_higher_pair(&probe).map(|(k, v)| (*k, *v)) == expect_higher.map(|(k, v)| (*k, *v))
        && t.next_lower_pair(&probe).map(|(k, v)| (*k, *v)) == expect_lower.map(|(k, v)| (*k, *v))
        && t.get_pair_or_next_higher(&probe).map(|(k, v)| (*k, *v)) == expect_or_higher.map(|(k, v)| (*k, *v))
        && t.get_pair_or_next_lower(&probe).map(|(k, v)| (*k, *v)) == expect_or_lower.map(|(k, v)| (*k, *v))
}
