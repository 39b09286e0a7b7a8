//! Integration-level scenarios drawn from the documented behaviors of the
//! tree: rotation avoiding an unnecessary split, structural-sharing clones,
//! and the algebraic identities two-tree set operations are expected to
//! satisfy.

use cow_btree::comparator::OrdComparator;
use cow_btree::{intersect, subtract, union, EditAction, Tree};

fn small_tree(max_node_size: usize, pairs: &[(i32, i32)]) -> Tree<i32, i32, OrdComparator<i32>> {
    let mut t = Tree::with_node_size(max_node_size);
    for &(k, v) in pairs {
        t.set(k, v).unwrap();
    }
    t
}

#[test]
fn rotation_avoids_an_unnecessary_split() {
    // MaxNodeSize=4: fill two neighboring leaves to capacity with a gap at
    // key 5, then insert into the gap. The tree should still be valid and
    // should not have needed to grow in height to absorb one more key.
    let mut t: Tree<i32, i32, OrdComparator<i32>> = Tree::with_node_size(4);
    for k in 1..=4 {
        t.set(k, k).unwrap();
    }
    for k in 6..=9 {
        t.set(k, k).unwrap();
    }
    let height_before = t.height();
    t.set(5, 5).unwrap();
    t.check_valid().unwrap();
    assert_eq!(t.get(&5), Some(&5));
    assert_eq!(t.size(), 9);
    assert_eq!(t.height(), height_before, "filling the gap should not have grown the tree");
}

#[test]
fn large_insert_delete_workload_stays_valid() {
    let mut t: Tree<i32, i32, OrdComparator<i32>> = Tree::with_node_size(6);
    for i in 0..2000 {
        t.set(i, i * i).unwrap();
    }
    t.check_valid().unwrap();
    assert_eq!(t.size(), 2000);

    for i in (0..2000).step_by(3) {
        assert_eq!(t.delete(&i).unwrap(), Some(i * i));
    }
    t.check_valid().unwrap();
    for i in 0..2000 {
        if i % 3 == 0 {
            assert_eq!(t.get(&i), None);
        } else {
            assert_eq!(t.get(&i), Some(&(i * i)));
        }
    }
}

#[test]
fn clone_is_independent_after_divergent_writes() {
    let mut a = small_tree(8, &(0..100).map(|i| (i, i)).collect::<Vec<_>>());
    let b = a.clone();
    for i in 0..50 {
        a.delete(&i).unwrap();
    }
    a.check_valid().unwrap();
    b.check_valid().unwrap();
    assert_eq!(a.size(), 50);
    assert_eq!(b.size(), 100);
    for i in 0..50 {
        assert_eq!(b.get(&i), Some(&i));
    }
}

#[test]
fn union_intersect_subtract_satisfy_basic_identities() {
    let a = small_tree(8, &(0..60).map(|i| (i, i)).collect::<Vec<_>>());
    let b = small_tree(8, &(30..90).map(|i| (i, i * 10)).collect::<Vec<_>>());

    let u = union(&a, &b, |_, _, vb| Some(*vb)).unwrap();
    let i = intersect(&a, &b, |_, va, _| *va).unwrap();
    let sub_a = subtract(&a, &b).unwrap();
    let sub_b = subtract(&b, &a).unwrap();

    u.check_valid().unwrap();
    i.check_valid().unwrap();
    sub_a.check_valid().unwrap();
    sub_b.check_valid().unwrap();

    // |union| = |a| + |b| - |intersection|
    assert_eq!(u.size(), a.size() + b.size() - i.size());
    // a \ b and b \ a are disjoint pieces of the union that, together with
    // the intersection, reconstruct it.
    assert_eq!(sub_a.size() + sub_b.size() + i.size(), u.size());

    for k in 0..90 {
        let in_a = a.has(&k);
        let in_b = b.has(&k);
        assert_eq!(u.has(&k), in_a || in_b);
        assert_eq!(i.has(&k), in_a && in_b);
        assert_eq!(sub_a.has(&k), in_a && !in_b);
        assert_eq!(sub_b.has(&k), in_b && !in_a);
    }
}

#[test]
fn edit_range_can_delete_a_subrange_and_rebalance() {
    let mut t = small_tree(6, &(0..100).map(|i| (i, i)).collect::<Vec<_>>());
    let removed = t.delete_range(Some(&20), Some(&79), true).unwrap();
    assert_eq!(removed, 60);
    t.check_valid().unwrap();
    assert_eq!(t.size(), 40);
    assert_eq!(t.get_range(None, None, false, None).len(), 40);
}

#[test]
fn bulk_load_rejects_unsorted_input() {
    let cmp = OrdComparator::<i32>::default();
    let err = Tree::from_sorted_pairs(vec![(3, 3), (1, 1)], cmp, 8);
    assert!(err.is_err());
}

#[test]
fn filter_and_map_values_preserve_order() {
    let t = small_tree(8, &(0..40).map(|i| (i, i)).collect::<Vec<_>>());
    let evens = t.filter(|k, _| k % 2 == 0);
    evens.check_valid().unwrap();
    assert_eq!(evens.size(), 20);
    assert!(evens.iter().all(|(k, _)| k % 2 == 0));

    let doubled = t.map_values(|_, v| v * 2);
    doubled.check_valid().unwrap();
    for (k, v) in t.iter() {
        assert_eq!(doubled.get(k), Some(&(v * 2)));
    }
}

#[test]
fn edit_range_callback_can_break_early_with_a_value() {
    let mut t = small_tree(8, &(0..30).map(|i| (i, i)).collect::<Vec<_>>());
    let found = t
        .edit_range(None, None, false, |k, _| {
            if *k == 15 {
                EditAction::keep().with_break(*k)
            } else {
                EditAction::keep()
            }
        })
        .unwrap();
    assert_eq!(found, Some(15));
}
