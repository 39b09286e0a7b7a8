use cow_btree::Tree;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_structural_clone(c: &mut Criterion) {
    let mut t: Tree<i64, i64> = Tree::new();
    for i in 0..50_000i64 {
        t.set(i, i).unwrap();
    }
    c.bench_function("clone 50k tree (structural)", |b| {
        b.iter(|| black_box(t.clone()))
    });
}

fn bench_write_after_clone(c: &mut Criterion) {
    let mut t: Tree<i64, i64> = Tree::new();
    for i in 0..50_000i64 {
        t.set(i, i).unwrap();
    }
    c.bench_function("single write into a freshly cloned 50k tree", |b| {
        b.iter(|| {
            let mut snapshot = t.clone();
            snapshot.set(black_box(999_999), black_box(1)).unwrap();
            black_box(snapshot.size())
        })
    });
}

criterion_group!(benches, bench_structural_clone, bench_write_after_clone);
criterion_main!(benches);
