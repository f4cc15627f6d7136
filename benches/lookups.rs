#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use lookup_lab::{BinarySearchTree, ChainedHashTable, Key, LookupSession, compute_layout};
use proptest::{
    collection::vec,
    strategy::{Strategy, ValueTree},
    test_runner::TestRunner,
};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;

fn random_keys(runner: &mut TestRunner) -> Vec<Key> {
    vec(1..50_000_i64, ITEMS_AMOUNT).new_tree(runner).unwrap().current()
}

fn lookup_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let keys = random_keys(&mut runner);
    let probes = random_keys(&mut runner);

    let mut group = c.benchmark_group("Lookup structure comparison");
    group.sample_size(SAMPLE_SIZE);

    group.bench_function("bst insert", |b| {
        b.iter(|| {
            let mut tree = BinarySearchTree::new();
            tree.extend(keys.iter().copied());
            tree
        });
    });
    group.bench_function("hash table insert", |b| {
        b.iter(|| {
            let mut table = ChainedHashTable::new();
            table.extend(keys.iter().copied());
            table
        });
    });

    let mut session = LookupSession::new();
    session.insert_all(keys.iter().copied());
    group.bench_function("bst search", |b| {
        b.iter(|| {
            for &probe in &probes {
                let _ = black_box(session.tree().search(probe));
            }
        });
    });
    group.bench_function("hash table search", |b| {
        b.iter(|| {
            for &probe in &probes {
                let _ = black_box(session.table().search(probe));
            }
        });
    });

    group.bench_function("layout", |b| b.iter(|| compute_layout(session.tree())));
    group.bench_function("balance", |b| {
        b.iter(|| {
            let mut tree = session.tree().clone();
            tree.balance();
            tree
        });
    });

    let mut sorted = keys;
    sorted.sort_unstable();
    sorted.dedup();
    group.bench_function("bst sorted chain search", |b| {
        let mut chain = BinarySearchTree::new();
        chain.extend(sorted.iter().copied());
        b.iter(|| {
            for &probe in &probes {
                let _ = black_box(chain.search(probe));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, lookup_benches);

criterion_main!(benches);
