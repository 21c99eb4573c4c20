#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::collections::HashMap;

use chainmap::KeyValueStore;
use criterion::{Criterion, criterion_group, criterion_main};
use proptest::{
    prelude::{Strategy, any},
    strategy::ValueTree,
    test_runner::TestRunner,
};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;

fn store_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let items = proptest::collection::vec(any::<(String, String)>(), ITEMS_AMOUNT)
        .new_tree(&mut runner)
        .unwrap()
        .current();

    let mut group = c.benchmark_group("Key-value store comparison benchmark");
    group.sample_size(SAMPLE_SIZE);
    let mut store = KeyValueStore::new();
    let mut rust_map = HashMap::new();
    group.bench_function("chainmap set", |b| {
        b.iter(|| {
            for (key, value) in items.clone() {
                store.set(key, value);
            }
        });
    });
    group.bench_function("rust std insert", |b| {
        b.iter(|| {
            for (key, value) in items.clone() {
                rust_map.insert(key, value);
            }
        });
    });
    group.bench_function("chainmap get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                let _ = store.get(key.as_str());
            }
        });
    });
    group.bench_function("rust std get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                let _ = rust_map.get(key);
            }
        });
    });
    group.bench_function("chainmap set then delete", |b| {
        b.iter(|| {
            let mut churn = KeyValueStore::new();
            for (key, value) in &items {
                churn.set(key.as_str(), value.as_str());
            }
            for (key, _) in &items {
                let _ = churn.delete(key.as_str());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, store_benches);

criterion_main!(benches);
