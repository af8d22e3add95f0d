//! Performance benchmarks for replication-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use replication_engine::{
    collect_ids, merge, ClientError, Error, MemoryRepository, MetricsSender, Product,
    ProductClient, ProductId, Service,
};
use std::collections::HashMap;

fn fetched_batch(size: i64) -> Vec<Product> {
    (0..size)
        .map(|i| Product::new(i, format!("product-{}", i)))
        .collect()
}

/// Every other fetched product is already stored.
fn existing_index(size: i64) -> HashMap<ProductId, Product> {
    (0..size)
        .step_by(2)
        .map(|i| (i, Product::new(i, format!("stored-{}", i))))
        .collect()
}

struct StaticClient(Vec<Product>);

impl ProductClient for StaticClient {
    async fn fetch(&self) -> Result<Vec<Product>, ClientError> {
        Ok(self.0.clone())
    }
}

struct NoopMetrics;

impl MetricsSender for NoopMetrics {
    fn report_success(&self, _count: usize) {}
    fn report_failure(&self, _err: &Error) {}
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for size in [100i64, 1_000, 10_000] {
        let fetched = fetched_batch(size);
        let existing = existing_index(size);

        group.bench_with_input(BenchmarkId::new("half_existing", size), &size, |b, _| {
            b.iter(|| merge(black_box(fetched.clone()), black_box(&existing)))
        });

        group.bench_with_input(BenchmarkId::new("collect_ids", size), &size, |b, _| {
            b.iter(|| collect_ids(black_box(&fetched)))
        });
    }

    group.finish();
}

fn bench_replicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicate");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for size in [100i64, 1_000] {
        group.bench_with_input(BenchmarkId::new("memory_repository", size), &size, |b, &size| {
            b.to_async(&runtime).iter(|| async move {
                let service = Service::new(
                    StaticClient(fetched_batch(size)),
                    MemoryRepository::with_products(existing_index(size).into_values()),
                    NoopMetrics,
                );
                service.replicate().await
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_replicate);
criterion_main!(benches);
