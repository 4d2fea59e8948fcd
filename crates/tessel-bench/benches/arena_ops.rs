//! Criterion micro-benchmarks for the guarded stack allocator.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessel_arena::StackConfig;
use tessel_bench::BenchArena;

/// Benchmark: 64 small allocations released by one scope.
fn bench_allocate_scope_64(c: &mut Criterion) {
    let mut arena = BenchArena::new(64 * 1024);
    let mut ms = arena.stack();

    c.bench_function("arena_allocate_scope_64", |b| {
        b.iter(|| {
            let mut scope = ms.scope();
            for i in 0..64 {
                black_box(scope.allocate(16 + i).unwrap());
            }
        });
    });
}

/// Benchmark: full guard scan over 256 live allocations.
fn bench_verify_256(c: &mut Criterion) {
    let mut arena = BenchArena::new(64 * 1024);
    let mut ms = arena.stack();
    for _ in 0..256 {
        ms.allocate(100).unwrap();
    }

    c.bench_function("arena_verify_256", |b| {
        b.iter(|| black_box(ms.verify()).unwrap());
    });
}

/// Benchmark: allocation with and without zero fill.
fn bench_zeroing(c: &mut Criterion) {
    let mut buf = tessel_arena::AlignedBuffer::new(256 * 1024);
    let mut group = c.benchmark_group("arena_allocate_128k");
    for zero in [true, false] {
        let config = StackConfig::new().with_zero_allocations(zero);
        let mut ms = tessel_arena::MemoryStack::with_config(buf.as_bytes_mut(), config);
        group.bench_function(if zero { "zeroed" } else { "raw" }, |b| {
            b.iter(|| {
                let mut scope = ms.scope();
                black_box(scope.allocate(128 * 1024).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_allocate_scope_64,
    bench_verify_256,
    bench_zeroing
);
criterion_main!(benches);
