//! Criterion micro-benchmarks for tracked pointers.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use keel_registered::{Registered, TrackedPtr};

/// Bind and unbind one pointer against a target with many registrations.
fn bench_rebind(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebind");
    for registered in [0usize, 64, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(registered),
            &registered,
            |b, &n| {
                let a = Registered::new(1u64);
                let z = Registered::new(2u64);
                let _others: Vec<_> = (0..n).map(|_| a.track()).collect();
                let mut p = TrackedPtr::null();
                b.iter(|| {
                    p.bind(&a);
                    p.bind(&z);
                    black_box(p.is_null());
                });
            },
        );
    }
    group.finish();
}

/// Destroy an object with `n` pointers registered.
fn bench_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("destroy");
    for n in [1usize, 64, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let object = Registered::new(0u64);
                    let pointers: Vec<_> = (0..n).map(|_| object.track()).collect();
                    (object, pointers)
                },
                |(object, pointers)| {
                    black_box(object.destroy());
                    black_box(pointers);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// Checked read through a live pointer.
fn bench_read(c: &mut Criterion) {
    let object = Registered::new(41u64);
    let p = object.track();
    c.bench_function("tracked_read", |b| {
        b.iter(|| black_box(p.with(|v| *v + 1).unwrap()));
    });
}

criterion_group!(benches, bench_rebind, bench_destroy, bench_read);
criterion_main!(benches);
