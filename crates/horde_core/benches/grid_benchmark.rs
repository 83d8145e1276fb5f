//! # Spatial Grid Benchmark
//!
//! Measures the per-frame rebuild (clear + insert) and the neighbor query
//! that hit detection issues for every hitbox.
//!
//! Run with: `cargo bench --package horde_core --bench grid_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use horde_core::{EntityId, QueryBuffer, SpatialHashGrid};

fn scatter(count: u32) -> Vec<(EntityId, f32, f32)> {
    (1..=count)
        .map(|raw| {
            let f = raw as f32;
            (
                EntityId::from_raw(raw),
                (f * 12.9898).sin() * 100.0,
                (f * 78.233).cos() * 100.0,
            )
        })
        .collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_rebuild");

    for count in [500u32, 5_000] {
        let points = scatter(count);
        let Ok(mut grid) = SpatialHashGrid::new(2.0) else {
            return;
        };

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                grid.clear();
                for &(id, x, y) in &points {
                    grid.insert(id, x, y);
                }
                black_box(grid.len())
            });
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let points = scatter(5_000);
    let (Ok(mut grid), Ok(mut buffer)) = (SpatialHashGrid::new(2.0), QueryBuffer::new(256)) else {
        return;
    };
    for &(id, x, y) in &points {
        grid.insert(id, x, y);
    }

    c.bench_function("grid_query_r3_5k", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let (_, x, y) = points[i % points.len()];
            i += 1;
            black_box(buffer.fill(&grid, x, y, 3.0).count)
        });
    });
}

criterion_group!(benches, bench_rebuild, bench_query);
criterion_main!(benches);
