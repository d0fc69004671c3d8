// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tess_sweep::{ElementType, Tessellator, WindingRule};

fn circle(n: usize, radius: f32, cx: f32) -> Vec<f32> {
    (0..n)
        .flat_map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            [cx + radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// A star polygon whose edges all cross each other.
fn star(n: usize, radius: f32) -> Vec<f32> {
    let step = n / 2 - 1;
    (0..n)
        .flat_map(|i| {
            let a = (i * step % n) as f32 / n as f32 * std::f32::consts::TAU;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

fn tessellate(contours: &[Vec<f32>], rule: WindingRule, poly_size: usize) -> usize {
    let mut tess = Tessellator::new();
    for c in contours {
        tess.add_contour(2, c);
    }
    match tess.tessellate(rule, ElementType::Polygons, poly_size, 2, None) {
        Ok(()) => tess.element_count(),
        Err(_) => 0,
    }
}

fn convex(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex");
    for n in [16, 256, 4096] {
        let contours = vec![circle(n, 100.0, 0.0)];
        group.bench_with_input(BenchmarkId::from_parameter(n), &contours, |b, contours| {
            b.iter(|| tessellate(contours, WindingRule::Odd, 3))
        });
    }
    group.finish();
}

fn overlapping(c: &mut Criterion) {
    let contours: Vec<Vec<f32>> = (0..8).map(|k| circle(64, 50.0, k as f32 * 20.0)).collect();
    c.bench_function("overlapping circles nonzero", |b| {
        b.iter(|| tessellate(&contours, WindingRule::NonZero, 3))
    });
    c.bench_function("overlapping circles convex polygons", |b| {
        b.iter(|| tessellate(&contours, WindingRule::NonZero, 8))
    });
}

fn self_intersecting(c: &mut Criterion) {
    let contours = vec![star(31, 100.0)];
    c.bench_function("star 31", |b| {
        b.iter(|| tessellate(&contours, WindingRule::Odd, 3))
    });
}

criterion_group!(benches, convex, overlapping, self_intersecting);
criterion_main!(benches);
