// ─────────────────────────────────────────────────────────────────────
// SK Spin-Glass Kernel — Geometry Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the coordinate pipeline.
//!
//! A renderer rebuilds every vertex after each N/k change, so the
//! whole-lattice embedding is the number that matters.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skglass_geometry::SkGeometry;

// ── Single node ─────────────────────────────────────────────────────

fn bench_sk_to_cartesian(c: &mut Criterion) {
    let g = SkGeometry::new(100, 50);
    c.bench_function("sk_to_cartesian", |b| {
        b.iter(|| g.sk_to_cartesian(black_box(17), black_box(33)))
    });
}

fn bench_two_point_clamped(c: &mut Criterion) {
    let g = SkGeometry::new(100, 50);
    c.bench_function("two_point_to_spherical_clamped", |b| {
        b.iter(|| g.two_point_to_spherical_checked(black_box(0.0), black_box(0.0)))
    });
}

// ── Whole lattice ───────────────────────────────────────────────────

fn bench_cartesian_points_100(c: &mut Criterion) {
    let g = SkGeometry::new(100, 50);
    c.bench_function("cartesian_points_N100_k50", |b| {
        b.iter(|| black_box(&g).cartesian_points())
    });
}

fn bench_cartesian_points_1000(c: &mut Criterion) {
    let g = SkGeometry::new(1000, 300);
    c.bench_function("cartesian_points_N1000_k300", |b| {
        b.iter(|| black_box(&g).cartesian_points())
    });
}

fn bench_neighbors_scan(c: &mut Criterion) {
    let g = SkGeometry::new(400, 200);
    c.bench_function("neighbors_scan_N400_k200", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for i in 0..g.node_count() {
                total += g.neighbors(i).len();
            }
            black_box(total)
        })
    });
}

criterion_group!(
    benches,
    bench_sk_to_cartesian,
    bench_two_point_clamped,
    bench_cartesian_points_100,
    bench_cartesian_points_1000,
    bench_neighbors_scan,
);
criterion_main!(benches);
