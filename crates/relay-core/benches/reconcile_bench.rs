//! Criterion benchmarks for the display path.
//!
//! Every inbound `pos` snapshot is decoded and then fully redrawn.  These
//! benches measure that stateless redraw for realistic finger counts so a
//! regression shows up before it shows up as display lag.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench reconcile_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_core::{
    decode_frame, encode_frame, CoordinateMode, MarkerLayer, Point, PositionReconciler,
    PositionSet, ViewportSize,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_set(points: usize) -> PositionSet {
    PositionSet::new(
        (0..points)
            .map(|i| {
                let f = i as f64 / points.max(1) as f64;
                Point::new(f, 1.0 - f)
            })
            .collect(),
    )
}

fn reconciler() -> PositionReconciler {
    let vp = ViewportSize::new(1920.0, 1080.0).expect("valid viewport");
    PositionReconciler::new(CoordinateMode::Normalized, vp)
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

/// Redraw only: snapshot already decoded.
fn bench_reconcile(c: &mut Criterion) {
    let r = reconciler();
    let mut group = c.benchmark_group("reconcile");
    for points in [1usize, 5, 10, 40] {
        let set = make_set(points);
        group.bench_with_input(BenchmarkId::new("points", points), &set, |b, set| {
            let mut layer = MarkerLayer::new();
            b.iter(|| r.reconcile(black_box(set), &mut layer))
        });
    }
    group.finish();
}

/// Decode + redraw, i.e. the work done per inbound frame.
fn bench_decode_and_reconcile(c: &mut Criterion) {
    let r = reconciler();
    let mut group = c.benchmark_group("decode_and_reconcile");
    for points in [1usize, 10] {
        let text = encode_frame(&make_set(points)).expect("encode must succeed for benchmark setup");
        group.bench_with_input(BenchmarkId::new("points", points), &text, |b, text| {
            let mut layer = MarkerLayer::new();
            b.iter(|| {
                let set: PositionSet = decode_frame(black_box(text)).unwrap();
                r.reconcile(&set, &mut layer)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_decode_and_reconcile);
criterion_main!(benches);
