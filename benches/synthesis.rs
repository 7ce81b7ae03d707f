//! Criterion benchmarks for track synthesis.
//!
//! Benchmarks:
//!   - block walk of a curved 400-block route without smoothing
//!   - the same walk followed by turn smoothing
//!   - follower queries along the finished track
//!
//! Run with: cargo bench --bench synthesis

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trackgen::synthesis::NullSink;
use trackgen::{Block, Follower, RouteData, RouteSettings, Synthesizer};

fn curved_route(blocks: usize, smooth_turns: bool) -> RouteData {
    let settings = RouteSettings {
        smooth_turns,
        ..RouteSettings::default()
    };
    let table = (0..blocks)
        .map(|i| match i % 40 {
            0..=9 => Block::default(),
            10..=19 => Block::default().with_curve(600.0, 0.08),
            20..=24 => Block::default().with_pitch(0.01),
            25..=34 => Block::default().with_curve(-450.0, 0.1),
            35 => Block::default().with_turn(0.02),
            _ => Block::default(),
        })
        .collect();
    RouteData::new(settings, table)
}

// ---------------------------------------------------------------------------
// Benchmark: block walk
// ---------------------------------------------------------------------------

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis_walk");
    group.sample_size(50);

    let plain = curved_route(400, false);
    group.bench_function("curved_400_blocks", |b| {
        b.iter(|| {
            let outcome = Synthesizer::new().run(black_box(plain.clone()), &mut NullSink);
            black_box(outcome)
        });
    });

    let smoothed = curved_route(400, true);
    group.bench_function("curved_400_blocks_smoothed", |b| {
        b.iter(|| {
            let outcome = Synthesizer::new().run(black_box(smoothed.clone()), &mut NullSink);
            black_box(outcome)
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: follower
// ---------------------------------------------------------------------------

fn bench_follower(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis_follower");

    let compiled = Synthesizer::new()
        .run(curved_route(400, true), &mut NullSink)
        .ok()
        .and_then(|o| o.completed());
    let Some(compiled) = compiled else {
        return;
    };
    let elements = compiled.track.elements();
    let length = 400.0 * 25.0;

    // monotone walk, the common case for a moving train
    group.bench_function("forward_sweep", |b| {
        b.iter(|| {
            let mut follower = Follower::new();
            let mut p = 0.0;
            while p < length {
                black_box(follower.update(elements, black_box(p)));
                p += 1.0;
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_walk, bench_follower);
criterion_main!(benches);
