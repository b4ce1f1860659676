//! Benchmarks for one tracking step.
//!
//! Run with: cargo bench -p echotrace-tracking

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use echotrace_core::{Contour, GrayImage, Point};
use echotrace_tracking::{PyramidalTracker, TrackerParams};

fn frame(w: u32, h: u32, shift: f32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let x = x as f32 - shift;
        0.5 + 0.25 * (x / 9.0).sin() + 0.25 * (y as f32 / 11.0).cos()
    })
}

fn ring(n: usize) -> Contour {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            Point::new(320.0 + 120.0 * a.cos(), 240.0 + 150.0 * a.sin())
        })
        .collect()
}

fn bench_pyramid(c: &mut Criterion) {
    let tracker = PyramidalTracker::new(TrackerParams::default()).unwrap();
    let img = frame(640, 480, 0.0);
    c.bench_function("pyramid_640x480", |bencher| {
        bencher.iter(|| tracker.build_pyramid(black_box(&img)));
    });
}

fn bench_track_step(c: &mut Criterion) {
    let contour = ring(32);
    let a = frame(640, 480, 0.0);
    let b = frame(640, 480, 2.0);

    for parallel in [false, true] {
        let tracker = PyramidalTracker::new(TrackerParams {
            parallel,
            ..TrackerParams::default()
        })
        .unwrap();
        let (pa, pb) = (tracker.build_pyramid(&a), tracker.build_pyramid(&b));
        let name = if parallel { "track_32_points_parallel" } else { "track_32_points" };
        c.bench_function(name, |bencher| {
            bencher.iter(|| tracker.track(black_box(&contour), &pa, &pb));
        });
    }
}

criterion_group!(benches, bench_pyramid, bench_track_step);
criterion_main!(benches);
