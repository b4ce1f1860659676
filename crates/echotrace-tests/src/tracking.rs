//! Integration tests for sequence tracking.
//!
//! Drives echotrace-tracking with seeds from echotrace-contour over
//! in-memory and on-disk frame sequences.

use std::collections::BTreeMap;

use echotrace_contour::{ContourNormalizer, ContourSource, LandmarkParams, ReferenceColors};
use echotrace_core::{Contour, EchoTraceError, GrayImage, InMemoryFrames, MaskBuffer, Point, Wall};
use echotrace_media::FileFrames;
use echotrace_tracking::{
    run_job, track_sequence, wait_for, PyramidalTracker, TrackCancel, TrackerParams, TrackingJob,
    TrackingWorker,
};
use image::{Rgb, RgbImage};

// ── Helpers ────────────────────────────────────────────────────

fn texture(w: u32, h: u32, dx: f64) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let (x, y) = (x as f64 - dx, y as f64);
        let v = 0.5 + 0.2 * (x / 6.0).sin() + 0.2 * (y / 8.0).cos() + 0.05 * (x * y / 90.0).sin();
        v as f32
    })
}

/// Frames translated `step` pixels right per frame.
fn drifting_by(n: usize, step: f64) -> InMemoryFrames {
    (0..n).map(|i| texture(128, 128, step * i as f64)).collect()
}

fn drifting(n: usize) -> InMemoryFrames {
    drifting_by(n, 1.0)
}

fn ring_seed(n: usize) -> Contour {
    (0..n)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / n as f64;
            Point::new(64.0 + 20.0 * a.cos(), 64.0 + 20.0 * a.sin()).round()
        })
        .collect()
}

fn tracker() -> PyramidalTracker {
    PyramidalTracker::new(TrackerParams::default()).unwrap()
}

fn normalizer(n: usize) -> ContourNormalizer {
    ContourNormalizer::new(n, LandmarkParams::default(), ReferenceColors::default())
}

// ── Sequence driver ────────────────────────────────────────────

#[test]
fn five_frames_ten_points() {
    let seeds = BTreeMap::from([(Wall::Endo, ring_seed(10))]);
    let out = track_sequence(&tracker(), &drifting(5), &seeds, &TrackCancel::new(), |_| {})
        .unwrap();
    let series = out.get(Wall::Endo).unwrap();
    assert_eq!(series.len(), 5);
    assert_eq!(series[0], ring_seed(10));
    assert!(series.iter().all(|c| c.len() == 10));
}

#[test]
fn drift_moves_points_right() {
    let seeds = BTreeMap::from([(Wall::Endo, ring_seed(8))]);
    let frames = drifting_by(4, 3.0);
    let out = track_sequence(&tracker(), &frames, &seeds, &TrackCancel::new(), |_| {}).unwrap();
    let series = out.get(Wall::Endo).unwrap();
    let first = series[0].centroid().unwrap();
    let last = series[3].centroid().unwrap();
    // Three 3-pixel steps; truncation may lose up to one pixel per step.
    assert!(last.x - first.x >= 3.0, "{first} -> {last}");
    assert!(last.x - first.x <= 10.0, "{first} -> {last}");
    assert!((last.y - first.y).abs() <= 3.0);
}

#[test]
fn static_frames_keep_contour() {
    let frames: InMemoryFrames = (0..3).map(|_| texture(96, 96, 0.0)).collect();
    let seed = ring_seed(6);
    let seeds = BTreeMap::from([(Wall::Epi, seed.clone())]);
    let out = track_sequence(&tracker(), &frames, &seeds, &TrackCancel::new(), |_| {}).unwrap();
    assert!(out.get(Wall::Epi).unwrap().iter().all(|c| *c == seed));
}

// ── Full jobs ──────────────────────────────────────────────────

#[test]
fn mask_and_series_job() {
    let ready = vec![ring_seed(5); 4];
    let sources = BTreeMap::from([
        (
            Wall::Endo,
            ContourSource::Mask(MaskBuffer::disc(128, 128, Point::new(64.0, 64.0), 25.0)),
        ),
        (Wall::Epi, ContourSource::Series(ready.clone())),
    ]);
    let job = TrackingJob::new(drifting(3), sources, normalizer(9));
    let mut progress = Vec::new();
    let out = run_job(&tracker(), job, &TrackCancel::new(), |p| progress.push(p)).unwrap();

    let endo = out.series.get(Wall::Endo).unwrap();
    assert_eq!(endo.len(), 3);
    assert!(endo.iter().all(|c| c.len() == 9));
    assert_eq!(out.series.get(Wall::Epi), Some(ready.as_slice()));
    // Only the tracked wall reports progress.
    assert_eq!(progress.len(), 2);
    assert!(progress.iter().all(|p| p.wall == Wall::Endo));
}

#[test]
fn job_with_only_rejected_walls_is_empty() {
    let sources = BTreeMap::from([(Wall::Endo, ContourSource::Mask(MaskBuffer::new(64, 64)))]);
    let job = TrackingJob::new(drifting(2), sources, normalizer(8));
    let out = run_job(&tracker(), job, &TrackCancel::new(), |_| {}).unwrap();
    assert!(out.series.is_empty());
    assert_eq!(out.rejected.len(), 1);
}

#[test]
fn job_without_sources_fails() {
    let job = TrackingJob::new(drifting(2), BTreeMap::new(), normalizer(8));
    let err = run_job(&tracker(), job, &TrackCancel::new(), |_| {}).unwrap_err();
    assert!(matches!(err, EchoTraceError::MissingContours));
}

#[test]
fn worker_tracks_frames_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        let gray = texture(96, 96, i as f64);
        let img = RgbImage::from_fn(96, 96, |x, y| {
            let v = (gray.get(x as i32, y as i32) * 255.0) as u8;
            Rgb([v, v, v])
        });
        img.save(dir.path().join(format!("frame_{i:03}.png"))).unwrap();
    }
    let frames = FileFrames::from_dir(dir.path()).unwrap();
    assert_eq!(frames.paths().len(), 3);

    let worker = TrackingWorker::new(tracker());
    let seed = ContourSource::Points(ring_seed(7).into_points());
    let sources = BTreeMap::from([(Wall::Endo, seed)]);
    let events = worker
        .start(TrackingJob::new(frames, sources, normalizer(7)), TrackCancel::new())
        .unwrap();
    let mut last = None;
    let out = wait_for(&events, |p| last = Some(p)).unwrap();

    let last = last.unwrap();
    assert_eq!((last.wall, last.frame, last.total), (Wall::Endo, 2, 2));
    assert_eq!(last.fraction(), 1.0);
    let series = out.series.get(Wall::Endo).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[0], ring_seed(7));
    assert!(!worker.is_busy());
}
