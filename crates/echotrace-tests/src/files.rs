//! Integration tests for contour files and frame directories.
//!
//! Exercises echotrace-media file formats against series produced by
//! echotrace-tracking.

use std::collections::BTreeMap;
use std::path::PathBuf;

use echotrace_core::{Contour, InMemoryFrames, Point, ScaleMarkers, Wall};
use echotrace_media::{list_frames, systole_index, wall_file_path, ContourFile};
use echotrace_tracking::{track_sequence, PyramidalTracker, TrackCancel, TrackerParams};

// ── Helpers ────────────────────────────────────────────────────

fn contour(offset: f64) -> Contour {
    [(10.0, 40.0), (25.0, 12.0), (40.0, 41.0), (30.0, 55.0)]
        .into_iter()
        .map(|(x, y)| Point::new(x + offset, y))
        .collect()
}

// ── Round trips ────────────────────────────────────────────────

#[test]
fn tracked_series_survives_file_round_trip() {
    let frames: InMemoryFrames = (0..3)
        .map(|_| echotrace_core::GrayImage::filled(64, 64, 0.4))
        .collect();
    let tracker = PyramidalTracker::new(TrackerParams::default()).unwrap();
    let seeds = BTreeMap::from([(Wall::Endo, contour(0.0))]);
    let series = track_sequence(&tracker, &frames, &seeds, &TrackCancel::new(), |_| {}).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = wall_file_path(dir.path().join("patient"), Wall::Endo);
    assert!(path.ends_with("patient_endo.txt"));

    let scale = ScaleMarkers::new(Point::new(3.0, 4.0), Point::new(3.0, 44.0));
    let contours = series.get(Wall::Endo).unwrap().to_vec();
    ContourFile::new(Some(2), scale, contours.clone())
        .write(&path, 0)
        .unwrap();

    let back = ContourFile::read(&path).unwrap();
    assert_eq!(back.sys_id, Some(2));
    assert_eq!(back.scale, scale);
    assert_eq!(back.contours, contours);
    assert_eq!(back.seed(), Some(&contour(0.0)));
}

#[test]
fn precision_keeps_fractions() {
    let c: Contour = vec![Point::new(1.25, 2.5), Point::new(3.75, 4.0), Point::new(5.5, 6.25)]
        .into_iter()
        .collect();
    let text = ContourFile::new(None, ScaleMarkers::ABSENT, vec![c.clone()]).to_text(2);
    assert!(text.starts_with("-1 -1 -1 -1 -1\n"));
    assert!(text.contains("2.50 1.25"));
    assert_eq!(ContourFile::parse(&text).unwrap().contours, vec![c]);
}

#[test]
fn headerless_file_is_all_contours() {
    let text = "40 10 12 25 41 40\n40 11 12 26 41 41\n";
    let file = ContourFile::parse(text).unwrap();
    assert_eq!(file.sys_id, None);
    assert!(!file.scale.is_present());
    assert_eq!(file.contours.len(), 2);
    assert_eq!(file.contours[1].points()[0], Point::new(11.0, 40.0));
}

// ── Frame directories ──────────────────────────────────────────

#[test]
fn systole_frame_found_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["001.png", "002.png", "003.png", "004s.png", "005.png", "endo.txt"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    let frames = list_frames(dir.path()).unwrap();
    assert_eq!(frames.len(), 5);
    assert_eq!(systole_index(&frames, 1), Some(4));
    // index 3 on a grid of 3: left 3, right 6; 3 is closer.
    assert_eq!(systole_index(&frames, 3), Some(4));
    assert_eq!(systole_index(&frames[..3], 1), None);

    let names: Vec<PathBuf> = frames.iter().map(|p| p.file_name().unwrap().into()).collect();
    assert_eq!(names[3], PathBuf::from("004s.png"));
}
