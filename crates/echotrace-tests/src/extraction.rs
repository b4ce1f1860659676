//! Integration tests for contour extraction.
//!
//! Exercises echotrace-core masks through echotrace-contour landmark
//! detection and resampling, and hand-drawn references via echotrace-media.

use std::collections::BTreeMap;

use echotrace_contour::{
    ContourNormalizer, ContourSource, LandmarkExtractor, LandmarkParams, ReferenceColors,
};
use echotrace_core::{EchoTraceError, MaskBuffer, Point, Wall};
use image::{Rgb, RgbImage};

// ── Helpers ────────────────────────────────────────────────────

fn disc(radius: f64) -> MaskBuffer {
    MaskBuffer::disc(200, 200, Point::new(100.0, 100.0), radius)
}

fn normalizer(n: usize) -> ContourNormalizer {
    ContourNormalizer::new(n, LandmarkParams::default(), ReferenceColors::default())
}

// ── Mask extraction ────────────────────────────────────────────

#[test]
fn circle_mask_gives_requested_point_count() {
    let ex = LandmarkExtractor::default();
    for n in [3, 8, 9, 20] {
        let out = ex.extract(&disc(50.0), n).unwrap();
        assert_eq!(out.contour.len(), n);
        for p in out.contour.iter() {
            let r = (*p - Point::new(100.0, 100.0)).length();
            assert!((r - 50.0).abs() < 1.5, "{p} is off the circle");
        }
    }
}

#[test]
fn odd_counts_keep_landmarks_in_place() {
    let out = LandmarkExtractor::default().extract(&disc(40.0), 11).unwrap();
    let pts = out.contour.points();
    assert_eq!(pts[0], out.landmarks.base_left);
    assert_eq!(pts[5], out.landmarks.apex);
    assert_eq!(pts[10], out.landmarks.base_right);
}

#[test]
fn extraction_is_deterministic() {
    let ex = LandmarkExtractor::default();
    let a = ex.extract(&disc(35.0), 16).unwrap();
    let b = ex.extract(&disc(35.0), 16).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_mask_is_invalid() {
    let err = LandmarkExtractor::default()
        .extract(&MaskBuffer::new(32, 32), 8)
        .unwrap_err();
    assert!(matches!(err, EchoTraceError::InvalidMask(_)));
}

// ── Normalizer ─────────────────────────────────────────────────

#[test]
fn normalizer_rejects_bad_wall_but_keeps_good_one() {
    let sources = BTreeMap::from([
        (Wall::Endo, ContourSource::Mask(disc(45.0))),
        (Wall::Epi, ContourSource::Mask(MaskBuffer::new(200, 200))),
    ]);
    let out = normalizer(10).normalize(sources).unwrap();
    assert_eq!(out.seeds[&Wall::Endo].len(), 10);
    assert!(!out.seeds.contains_key(&Wall::Epi));
    assert_eq!(out.rejected.len(), 1);
    assert_eq!(out.rejected[0].wall, Wall::Epi);
}

#[test]
fn normalizer_validates_before_extracting() {
    let sources = BTreeMap::from([
        (Wall::Endo, ContourSource::Mask(disc(45.0))),
        (Wall::Epi, ContourSource::Points(vec![Point::ZERO, Point::ONE])),
    ]);
    let err = normalizer(10).normalize(sources).unwrap_err();
    assert!(matches!(err, EchoTraceError::InvalidInput(_)));
}

#[test]
fn reference_without_dots_has_no_scale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endo.png");
    let mut img = RgbImage::from_pixel(120, 120, Rgb([0, 0, 0]));
    for y in 0..120u32 {
        for x in 0..120u32 {
            let (dx, dy) = (x as f64 - 60.0, y as f64 - 60.0);
            if dx * dx + dy * dy <= 30.0 * 30.0 {
                img.put_pixel(x, y, Rgb([255, 100, 0]));
            }
        }
    }
    // A single dot is not a ruler.
    img.put_pixel(4, 3, Rgb([163, 73, 164]));
    img.save(&path).unwrap();

    let sources = BTreeMap::from([
        (Wall::Endo, ContourSource::Reference(path)),
        (Wall::Epi, ContourSource::Mask(disc(45.0))),
    ]);
    let out = normalizer(12).normalize(sources).unwrap();
    assert_eq!(out.seeds[&Wall::Endo].len(), 12);
    assert_eq!(out.seeds[&Wall::Epi].len(), 12);
    assert!(!out.scale.is_present());
    assert!(out.rejected.is_empty());
}
