//! Anatomical landmark detection on a chamber outline.
//!
//! The outline is first scaled into a fixed square reference frame so the
//! angular heuristics do not depend on the frame resolution. Apex and base
//! corners are then located with polar-coordinate votes around the outline
//! centroid.

use echotrace_core::{argmax, centroid, EchoTraceError, Point, Polar, Result};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunables of the landmark heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkParams {
    /// Side of the square reference frame the outline is scaled into.
    pub reference_size: f64,
    /// Horizontal offsets `-base_sweep..=base_sweep` tried by the base vote.
    pub base_sweep: i32,
    /// Arc points closer than this (reference units) shape the normal vector.
    pub arc_radius: f64,
    /// First step of the base corner center search.
    pub search_start: u32,
    /// The center search stops once its step exceeds this.
    pub search_limit: u32,
}

impl Default for LandmarkParams {
    fn default() -> Self {
        Self {
            reference_size: 1000.0,
            base_sweep: 100,
            arc_radius: 200.0,
            search_start: 10,
            search_limit: 1000,
        }
    }
}

/// The three anchor points of a chamber outline, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub apex: Point,
    pub base_left: Point,
    pub base_right: Point,
    /// Mean of the outline pixels.
    pub centroid: Point,
}

/// Per-axis scaling between mask pixels and the square reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    scale: DVec2,
}

impl ReferenceFrame {
    pub fn new(width: u32, height: u32, size: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EchoTraceError::InvalidMask(format!(
                "mask has zero size {width}x{height}"
            )));
        }
        if !(size.is_finite() && size > 0.0) {
            return Err(EchoTraceError::InvalidParameter(format!(
                "reference size must be positive, got {size}"
            )));
        }
        Ok(Self {
            scale: DVec2::new(size / width as f64, size / height as f64),
        })
    }

    #[inline]
    pub fn to_reference(&self, p: Point) -> Point {
        p * self.scale
    }

    #[inline]
    pub fn to_pixels(&self, p: Point) -> Point {
        p / self.scale
    }
}

/// Side of the base candidate an arc lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Mean perpendicular distance of `arc` points (relative to `base`) from the
/// arc's end-to-end chord direction.
fn chord_variance(arc: &[Point], base: Point) -> f64 {
    let (Some(first), Some(last)) = (arc.first(), arc.last()) else {
        return 0.0;
    };
    let chord = *first - *last;
    let len_sq = chord.length_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    let total: f64 = arc
        .iter()
        .map(|p| {
            let q = *p - base;
            (q - chord * (q.dot(chord) / len_sq)).length()
        })
        .sum();
    total / arc.len() as f64
}

/// Mean unit direction from `base` to the arc points near it.
fn mean_direction(arc: &[Point], base: Point, radius: f64) -> DVec2 {
    let near: Vec<Point> = arc
        .iter()
        .copied()
        .filter(|p| (*p - base).length() < radius)
        .collect();
    let pool = if near.is_empty() { arc } else { &near[..] };
    let units: Vec<DVec2> = pool
        .iter()
        .filter_map(|p| {
            let d = *p - base;
            let len = d.length();
            (len > 0.0).then(|| d / len)
        })
        .collect();
    centroid(&units).unwrap_or(DVec2::ZERO)
}

/// Apex candidate: the farthest outline point with a negative polar angle.
fn apex_candidate(sorted: &[Polar], center: Point) -> Result<Point> {
    let upper: Vec<Polar> = sorted.iter().copied().filter(|p| p.phi < 0.0).collect();
    let idx = argmax(upper.iter().map(|p| p.rho)).ok_or_else(|| {
        EchoTraceError::InvalidMask("outline has no point above its centroid".into())
    })?;
    Ok(upper[idx].to_point(center))
}

/// Base candidate: the outline point most often farthest from a sweep of
/// centers along the apex row. The first index reaching the top count wins.
fn base_vote(outline: &[Point], top: Point, sweep: i32) -> Option<usize> {
    let mut votes: Vec<(usize, u32)> = Vec::new();
    for offset in -sweep..=sweep {
        let c = DVec2::new(top.x + offset as f64, top.y);
        let Some(idx) = argmax(outline.iter().map(|p| (*p - c).length())) else {
            continue;
        };
        match votes.iter_mut().find(|(i, _)| *i == idx) {
            Some(entry) => entry.1 += 1,
            None => votes.push((idx, 1)),
        }
    }
    let mut best: Option<(usize, u32)> = None;
    for (idx, count) in votes {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((idx, count));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Locate apex and base corners of the outline.
///
/// `outline` holds boundary pixels in row-major order; `frame` maps them into
/// the reference square.
pub fn detect_landmarks(
    outline: &[Point],
    frame: &ReferenceFrame,
    params: &LandmarkParams,
) -> Result<Landmarks> {
    let pixel_centroid = centroid(outline)
        .ok_or_else(|| EchoTraceError::InvalidMask("mask has no foreground pixels".into()))?;

    let scaled: Vec<Point> = outline.iter().map(|p| frame.to_reference(*p)).collect();
    let center = frame.to_reference(pixel_centroid);

    let mut sorted: Vec<Polar> = scaled
        .iter()
        .map(|p| Polar::from_point(*p, center))
        .collect();
    sorted.sort_by(|a, b| a.phi.total_cmp(&b.phi));

    let top = apex_candidate(&sorted, center)?;
    let base_idx = base_vote(&scaled, top, params.base_sweep)
        .ok_or_else(|| EchoTraceError::InvalidMask("base vote found no candidate".into()))?;
    let base = scaled[base_idx];
    let base_phi = Polar::from_point(base, center).phi;

    let lower = sorted.iter().filter(|p| p.phi >= 0.0);
    let right: Vec<Point> = lower
        .clone()
        .filter(|p| p.phi < base_phi)
        .map(|p| p.to_point(center))
        .collect();
    let left: Vec<Point> = lower
        .filter(|p| p.phi > base_phi)
        .map(|p| p.to_point(center))
        .collect();
    if left.is_empty() && right.is_empty() {
        return Err(EchoTraceError::InvalidMask(
            "outline has no point below its centroid".into(),
        ));
    }

    let var_left = chord_variance(&left, base);
    let var_right = chord_variance(&right, base);

    // The flatter arc meets the known corner; walk the normal off the other.
    // An empty arc means the vote landed on that side's outermost corner.
    let search_right = left.is_empty() || (!right.is_empty() && var_right > var_left);
    let (known, arc, edge, normal) = if search_right {
        let m = mean_direction(&right, base, params.arc_radius);
        (Side::Left, &right, right.first(), DVec2::new(m.y, -m.x))
    } else {
        let m = mean_direction(&left, base, params.arc_radius);
        (Side::Right, &left, left.last(), DVec2::new(-m.y, m.x))
    };
    let edge = *edge.ok_or_else(|| EchoTraceError::Internal("empty arc after split".into()))?;

    let mut k = params.search_start as f64;
    let mut c = base + normal * k;
    while (c - base).length() <= (edge - c).length() || c.y > top.y {
        if k > params.search_limit as f64 {
            debug!(step = k, "base corner search hit its limit");
            break;
        }
        k += 1.0;
        c = base + normal * k;
    }

    let far = argmax(arc.iter().map(|p| (*p - c).length()))
        .ok_or_else(|| EchoTraceError::Internal("empty arc after split".into()))?;
    let other = frame.to_pixels(arc[far]).round();
    let base_px = frame.to_pixels(base).round();
    let (base_left, base_right) = match known {
        Side::Left => (base_px, other),
        Side::Right => (other, base_px),
    };

    let mid = (base_left + base_right) * 0.5;
    let apex_idx = argmax(outline.iter().map(|p| (*p - mid).length()))
        .ok_or_else(|| EchoTraceError::Internal("empty outline".into()))?;

    Ok(Landmarks {
        apex: outline[apex_idx],
        base_left,
        base_right,
        centroid: pixel_centroid,
    })
}
