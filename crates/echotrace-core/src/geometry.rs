//! Geometric primitives: points, polar coordinates, contours and scale markers.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{EchoTraceError, Result};

/// A point in image pixel space (`x` = column, `y` = row).
pub type Point = DVec2;

/// Smallest number of points a contour may have.
pub const MIN_CONTOUR_POINTS: usize = 3;

/// Polar coordinates relative to some center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Polar {
    /// Angle in radians, `atan2(dy, dx)`, in (-PI, PI].
    pub phi: f64,
    /// Euclidean distance from the center.
    pub rho: f64,
}

impl Polar {
    #[inline]
    pub const fn new(phi: f64, rho: f64) -> Self {
        Self { phi, rho }
    }

    /// Polar coordinates of `point` around `center`.
    #[inline]
    pub fn from_point(point: Point, center: Point) -> Self {
        let d = point - center;
        Self {
            phi: d.y.atan2(d.x),
            rho: d.length(),
        }
    }

    /// Cartesian point for these polar coordinates around `center`.
    #[inline]
    pub fn to_point(self, center: Point) -> Point {
        center + DVec2::new(self.rho * self.phi.cos(), self.rho * self.phi.sin())
    }
}

/// Arithmetic mean of a set of points, `None` when empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(DVec2::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

/// Index of the first maximum of `values`, `None` when empty.
///
/// NaN values never win.
pub fn argmax(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v <= b || v.is_nan() => {}
            None if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// An ordered set of landmark points describing one wall on one frame.
///
/// Point `k` on one frame and point `k` on the next denote the same material
/// point, so the order is never changed once a contour exists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Wrap an ordered point list without validation.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Wrap an ordered point list, rejecting lists shorter than
    /// [`MIN_CONTOUR_POINTS`].
    pub fn try_new(points: Vec<Point>) -> Result<Self> {
        if points.len() < MIN_CONTOUR_POINTS {
            return Err(EchoTraceError::InvalidInput(format!(
                "contour needs at least {} points, got {}",
                MIN_CONTOUR_POINTS,
                points.len()
            )));
        }
        Ok(Self { points })
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Mean of the contour points.
    pub fn centroid(&self) -> Option<Point> {
        centroid(&self.points)
    }

    /// Axis-aligned bounds as `(min, max)` corners.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Calibration ruler endpoints found on a reference image.
///
/// Unrelated to tracking; carried through to the output unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleMarkers {
    pub start: Point,
    pub end: Point,
}

impl ScaleMarkers {
    /// Sentinel coordinate for a missing marker.
    pub const ABSENT_POINT: Point = DVec2::new(-1.0, -1.0);

    /// Marker pair meaning "no ruler found".
    pub const ABSENT: Self = Self {
        start: Self::ABSENT_POINT,
        end: Self::ABSENT_POINT,
    };

    #[inline]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// True when both endpoints are real coordinates.
    pub fn is_present(&self) -> bool {
        self.start != Self::ABSENT_POINT && self.end != Self::ABSENT_POINT
    }
}

impl Default for ScaleMarkers {
    fn default() -> Self {
        Self::ABSENT
    }
}
