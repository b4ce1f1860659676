//! Pyramidal Lucas-Kanade contour tracker.

use echotrace_core::{Contour, EchoTraceError, GrayImage, Point, Result};
use glam::DVec2;
use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pyramid::{ImagePyramid, DEFAULT_SIGMA};
use crate::window::Window;

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Side of the square matching window, odd.
    pub window_size: usize,
    /// Number of pyramid levels including full resolution.
    pub pyramid_levels: usize,
    /// Smoothing before each reduction; `None` uses [`DEFAULT_SIGMA`].
    pub pyramid_sigma: Option<f64>,
    /// Track the points of one contour on the rayon pool.
    pub parallel: bool,
    /// Reuse frame pyramids across walls within one run.
    pub share_pyramids: bool,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            window_size: 61,
            pyramid_levels: 2,
            pyramid_sigma: None,
            parallel: true,
            share_pyramids: false,
        }
    }
}

impl TrackerParams {
    pub fn sigma(&self) -> f64 {
        self.pyramid_sigma.unwrap_or(DEFAULT_SIGMA)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(EchoTraceError::InvalidParameter(format!(
                "window_size must be odd and at least 3, got {}",
                self.window_size
            )));
        }
        if self.pyramid_levels == 0 || self.pyramid_levels > 16 {
            return Err(EchoTraceError::InvalidParameter(format!(
                "pyramid_levels must be in 1..=16, got {}",
                self.pyramid_levels
            )));
        }
        if let Some(sigma) = self.pyramid_sigma {
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err(EchoTraceError::InvalidParameter(format!(
                    "pyramid_sigma must be finite and non-negative, got {sigma}"
                )));
            }
        }
        Ok(())
    }
}

/// Local displacement of `next` relative to `prev` by gradient least squares.
///
/// Returns the displacement and whether the structure tensor was rank
/// deficient, in which case the minimum-norm solution is used.
fn solve_displacement(prev: &Window, next: &Window) -> (DVec2, bool) {
    let (gx, gy) = prev.gradient();
    let (mut sxx, mut sxy, mut syy, mut sxt, mut syt) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (i, (a, b)) in prev.data().iter().zip(next.data()).enumerate() {
        let ft = a - b;
        sxx += gx[i] * gx[i];
        sxy += gx[i] * gy[i];
        syy += gy[i] * gy[i];
        sxt += gx[i] * ft;
        syt += gy[i] * ft;
    }

    let a = Matrix2::new(sxx, sxy, sxy, syy);
    let b = Vector2::new(sxt, syt);
    if !(a.iter().all(|v| v.is_finite()) && b.iter().all(|v| v.is_finite())) {
        return (DVec2::ZERO, true);
    }

    let svd = a.svd(true, true);
    let cutoff = f64::EPSILON * 2.0 * svd.singular_values.max();
    let degenerate = svd.singular_values.min() <= cutoff;
    match svd.solve(&b, cutoff) {
        Ok(x) => (DVec2::new(x[0], x[1]), degenerate),
        Err(_) => (DVec2::ZERO, true),
    }
}

/// Tracks contour points from one frame to the next.
#[derive(Debug, Clone)]
pub struct PyramidalTracker {
    params: TrackerParams,
}

impl PyramidalTracker {
    pub fn new(params: TrackerParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Pyramid of a frame with the configured depth and smoothing.
    pub fn build_pyramid(&self, frame: &GrayImage) -> ImagePyramid {
        ImagePyramid::build(frame, self.params.pyramid_levels, self.params.sigma())
    }

    /// Position of `point` on the next frame.
    ///
    /// Flow is accumulated in full-resolution pixels from the coarsest level
    /// down; the result moves the point by the truncated flow.
    pub fn track_point(&self, point: Point, prev: &ImagePyramid, next: &ImagePyramid) -> Point {
        let size = self.params.window_size;
        let levels = prev.len().min(next.len());
        let mut flow = DVec2::ZERO;
        for degree in (0..levels).rev() {
            let (Some(img1), Some(img2)) = (prev.level(degree), next.level(degree)) else {
                continue;
            };
            let scale = (1u64 << degree) as f64;
            let w1 = Window::extract(img1, point / scale, size);
            let w2 = Window::extract(img2, (point + flow) / scale, size);
            let (d, degenerate) = solve_displacement(&w1, &w2);
            if degenerate {
                debug!(x = point.x, y = point.y, level = degree, "degenerate tracking window");
            }
            flow += d * scale;
        }
        point + flow.trunc()
    }

    /// Track every point of `contour`, preserving count and order.
    pub fn track(&self, contour: &Contour, prev: &ImagePyramid, next: &ImagePyramid) -> Contour {
        let points: Vec<Point> = if self.params.parallel {
            contour
                .points()
                .par_iter()
                .map(|p| self.track_point(*p, prev, next))
                .collect()
        } else {
            contour
                .iter()
                .map(|p| self.track_point(*p, prev, next))
                .collect()
        };
        Contour::new(points)
    }
}
