//! Mask to ordered landmark contour.

use echotrace_core::{Contour, EchoTraceError, MaskBuffer, Point, Result, MIN_CONTOUR_POINTS};
use tracing::debug;

use crate::boundary::boundary_pixels;
use crate::landmarks::{detect_landmarks, LandmarkParams, Landmarks, ReferenceFrame};
use crate::resample::resample_outline;

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub contour: Contour,
    /// Centroid of the outline pixels.
    pub centroid: Point,
    pub landmarks: Landmarks,
}

/// Turns filled chamber masks into anatomically anchored contours.
#[derive(Debug, Clone, Default)]
pub struct LandmarkExtractor {
    pub params: LandmarkParams,
}

impl LandmarkExtractor {
    pub fn new(params: LandmarkParams) -> Self {
        Self { params }
    }

    /// Extract exactly `amount_points` ordered outline points from `mask`.
    pub fn extract(&self, mask: &MaskBuffer, amount_points: usize) -> Result<Extraction> {
        if amount_points < MIN_CONTOUR_POINTS {
            return Err(EchoTraceError::InvalidParameter(format!(
                "amount_points must be at least {MIN_CONTOUR_POINTS}, got {amount_points}"
            )));
        }
        if !mask.is_consistent() {
            return Err(EchoTraceError::InvalidInput(format!(
                "mask has {} bytes, expected {}x{}",
                mask.data.len(),
                mask.width,
                mask.height
            )));
        }

        let outline = boundary_pixels(mask);
        if outline.is_empty() {
            return Err(EchoTraceError::InvalidMask(
                "mask has no foreground pixels".into(),
            ));
        }

        let frame = ReferenceFrame::new(mask.width, mask.height, self.params.reference_size)?;
        let landmarks = detect_landmarks(&outline, &frame, &self.params)?;
        let contour = resample_outline(&outline, &landmarks, &frame, amount_points)?;
        debug!(
            outline = outline.len(),
            points = contour.len(),
            apex = %landmarks.apex,
            bounds = ?contour.bounds(),
            "extracted contour"
        );

        Ok(Extraction {
            contour,
            centroid: landmarks.centroid,
            landmarks,
        })
    }
}
