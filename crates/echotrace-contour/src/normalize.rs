//! Reduction of heterogeneous per-wall contour inputs to tracker seeds.

use std::collections::BTreeMap;
use std::path::PathBuf;

use echotrace_core::{
    Contour, EchoTraceError, MaskBuffer, Point, Result, ScaleMarkers, Wall, WallContourSeries,
    MIN_CONTOUR_POINTS,
};
use echotrace_media::{find_color, hue_mask, load_rgb};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::extractor::LandmarkExtractor;
use crate::landmarks::LandmarkParams;

/// Where a wall's initial contour comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ContourSource {
    /// Filled binary region of the chamber.
    Mask(MaskBuffer),
    /// Image with the outline hand-drawn in the reference hue.
    Reference(PathBuf),
    /// Already ordered seed points.
    Points(Vec<Point>),
    /// A complete series, delivered without tracking.
    Series(Vec<Contour>),
}

impl ContourSource {
    fn kind(&self) -> &'static str {
        match self {
            Self::Mask(_) => "mask",
            Self::Reference(_) => "reference",
            Self::Points(_) => "points",
            Self::Series(_) => "series",
        }
    }

    /// Shape checks that need no decoding or geometry.
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Mask(mask) if !mask.is_consistent() => Err(format!(
                "mask has {} bytes, expected {}x{}",
                mask.data.len(),
                mask.width,
                mask.height
            )),
            Self::Points(points) if points.len() < MIN_CONTOUR_POINTS => Err(format!(
                "{} seed points, at least {MIN_CONTOUR_POINTS} needed",
                points.len()
            )),
            Self::Series(series) => {
                let Some(first) = series.first() else {
                    return Err("empty contour series".into());
                };
                if first.len() < MIN_CONTOUR_POINTS {
                    return Err(format!(
                        "series contours have {} points, at least {MIN_CONTOUR_POINTS} needed",
                        first.len()
                    ));
                }
                if let Some(bad) = series.iter().position(|c| c.len() != first.len()) {
                    return Err(format!(
                        "series contour {bad} has {} points, expected {}",
                        series[bad].len(),
                        first.len()
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Colors used on hand-drawn reference images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceColors {
    /// Exclusive HSV hue bounds of the drawn outline.
    pub hue_range: (f64, f64),
    /// Exact RGB of the two calibration dots.
    pub scale_marker_rgb: [u8; 3],
}

impl Default for ReferenceColors {
    fn default() -> Self {
        Self {
            hue_range: (0.06, 0.07),
            scale_marker_rgb: [163, 73, 164],
        }
    }
}

/// A wall whose source could not produce a contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedWall {
    pub wall: Wall,
    pub reason: String,
}

/// Canonical per-wall inputs for a tracking run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedContours {
    /// Seed contours to be tracked from frame 0.
    pub seeds: BTreeMap<Wall, Contour>,
    /// Series passed through unchanged.
    pub ready: WallContourSeries,
    pub scale: ScaleMarkers,
    pub rejected: Vec<RejectedWall>,
}

impl NormalizedContours {
    /// True when there is nothing to track and nothing to pass through.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty() && self.ready.is_empty()
    }
}

/// Turns masks, reference images, point lists and ready series into seeds.
#[derive(Debug, Clone)]
pub struct ContourNormalizer {
    extractor: LandmarkExtractor,
    colors: ReferenceColors,
    amount_points: usize,
}

impl ContourNormalizer {
    pub fn new(amount_points: usize, landmarks: LandmarkParams, colors: ReferenceColors) -> Self {
        Self {
            extractor: LandmarkExtractor::new(landmarks),
            colors,
            amount_points,
        }
    }

    pub fn amount_points(&self) -> usize {
        self.amount_points
    }

    /// Check every source before any work is done.
    pub fn validate(sources: &BTreeMap<Wall, ContourSource>) -> Result<()> {
        for (wall, source) in sources {
            source.validate().map_err(|reason| {
                EchoTraceError::InvalidInput(format!("{wall} {}: {reason}", source.kind()))
            })?;
        }
        Ok(())
    }

    /// Normalize all walls.
    ///
    /// Invalid shapes fail the whole call up front. A wall whose mask yields
    /// no usable outline is listed in `rejected` and the other walls proceed.
    pub fn normalize(&self, sources: BTreeMap<Wall, ContourSource>) -> Result<NormalizedContours> {
        Self::validate(&sources)?;

        let mut out = NormalizedContours::default();
        for (wall, source) in sources {
            debug!(wall = %wall, kind = source.kind(), "normalizing contour source");
            let seed = match source {
                ContourSource::Series(series) => {
                    out.ready.insert(wall, series);
                    continue;
                }
                ContourSource::Points(points) => Contour::try_new(points),
                ContourSource::Mask(mask) => self
                    .extractor
                    .extract(&mask, self.amount_points)
                    .map(|e| e.contour),
                ContourSource::Reference(path) => {
                    let (contour, scale) = self.reference_contour(&path)?;
                    if !out.scale.is_present() {
                        out.scale = scale;
                    }
                    contour
                }
            };

            match seed {
                Ok(contour) => {
                    out.seeds.insert(wall, contour);
                }
                Err(EchoTraceError::InvalidMask(reason)) => {
                    warn!(wall = %wall, %reason, "rejecting wall");
                    out.rejected.push(RejectedWall { wall, reason });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            seeds = out.seeds.len(),
            ready = out.ready.len(),
            rejected = out.rejected.len(),
            "contour sources normalized"
        );
        Ok(out)
    }

    /// Decode a reference image: the outer result fails on I/O, the inner one
    /// on an unusable outline.
    fn reference_contour(
        &self,
        path: &std::path::Path,
    ) -> Result<(Result<Contour>, ScaleMarkers)> {
        let image = load_rgb(path)?;

        let dots = find_color(&image, self.colors.scale_marker_rgb);
        let scale = match dots.as_slice() {
            [start, end, ..] => ScaleMarkers::new(*start, *end),
            _ => ScaleMarkers::ABSENT,
        };

        let mask = hue_mask(&image, self.colors.hue_range);
        let contour = self
            .extractor
            .extract(&mask, self.amount_points)
            .map(|e| e.contour);
        Ok((contour, scale))
    }
}
