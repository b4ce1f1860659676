//! EchoTrace Contour - from drawn chamber regions to ordered landmark points
//!
//! This crate handles:
//! - Thinning a filled mask to its one pixel outline
//! - Detecting apex and base corners with polar heuristics
//! - Resampling the outline into a fixed number of ordered points
//! - Normalizing masks, reference images, point lists and ready series

pub mod boundary;
pub mod extractor;
pub mod landmarks;
pub mod normalize;
pub mod resample;

pub use boundary::boundary_pixels;
pub use extractor::{Extraction, LandmarkExtractor};
pub use landmarks::{detect_landmarks, LandmarkParams, Landmarks, ReferenceFrame};
pub use normalize::{
    ContourNormalizer, ContourSource, NormalizedContours, ReferenceColors, RejectedWall,
};
pub use resample::{linspace_indices, resample_outline};
