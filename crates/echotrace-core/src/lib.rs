//! EchoTrace Core - foundation types for heart-wall contour tracking
//!
//! This crate provides the types shared by every EchoTrace crate:
//! - Points, polar coordinates and ordered contours
//! - Wall identifiers and per-wall contour series
//! - Gray intensity images and binary masks
//! - The frame sequence abstraction the tracker reads from

pub mod error;
pub mod frame;
pub mod geometry;
pub mod image;
pub mod wall;

pub use error::{EchoTraceError, Result};
pub use frame::{FrameSequence, InMemoryFrames};
pub use geometry::{argmax, centroid, Contour, Point, Polar, ScaleMarkers, MIN_CONTOUR_POINTS};
pub use image::{GrayImage, MaskBuffer};
pub use wall::{Wall, WallContourSeries};
