//! EchoTrace Tracking - propagating contours through a frame sequence.
//!
//! Points are matched frame to frame with a pyramidal Lucas-Kanade step:
//! per-point gradient least squares on fixed windows, coarse level first.

pub mod cache;
pub mod point_tracker;
pub mod pyramid;
pub mod sequence;
pub mod window;
pub mod worker;

pub use cache::PyramidCache;
pub use point_tracker::{PyramidalTracker, TrackerParams};
pub use pyramid::{downsample, gaussian_blur, resize_bilinear, ImagePyramid, DEFAULT_SIGMA};
pub use sequence::{track_sequence, SequenceTracker, TrackCancel, TrackProgress};
pub use window::Window;
pub use worker::{run_job, wait_for, TrackingEvent, TrackingJob, TrackingOutput, TrackingWorker};
