//! Ordered frame sequences consumed by the tracker.

use crate::error::{EchoTraceError, Result};
use crate::image::GrayImage;

/// An ordered, random-access sequence of intensity frames.
///
/// Loading may block on I/O; implementations must be shareable with the
/// background tracking thread.
pub trait FrameSequence: Send + Sync {
    /// Number of frames.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load frame `index` as a gray image.
    fn load(&self, index: usize) -> Result<GrayImage>;
}

/// Frames already decoded into memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFrames {
    frames: Vec<GrayImage>,
}

impl InMemoryFrames {
    pub fn new(frames: Vec<GrayImage>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: GrayImage) {
        self.frames.push(frame);
    }
}

impl FrameSequence for InMemoryFrames {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn load(&self, index: usize) -> Result<GrayImage> {
        self.frames.get(index).cloned().ok_or_else(|| {
            EchoTraceError::InvalidParameter(format!(
                "frame {} out of range (0-{})",
                index,
                self.frames.len().saturating_sub(1)
            ))
        })
    }
}

impl FromIterator<GrayImage> for InMemoryFrames {
    fn from_iter<I: IntoIterator<Item = GrayImage>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
