//! Folding the tracker across a whole frame sequence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use echotrace_core::{Contour, EchoTraceError, FrameSequence, Result, Wall, WallContourSeries};
use tracing::{debug, info};

use crate::cache::PyramidCache;
use crate::point_tracker::PyramidalTracker;
use crate::pyramid::ImagePyramid;

/// Per-frame progress of one wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackProgress {
    pub wall: Wall,
    /// Index of the frame just tracked, from 1.
    pub frame: usize,
    /// Number of frame pairs for this wall.
    pub total: usize,
}

impl TrackProgress {
    /// Completion of this wall (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.frame as f64 / self.total as f64
    }
}

/// Handle for cancelling a tracking run between frame pairs.
#[derive(Debug, Clone)]
pub struct TrackCancel(Arc<AtomicBool>);

impl TrackCancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for TrackCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the tracker over every frame pair for every wall.
pub struct SequenceTracker<'a> {
    tracker: &'a PyramidalTracker,
    frames: &'a dyn FrameSequence,
    cache: Option<PyramidCache>,
}

impl<'a> SequenceTracker<'a> {
    pub fn new(tracker: &'a PyramidalTracker, frames: &'a dyn FrameSequence) -> Self {
        let cache = tracker.params().share_pyramids.then(PyramidCache::new);
        Self {
            tracker,
            frames,
            cache,
        }
    }

    fn pyramid(&self, index: usize) -> Result<Arc<ImagePyramid>> {
        let build = || -> Result<ImagePyramid> {
            let frame = self.frames.load(index)?;
            Ok(self.tracker.build_pyramid(&frame))
        };
        match &self.cache {
            Some(cache) => cache.get_or_build(index, build),
            None => build().map(Arc::new),
        }
    }

    /// Track one wall: index 0 is the seed, index `k` the contour on frame `k`.
    pub fn track_wall(
        &self,
        wall: Wall,
        seed: &Contour,
        cancel: &TrackCancel,
        on_progress: &mut dyn FnMut(TrackProgress),
    ) -> Result<Vec<Contour>> {
        let n = self.frames.len();
        if n == 0 {
            return Err(EchoTraceError::MissingFrames);
        }

        let mut series = Vec::with_capacity(n);
        series.push(seed.clone());
        let mut prev = self.pyramid(0)?;
        for k in 1..n {
            if cancel.is_cancelled() {
                info!(wall = %wall, frame = k, "tracking cancelled");
                return Err(EchoTraceError::Cancelled);
            }
            let next = self.pyramid(k)?;
            let current = series.last().unwrap_or(seed);
            let tracked = self.tracker.track(current, &prev, &next);
            debug!(wall = %wall, frame = k, points = tracked.len(), "tracked frame");
            series.push(tracked);
            on_progress(TrackProgress {
                wall,
                frame: k,
                total: n - 1,
            });
            prev = next;
        }
        Ok(series)
    }

    /// Track every seeded wall through the whole sequence.
    pub fn run(
        &self,
        seeds: &BTreeMap<Wall, Contour>,
        cancel: &TrackCancel,
        mut on_progress: impl FnMut(TrackProgress),
    ) -> Result<WallContourSeries> {
        if self.frames.is_empty() {
            return Err(EchoTraceError::MissingFrames);
        }
        if seeds.is_empty() {
            return Err(EchoTraceError::MissingContours);
        }
        info!(
            walls = seeds.len(),
            frames = self.frames.len(),
            shared_pyramids = self.cache.is_some(),
            "tracking sequence"
        );

        let mut out = WallContourSeries::new();
        for (wall, seed) in seeds {
            let series = self.track_wall(*wall, seed, cancel, &mut on_progress)?;
            out.insert(*wall, series);
        }
        Ok(out)
    }
}

/// Track `seeds` through `frames` with a fresh [`SequenceTracker`].
pub fn track_sequence(
    tracker: &PyramidalTracker,
    frames: &dyn FrameSequence,
    seeds: &BTreeMap<Wall, Contour>,
    cancel: &TrackCancel,
    on_progress: impl FnMut(TrackProgress),
) -> Result<WallContourSeries> {
    SequenceTracker::new(tracker, frames).run(seeds, cancel, on_progress)
}
