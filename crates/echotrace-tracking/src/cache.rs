//! Read-only pyramid cache shared by the walls of one run.

use std::collections::HashMap;
use std::sync::Arc;

use echotrace_core::Result;
use parking_lot::Mutex;

use crate::pyramid::ImagePyramid;

/// Pyramids keyed by frame index.
///
/// Entries are never mutated after insertion; building happens outside the
/// lock, so two walls racing for the same frame may both build it and the
/// first insert wins.
#[derive(Debug, Default)]
pub struct PyramidCache {
    entries: Mutex<HashMap<usize, Arc<ImagePyramid>>>,
}

impl PyramidCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached pyramid for `frame`, building it with `build` on a miss.
    pub fn get_or_build(
        &self,
        frame: usize,
        build: impl FnOnce() -> Result<ImagePyramid>,
    ) -> Result<Arc<ImagePyramid>> {
        if let Some(hit) = self.entries.lock().get(&frame) {
            return Ok(Arc::clone(hit));
        }
        let built = Arc::new(build()?);
        Ok(Arc::clone(
            self.entries.lock().entry(frame).or_insert(built),
        ))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::DEFAULT_SIGMA;
    use echotrace_core::GrayImage;

    #[test]
    fn test_builds_once() {
        let cache = PyramidCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let pyr = cache
                .get_or_build(4, || {
                    builds += 1;
                    Ok(ImagePyramid::build(&GrayImage::new(8, 8), 2, DEFAULT_SIGMA))
                })
                .unwrap();
            assert_eq!(pyr.len(), 2);
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = PyramidCache::new();
        let err = cache.get_or_build(0, || Err(echotrace_core::EchoTraceError::MissingFrames));
        assert!(err.is_err());
        assert!(cache.is_empty());
    }
}
