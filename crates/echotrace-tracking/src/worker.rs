//! Background tracking runs.
//!
//! A [`TrackingWorker`] owns one dedicated thread per run and refuses to start
//! a second run while one is active. Progress and the final result are
//! delivered as [`TrackingEvent`]s over a channel.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use echotrace_contour::{ContourNormalizer, ContourSource, RejectedWall};
use echotrace_core::{EchoTraceError, FrameSequence, Result, ScaleMarkers, Wall, WallContourSeries};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::point_tracker::PyramidalTracker;
use crate::sequence::{SequenceTracker, TrackCancel, TrackProgress};

/// Everything a run needs.
pub struct TrackingJob {
    pub frames: Box<dyn FrameSequence>,
    pub sources: BTreeMap<Wall, ContourSource>,
    pub normalizer: ContourNormalizer,
}

impl TrackingJob {
    pub fn new(
        frames: impl FrameSequence + 'static,
        sources: BTreeMap<Wall, ContourSource>,
        normalizer: ContourNormalizer,
    ) -> Self {
        Self {
            frames: Box::new(frames),
            sources,
            normalizer,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingOutput {
    /// Per-wall contours, one per frame; ready series included unchanged.
    pub series: WallContourSeries,
    pub scale: ScaleMarkers,
    /// Walls whose source produced no contour.
    pub rejected: Vec<RejectedWall>,
}

/// Notification from a running job.
#[derive(Debug)]
pub enum TrackingEvent {
    /// One more frame pair of a wall is tracked.
    Progress(TrackProgress),
    /// Sent exactly once, last.
    Finished(Result<TrackingOutput>),
}

/// Normalize the job's sources and track the seeds through its frames.
///
/// Input shape errors are reported before frames or seeds are touched.
pub fn run_job(
    tracker: &PyramidalTracker,
    job: TrackingJob,
    cancel: &TrackCancel,
    on_progress: impl FnMut(TrackProgress),
) -> Result<TrackingOutput> {
    ContourNormalizer::validate(&job.sources)?;
    if job.frames.is_empty() {
        return Err(EchoTraceError::MissingFrames);
    }
    if job.sources.is_empty() {
        return Err(EchoTraceError::MissingContours);
    }

    let normalized = job.normalizer.normalize(job.sources)?;
    let mut series = normalized.ready;
    if !normalized.seeds.is_empty() {
        let sequence = SequenceTracker::new(tracker, job.frames.as_ref());
        let tracked = sequence.run(&normalized.seeds, cancel, on_progress)?;
        for (wall, contours) in tracked.into_inner() {
            series.insert(wall, contours);
        }
    } else {
        warn!("no wall produced a seed contour; nothing to track");
    }

    Ok(TrackingOutput {
        series,
        scale: normalized.scale,
        rejected: normalized.rejected,
    })
}

/// Clears the busy flag when a run ends, including by panic.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs one tracking job at a time on a background thread.
#[derive(Debug, Clone)]
pub struct TrackingWorker {
    tracker: Arc<PyramidalTracker>,
    active: Arc<AtomicBool>,
}

impl TrackingWorker {
    pub fn new(tracker: PyramidalTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a run is in progress.
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Start `job` in the background.
    ///
    /// Returns the event stream of the run; `cancel` is checked between frame
    /// pairs. Fails with [`EchoTraceError::WorkerBusy`] while another run is
    /// active.
    pub fn start(&self, job: TrackingJob, cancel: TrackCancel) -> Result<Receiver<TrackingEvent>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EchoTraceError::WorkerBusy);
        }
        let guard = ActiveGuard(Arc::clone(&self.active));
        let (tx, rx) = unbounded();
        let tracker = Arc::clone(&self.tracker);

        thread::Builder::new()
            .name("echotrace-tracking".into())
            .spawn(move || Self::run(guard, &tracker, job, &cancel, tx))
            .map_err(|e| {
                EchoTraceError::Internal(format!("failed to spawn tracking thread: {e}"))
            })?;
        Ok(rx)
    }

    fn run(
        guard: ActiveGuard,
        tracker: &PyramidalTracker,
        job: TrackingJob,
        cancel: &TrackCancel,
        tx: Sender<TrackingEvent>,
    ) {
        info!(walls = job.sources.len(), frames = job.frames.len(), "tracking run started");
        let result = run_job(tracker, job, cancel, |p| {
            let _ = tx.send(TrackingEvent::Progress(p));
        });
        match &result {
            Ok(out) => info!(walls = out.series.len(), "tracking run finished"),
            Err(e) => warn!(error = %e, "tracking run failed"),
        }
        drop(guard);
        let _ = tx.send(TrackingEvent::Finished(result));
    }
}

/// Block until the run behind `events` finishes, forwarding progress.
pub fn wait_for(
    events: &Receiver<TrackingEvent>,
    mut on_progress: impl FnMut(TrackProgress),
) -> Result<TrackingOutput> {
    for event in events {
        match event {
            TrackingEvent::Progress(p) => on_progress(p),
            TrackingEvent::Finished(result) => return result,
        }
    }
    Err(EchoTraceError::Internal(
        "tracking thread ended without a result".into(),
    ))
}
