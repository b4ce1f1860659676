//! One command-line tracking run: gather inputs, track, write results.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use echotrace_contour::{ContourNormalizer, ContourSource};
use echotrace_core::{ScaleMarkers, Wall};
use echotrace_media::{
    list_frames, load_mask, systole_index, wall_file_path, ContourFile, FileFrames,
};
use echotrace_tracking::{
    wait_for, PyramidalTracker, TrackCancel, TrackingJob, TrackingOutput, TrackingWorker,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Where one wall's initial contour is read from. At most one field is set.
#[derive(Debug, Clone, Default)]
pub struct WallInput {
    pub mask: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub ready: Option<PathBuf>,
}

impl WallInput {
    fn is_empty(&self) -> bool {
        self.mask.is_none() && self.reference.is_none() && self.ready.is_none()
    }
}

/// Inputs and outputs of a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub frames_dir: PathBuf,
    pub walls: BTreeMap<Wall, WallInput>,
    pub output_prefix: PathBuf,
    pub json: Option<PathBuf>,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub output: TrackingOutput,
    pub sys_id: Option<usize>,
    pub written: Vec<PathBuf>,
}

/// Contour sources of a run plus what the ready file headers carried.
#[derive(Debug)]
pub struct LoadedSources {
    pub sources: BTreeMap<Wall, ContourSource>,
    /// First scale pair found in a ready file header.
    pub scale: ScaleMarkers,
    /// First systole index found in a ready file header.
    pub sys_id: Option<usize>,
}

/// Turn the per-wall file arguments into contour sources.
///
/// Ready files carrying a single contour become a tracking seed; longer files
/// are passed through as finished series.
pub fn load_sources(walls: &BTreeMap<Wall, WallInput>) -> Result<LoadedSources> {
    let mut sources = BTreeMap::new();
    let mut scale = ScaleMarkers::ABSENT;
    let mut sys_id = None;
    for (wall, input) in walls {
        if input.is_empty() {
            continue;
        }
        let given = [&input.mask, &input.reference, &input.ready]
            .iter()
            .filter(|p| p.is_some())
            .count();
        if given > 1 {
            bail!("{wall}: give only one of mask, reference or ready contours");
        }

        let source = if let Some(path) = &input.mask {
            let mask =
                load_mask(path).with_context(|| format!("{wall} mask {}", path.display()))?;
            ContourSource::Mask(mask)
        } else if let Some(path) = &input.reference {
            ContourSource::Reference(path.clone())
        } else if let Some(path) = &input.ready {
            let file = ContourFile::read(path)
                .with_context(|| format!("{wall} contours {}", path.display()))?;
            if !scale.is_present() && file.scale.is_present() {
                scale = file.scale;
            }
            sys_id = sys_id.or(file.sys_id);
            let mut contours = file.contours;
            match contours.len() {
                0 => bail!("{wall}: {} holds no contours", path.display()),
                1 => ContourSource::Points(contours.remove(0).into_points()),
                _ => ContourSource::Series(contours),
            }
        } else {
            continue;
        };
        debug!(wall = %wall, "loaded contour source");
        sources.insert(*wall, source);
    }
    Ok(LoadedSources {
        sources,
        scale,
        sys_id,
    })
}

/// Every `step`-th frame, starting with the first.
pub fn select_frames(paths: &[PathBuf], step: usize) -> Vec<PathBuf> {
    paths.iter().step_by(step.max(1)).cloned().collect()
}

/// Write one contour file per tracked wall.
pub fn write_contour_files(
    output: &TrackingOutput,
    prefix: &Path,
    sys_id: Option<usize>,
    precision: usize,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (wall, contours) in output.series.iter() {
        let path = wall_file_path(prefix, wall);
        ContourFile::new(sys_id, output.scale, contours.to_vec())
            .write(&path, precision)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_json(output: &TrackingOutput, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "Wrote JSON result");
    Ok(())
}

/// Track the requested walls through the frame directory and write results.
pub fn execute(request: &RunRequest, config: &AppConfig) -> Result<RunReport> {
    config.validate()?;

    let all_frames = list_frames(&request.frames_dir)
        .with_context(|| format!("listing frames in {}", request.frames_dir.display()))?;
    let frames = select_frames(&all_frames, config.step);
    let loaded = load_sources(&request.walls)?;
    // A ready file header wins over the frame names.
    let sys_id = loaded
        .sys_id
        .or_else(|| systole_index(&all_frames, config.step));
    info!(
        frames = frames.len(),
        step = config.step,
        sys_id = ?sys_id,
        "Frame sequence ready"
    );

    let normalizer =
        ContourNormalizer::new(config.amount_points, config.landmarks, config.reference);
    let job = TrackingJob::new(FileFrames::new(frames), loaded.sources, normalizer);

    let worker = TrackingWorker::new(PyramidalTracker::new(config.tracker)?);
    let events = worker.start(job, TrackCancel::new())?;
    let mut output = wait_for(&events, |p| {
        debug!(wall = %p.wall, frame = p.frame, done = p.fraction(), "tracking progress");
        if p.frame == p.total {
            info!(wall = %p.wall, frames = p.total + 1, "Wall tracked");
        }
    })?;

    for rejected in &output.rejected {
        warn!(wall = %rejected.wall, reason = %rejected.reason, "Wall skipped");
    }
    if output.series.is_empty() {
        bail!("no wall produced a contour series");
    }
    if !output.scale.is_present() {
        output.scale = loaded.scale;
    }

    let mut written =
        write_contour_files(&output, &request.output_prefix, sys_id, config.output_precision)?;
    if let Some(json) = &request.json {
        write_json(&output, json)?;
        written.push(json.clone());
    }

    Ok(RunReport {
        output,
        sys_id,
        written,
    })
}
