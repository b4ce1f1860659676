//! Run configuration: an optional JSON file, then command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use echotrace_contour::{LandmarkParams, ReferenceColors};
use echotrace_tracking::TrackerParams;
use serde::{Deserialize, Serialize};

/// Settings of one tracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Points per contour extracted from masks and reference images.
    pub amount_points: usize,
    /// Use every `step`-th frame of the directory.
    pub step: usize,
    /// Decimals per coordinate in written contour files.
    pub output_precision: usize,
    pub tracker: TrackerParams,
    pub landmarks: LandmarkParams,
    pub reference: ReferenceColors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            amount_points: 20,
            step: 1,
            output_precision: 0,
            tracker: TrackerParams::default(),
            landmarks: LandmarkParams::default(),
            reference: ReferenceColors::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults, or the file at `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(n) = overrides.amount_points {
            self.amount_points = n;
        }
        if let Some(step) = overrides.step {
            self.step = step;
        }
        if let Some(precision) = overrides.precision {
            self.output_precision = precision;
        }
        if overrides.sequential {
            self.tracker.parallel = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.amount_points >= 3,
            "amount_points must be at least 3, got {}",
            self.amount_points
        );
        anyhow::ensure!(self.step >= 1, "step must be at least 1");
        self.tracker.validate()?;
        Ok(())
    }
}

/// Values given on the command line, applied over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub amount_points: Option<usize>,
    pub step: Option<usize>,
    pub precision: Option<usize>,
    pub sequential: bool,
}
