//! EchoTrace - heart-wall contour tracking from the command line
//!
//! Reads a directory of frames plus one initial contour per wall (a mask, a
//! hand-drawn reference image or a contour file), tracks the contours through
//! the frames and writes one contour file per wall.

mod config;
mod run;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use echotrace_core::Wall;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Overrides};
use crate::run::{RunRequest, WallInput};

#[derive(Parser, Debug)]
#[command(name = "echotrace", about = "Track heart-wall contours through echo frames", version)]
struct Cli {
    /// Directory of frame images, ordered by file name
    #[arg(long, short)]
    frames: PathBuf,

    /// Binary mask of the endocardium region
    #[arg(long)]
    endo_mask: Option<PathBuf>,

    /// Binary mask of the epicardium region
    #[arg(long)]
    epi_mask: Option<PathBuf>,

    /// Image with the endocardium outline drawn in the reference color
    #[arg(long)]
    endo_reference: Option<PathBuf>,

    /// Image with the epicardium outline drawn in the reference color
    #[arg(long)]
    epi_reference: Option<PathBuf>,

    /// Contour file for the endocardium (one line: seed, more: finished series)
    #[arg(long)]
    endo_ready: Option<PathBuf>,

    /// Contour file for the epicardium
    #[arg(long)]
    epi_ready: Option<PathBuf>,

    /// Points per extracted contour
    #[arg(long, short)]
    points: Option<usize>,

    /// Use every N-th frame
    #[arg(long)]
    step: Option<usize>,

    /// JSON run configuration
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output prefix; files are written as <PREFIX>_<wall>.txt
    #[arg(long, short, default_value = "contours")]
    output: PathBuf,

    /// Decimals per written coordinate
    #[arg(long)]
    precision: Option<usize>,

    /// Also dump the full result as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Track the points of a contour on one thread
    #[arg(long)]
    sequential: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            amount_points: self.points,
            step: self.step,
            precision: self.precision,
            sequential: self.sequential,
        }
    }

    fn request(&self) -> RunRequest {
        let walls = BTreeMap::from([
            (
                Wall::Endo,
                WallInput {
                    mask: self.endo_mask.clone(),
                    reference: self.endo_reference.clone(),
                    ready: self.endo_ready.clone(),
                },
            ),
            (
                Wall::Epi,
                WallInput {
                    mask: self.epi_mask.clone(),
                    reference: self.epi_reference.clone(),
                    ready: self.epi_ready.clone(),
                },
            ),
        ]);
        RunRequest {
            frames_dir: self.frames.clone(),
            walls,
            output_prefix: self.output.clone(),
            json: self.json.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("EchoTrace starting...");

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides());

    let report = run::execute(&cli.request(), &config)?;
    info!(
        walls = report.output.series.len(),
        rejected = report.output.rejected.len(),
        sys_id = ?report.sys_id,
        "Tracking complete"
    );
    for path in &report.written {
        info!(path = %path.display(), "Output written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_walls() {
        let cli = Cli::parse_from([
            "echotrace",
            "--frames",
            "frames",
            "--endo-mask",
            "endo.png",
            "--epi-ready",
            "epi.txt",
            "-p",
            "16",
        ]);
        let request = cli.request();
        assert_eq!(request.output_prefix, PathBuf::from("contours"));
        assert_eq!(request.walls[&Wall::Endo].mask, Some(PathBuf::from("endo.png")));
        assert_eq!(request.walls[&Wall::Epi].ready, Some(PathBuf::from("epi.txt")));
        assert_eq!(cli.overrides().amount_points, Some(16));
    }

    #[test]
    fn test_frames_required() {
        assert!(Cli::try_parse_from(["echotrace", "--endo-mask", "m.png"]).is_err());
    }
}
