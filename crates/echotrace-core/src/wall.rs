//! Wall identifiers and per-wall contour series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::EchoTraceError;
use crate::geometry::Contour;

/// One of the anatomical boundaries being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    /// Endocardium (inner wall).
    Endo,
    /// Epicardium (outer wall).
    Epi,
}

impl Wall {
    pub const ALL: [Wall; 2] = [Wall::Endo, Wall::Epi];

    /// Short lowercase name used in file names and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Endo => "endo",
            Self::Epi => "epi",
        }
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Wall {
    type Err = EchoTraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "endo" => Ok(Self::Endo),
            "epi" => Ok(Self::Epi),
            other => Err(EchoTraceError::InvalidInput(format!(
                "unknown wall '{other}'"
            ))),
        }
    }
}

/// Contours for every wall, one per frame.
///
/// Index 0 of each series is the seed contour; index `k` is the contour on
/// frame `k`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallContourSeries {
    walls: BTreeMap<Wall, Vec<Contour>>,
}

impl WallContourSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the full series of one wall, replacing any previous one.
    pub fn insert(&mut self, wall: Wall, series: Vec<Contour>) {
        self.walls.insert(wall, series);
    }

    pub fn get(&self, wall: Wall) -> Option<&[Contour]> {
        self.walls.get(&wall).map(Vec::as_slice)
    }

    pub fn contains(&self, wall: Wall) -> bool {
        self.walls.contains_key(&wall)
    }

    /// Walls present, in a stable order.
    pub fn walls(&self) -> impl Iterator<Item = Wall> + '_ {
        self.walls.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Wall, &[Contour])> {
        self.walls.iter().map(|(w, s)| (*w, s.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<Wall, Vec<Contour>> {
        self.walls
    }
}

impl FromIterator<(Wall, Vec<Contour>)> for WallContourSeries {
    fn from_iter<I: IntoIterator<Item = (Wall, Vec<Contour>)>>(iter: I) -> Self {
        Self {
            walls: iter.into_iter().collect(),
        }
    }
}
