//! Plain-text contour files, one per wall.
//!
//! ```text
//! sys_id y0 x0 y1 x1
//! y x y x y x ...      <- frame 0
//! y x y x y x ...      <- frame 1
//! ```
//!
//! The header carries the systole frame index and the scale ruler endpoints
//! (`-1` when unknown). Coordinates are written row first.

use echotrace_core::{Contour, EchoTraceError, Point, Result, ScaleMarkers, Wall};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Contents of one wall's contour file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourFile {
    /// 1-based systole frame index.
    pub sys_id: Option<usize>,
    pub scale: ScaleMarkers,
    pub contours: Vec<Contour>,
}

impl ContourFile {
    pub fn new(sys_id: Option<usize>, scale: ScaleMarkers, contours: Vec<Contour>) -> Self {
        Self {
            sys_id,
            scale,
            contours,
        }
    }

    /// Parse file contents. A first line that is not five integers is read
    /// as contour data.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().peekable();
        let mut file = Self::default();

        if let Some(first) = lines.peek() {
            if let Some((sys_id, scale)) = parse_header(first) {
                file.sys_id = sys_id;
                file.scale = scale;
                lines.next();
            }
        }

        for (n, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            file.contours.push(parse_contour_line(line).map_err(|e| {
                EchoTraceError::Serialization(format!("contour line {}: {}", n + 1, e))
            })?);
        }
        Ok(file)
    }

    /// Render the file with `precision` decimals per coordinate.
    pub fn to_text(&self, precision: usize) -> String {
        let mut out = String::new();
        let sys_id = self.sys_id.map(|s| s as i64).unwrap_or(-1);
        let (start, end) = if self.scale.is_present() {
            (self.scale.start, self.scale.end)
        } else {
            (ScaleMarkers::ABSENT_POINT, ScaleMarkers::ABSENT_POINT)
        };
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            sys_id, start.y as i64, start.x as i64, end.y as i64, end.x as i64
        );
        for contour in &self.contours {
            let line = contour
                .iter()
                .map(|p| format!("{:.*} {:.*}", precision, p.y, precision, p.x))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P, precision: usize) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_text(precision))?;
        info!(
            path = %path.as_ref().display(),
            contours = self.contours.len(),
            "Wrote contour file"
        );
        Ok(())
    }

    /// First contour, used as a tracking seed.
    pub fn seed(&self) -> Option<&Contour> {
        self.contours.first()
    }
}

/// `{prefix}_{wall}.txt`
pub fn wall_file_path<P: AsRef<Path>>(prefix: P, wall: Wall) -> PathBuf {
    let mut name = prefix.as_ref().as_os_str().to_owned();
    name.push(format!("_{wall}.txt"));
    PathBuf::from(name)
}

fn parse_header(line: &str) -> Option<(Option<usize>, ScaleMarkers)> {
    let fields: Vec<i64> = line
        .split_whitespace()
        .map(|t| t.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [sys_id, y0, x0, y1, x1] = fields.as_slice() else {
        return None;
    };
    let sys_id = usize::try_from(*sys_id).ok();
    let scale = ScaleMarkers::new(
        Point::new(*x0 as f64, *y0 as f64),
        Point::new(*x1 as f64, *y1 as f64),
    );
    let scale = if scale.is_present() {
        scale
    } else {
        ScaleMarkers::ABSENT
    };
    Some((sys_id, scale))
}

fn parse_contour_line(line: &str) -> std::result::Result<Contour, String> {
    let values = line
        .split_whitespace()
        .map(|t| t.parse::<f64>().map_err(|e| format!("'{t}': {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if values.len() % 2 != 0 {
        return Err(format!("odd number of coordinates ({})", values.len()));
    }
    Ok(values
        .chunks_exact(2)
        .map(|yx| Point::new(yx[1], yx[0]))
        .collect())
}
