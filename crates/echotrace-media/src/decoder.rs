//! Frame decoding from image files.

use crate::color::LUMA_WEIGHTS;
use echotrace_core::{EchoTraceError, FrameSequence, GrayImage, MaskBuffer, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extensions accepted as frames.
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn decode_error(path: &Path, err: image::ImageError) -> EchoTraceError {
    match err {
        image::ImageError::IoError(e) => EchoTraceError::Io(e),
        other => EchoTraceError::Decoder(format!("{}: {}", path.display(), other)),
    }
}

/// Decode an image file as 8-bit RGB (alpha is dropped).
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| decode_error(path, e))?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "Decoded frame");
    Ok(img.to_rgb8())
}

/// Decode an image file as a gray intensity image in [0, 1].
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let rgb = load_rgb(path)?;
    Ok(rgb_to_gray(rgb.as_raw(), rgb.width(), rgb.height()))
}

/// Decode an image file as a binary mask; non-zero luma is foreground.
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<MaskBuffer> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| decode_error(path, e))?;
    let luma = img.to_luma8();
    let (w, h) = luma.dimensions();
    Ok(MaskBuffer::from_raw(w, h, luma.into_raw()))
}

/// Convert packed RGB u8 data to a grayscale image.
pub fn rgb_to_gray(rgb: &[u8], w: u32, h: u32) -> GrayImage {
    let size = (w as usize) * (h as usize);
    let mut gray = GrayImage::new(w, h);
    for i in 0..size {
        let idx = i * 3;
        if idx + 2 < rgb.len() {
            gray.data[i] = (LUMA_WEIGHTS[0] * rgb[idx] as f32
                + LUMA_WEIGHTS[1] * rgb[idx + 1] as f32
                + LUMA_WEIGHTS[2] * rgb[idx + 2] as f32)
                / 255.0;
        }
    }
    gray
}

/// Stem suffixes of hand-drawn reference images kept next to the frames.
const REFERENCE_SUFFIXES: &[&str] = &["_endo", "_epi"];

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Frame number formed by the digits of the file stem; `None` sorts last.
pub fn frame_number(path: &Path) -> Option<u128> {
    let digits: String = file_stem(path).chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Image files of `dir` ordered by frame number, then file name.
///
/// Reference images (`*_endo`, `*_epi`) are not frames and are skipped.
pub fn list_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        let is_reference = REFERENCE_SUFFIXES
            .iter()
            .any(|suffix| file_stem(&path).ends_with(suffix));
        if is_image && !is_reference && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| {
        let (na, nb) = (frame_number(a), frame_number(b));
        let by_number = match (na, nb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_number.then_with(|| a.file_name().cmp(&b.file_name()))
    });
    info!(dir = %dir.as_ref().display(), frames = frames.len(), "Listed frames");
    Ok(frames)
}

/// 1-based index of the systole frame, snapped to the sampling grid.
///
/// The systole frame is the first one whose file stem ends with `s`.
pub fn systole_index(frames: &[PathBuf], step: usize) -> Option<usize> {
    let step = step.max(1);
    let index = frames.iter().position(|p| file_stem(p).ends_with('s'))?;
    let left = step * (index / step);
    let right = left + step;
    let snapped = if index - left <= right - index { left } else { right };
    Some(snapped + 1)
}

/// Frames read lazily from image files.
#[derive(Debug, Clone, Default)]
pub struct FileFrames {
    paths: Vec<PathBuf>,
}

impl FileFrames {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// All frames of a directory, sorted by file name.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Ok(Self::new(list_frames(dir)?))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSequence for FileFrames {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> Result<GrayImage> {
        let path = self.paths.get(index).ok_or_else(|| {
            EchoTraceError::InvalidParameter(format!(
                "frame {} out of range (0-{})",
                index,
                self.paths.len().saturating_sub(1)
            ))
        })?;
        load_gray(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_rgb_to_gray() {
        let rgb = [255, 255, 255, 0, 0, 0];
        let gray = rgb_to_gray(&rgb, 2, 1);
        assert!((gray.data[0] - 1.0).abs() < 1e-4);
        assert_eq!(gray.data[1], 0.0);
    }

    #[test]
    fn test_load_gray_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let img = RgbImage::from_pixel(5, 4, Rgb([0, 255, 0]));
        img.save(&path).unwrap();

        let gray = load_gray(&path).unwrap();
        assert_eq!((gray.width, gray.height), (5, 4));
        assert!((gray.data[0] - LUMA_WEIGHTS[1]).abs() < 1e-4);
    }

    #[test]
    fn test_load_mask_nonzero_is_foreground() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let mut img = image::GrayImage::new(4, 4);
        img.put_pixel(1, 2, Luma([1]));
        img.save(&path).unwrap();

        let mask = load_mask(&path).unwrap();
        assert_eq!(mask.foreground_count(), 1);
        assert!(mask.is_foreground(1, 2));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_gray("/nonexistent/frame.png").unwrap_err();
        assert!(matches!(err, EchoTraceError::Io(_)));
    }

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "c.bmp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png", "c.bmp"]);
    }

    #[test]
    fn test_list_frames_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10.png", "2.png", "3s.png", "1.png", "cover.png", "patient_endo.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["1.png", "2.png", "3s.png", "10.png", "cover.png"]);
        assert_eq!(systole_index(&frames, 1), Some(3));
    }

    #[test]
    fn test_frame_number() {
        assert_eq!(frame_number(Path::new("dir7/img_012s.png")), Some(12));
        assert_eq!(frame_number(Path::new("a1b2.bmp")), Some(12));
        assert_eq!(frame_number(Path::new("cover.png")), None);
    }

    #[test]
    fn test_systole_index_snaps_to_step() {
        let frames: Vec<PathBuf> = ["1", "2", "3", "4s", "5", "6"]
            .iter()
            .map(|s| PathBuf::from(format!("{s}.png")))
            .collect();
        assert_eq!(systole_index(&frames, 1), Some(4));
        // index 3 with step 2: left 2, right 4, tie goes left
        assert_eq!(systole_index(&frames, 2), Some(3));
        assert_eq!(systole_index(&frames[..3], 1), None);
    }

    #[test]
    fn test_file_frames_out_of_range() {
        let frames = FileFrames::new(vec![]);
        assert!(frames.is_empty());
        assert!(frames.load(0).is_err());
    }
}
