//! In-memory single-channel images: intensity frames and binary masks.

use crate::error::{EchoTraceError, Result};
use crate::geometry::Point;

/// A grayscale image stored as f32 intensities in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl GrayImage {
    /// Black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0.0; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Image with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            data: vec![value; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Wrap existing row-major data.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(EchoTraceError::InvalidInput(format!(
                "gray image data has {} values, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut img = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.data[(y as usize) * (width as usize) + x as usize] = f(x, y);
            }
        }
        img
    }

    /// Value at (x, y); coordinates are clamped to the image.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[y * self.width as usize + x]
    }

    /// Value at (x, y), `None` outside the image.
    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<f32> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: f32) {
        if x < self.width && y < self.height {
            self.data[(y as usize) * (self.width as usize) + x as usize] = val;
        }
    }

    /// One row of pixels.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single-channel mask buffer (one byte per pixel, 0 = background).
///
/// Any non-zero byte counts as foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MaskBuffer {
    /// Create a new empty mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize)],
        }
    }

    /// Wrap existing row-major bytes without checking the length.
    ///
    /// The normalizer validates the length before extraction.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Mask of pixels for which `f(x, y)` is true.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.set(x, y, 255);
                }
            }
        }
        mask
    }

    /// Filled disc, the usual synthetic chamber outline.
    pub fn disc(width: u32, height: u32, center: Point, radius: f64) -> Self {
        Self::from_fn(width, height, |x, y| {
            (Point::new(x as f64, y as f64) - center).length() <= radius
        })
    }

    /// Whether the byte count matches the declared size.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }

    /// Get the mask value at (x, y). Returns 0 if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Foreground test with signed coordinates; outside the mask is background.
    #[inline]
    pub fn is_foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)] != 0
    }

    /// Set the mask value at (x, y).
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.data[(y as usize) * (self.width as usize) + (x as usize)] = value;
        }
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}
