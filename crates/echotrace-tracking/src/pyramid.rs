//! Gaussian image pyramids for coarse-to-fine tracking.

use echotrace_core::GrayImage;
use smallvec::SmallVec;

/// Standard smoothing before a 2x reduction, `2 * downscale / 6`.
pub const DEFAULT_SIGMA: f64 = 2.0 / 3.0;

/// Kernel extent in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Index into `0..n` with half-sample symmetric reflection (`dcba|abcd|dcba`).
#[inline]
fn reflect(i: i64, n: i64) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m >= n { period - 1 - m } else { m }) as usize
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as i64;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-(x * x) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur with reflected borders.
pub fn gaussian_blur(img: &GrayImage, sigma: f64) -> GrayImage {
    if img.is_empty() || sigma <= 0.0 {
        return img.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (img.width as i64, img.height as i64);

    let mut horiz = vec![0.0f64; img.data.len()];
    for y in 0..h {
        let row = img.row(y as u32);
        for x in 0..w {
            horiz[(y * w + x) as usize] = kernel
                .iter()
                .enumerate()
                .map(|(k, wk)| wk * row[reflect(x + k as i64 - radius, w)] as f64)
                .sum();
        }
    }

    let mut out = GrayImage::new(img.width, img.height);
    for y in 0..h {
        for x in 0..w {
            let v: f64 = kernel
                .iter()
                .enumerate()
                .map(|(k, wk)| {
                    let row = reflect(y + k as i64 - radius, h);
                    wk * horiz[row * w as usize + x as usize]
                })
                .sum();
            out.data[(y * w + x) as usize] = v as f32;
        }
    }
    out
}

/// Bilinear resize with pixel-centre alignment.
pub fn resize_bilinear(img: &GrayImage, width: u32, height: u32) -> GrayImage {
    if img.is_empty() || width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }
    let sx = img.width as f64 / width as f64;
    let sy = img.height as f64 / height as f64;
    let max_x = (img.width - 1) as f64;
    let max_y = (img.height - 1) as f64;

    GrayImage::from_fn(width, height, |x, y| {
        let fx = ((x as f64 + 0.5) * sx - 0.5).clamp(0.0, max_x);
        let fy = ((y as f64 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        let (x0, y0) = (fx.floor() as i32, fy.floor() as i32);
        let (tx, ty) = ((fx - x0 as f64) as f32, (fy - y0 as f64) as f32);
        let top = img.get(x0, y0) * (1.0 - tx) + img.get(x0 + 1, y0) * tx;
        let bottom = img.get(x0, y0 + 1) * (1.0 - tx) + img.get(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    })
}

/// Blur and halve, rounding odd sizes up.
pub fn downsample(img: &GrayImage, sigma: f64) -> GrayImage {
    let blurred = gaussian_blur(img, sigma);
    resize_bilinear(&blurred, img.width.div_ceil(2), img.height.div_ceil(2))
}

/// Multi-scale image pyramid; level 0 is the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePyramid {
    levels: SmallVec<[GrayImage; 2]>,
}

impl ImagePyramid {
    /// Build `num_levels` levels (at least one).
    pub fn build(gray: &GrayImage, num_levels: usize, sigma: f64) -> Self {
        let mut levels: SmallVec<[GrayImage; 2]> = SmallVec::new();
        levels.push(gray.clone());
        for _ in 1..num_levels {
            let Some(prev) = levels.last() else { break };
            let next = downsample(prev, sigma);
            levels.push(next);
        }
        Self { levels }
    }

    pub fn levels(&self) -> &[GrayImage] {
        &self.levels
    }

    /// Image at `level`, 0 being full resolution.
    pub fn level(&self, level: usize) -> Option<&GrayImage> {
        self.levels.get(level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
