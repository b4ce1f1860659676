//! Color conversions used to read hand-drawn reference images.

use echotrace_core::{MaskBuffer, Point};
use image::RgbImage;

/// Luminance weights applied by [`rgb_to_gray`](crate::rgb_to_gray).
pub const LUMA_WEIGHTS: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Convert an 8-bit RGB pixel to HSV, every channel in [0, 1].
///
/// Hue is 0 for achromatic pixels. When several channels share the maximum,
/// blue takes precedence over green, and green over red.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f64; 3] {
    let r = rgb[0] as f64 / 255.0;
    let g = rgb[1] as f64 / 255.0;
    let b = rgb[2] as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else {
        let sector = if b == max {
            4.0 + (r - g) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            (g - b) / delta
        };
        (sector / 6.0).rem_euclid(1.0)
    };
    [h, s, max]
}

/// Mask of pixels whose hue lies strictly inside `(lo, hi)`.
pub fn hue_mask(image: &RgbImage, hue_range: (f64, f64)) -> MaskBuffer {
    let (lo, hi) = hue_range;
    MaskBuffer::from_fn(image.width(), image.height(), |x, y| {
        let h = rgb_to_hsv(image.get_pixel(x, y).0)[0];
        h > lo && h < hi
    })
}

/// Coordinates of the pixels exactly matching `color`, in row-major order.
pub fn find_color(image: &RgbImage, color: [u8; 3]) -> Vec<Point> {
    let mut found = Vec::new();
    for (x, y, px) in image.enumerate_pixels() {
        if px.0 == color {
            found.push(Point::new(x as f64, y as f64));
        }
    }
    found
}
