//! Boundary extraction from a filled mask.

use echotrace_core::{MaskBuffer, Point};

/// Whether the foreground pixel at (x, y) has a background 4-neighbour.
///
/// Pixels outside the mask count as background.
#[inline]
fn is_edge(mask: &MaskBuffer, x: i64, y: i64) -> bool {
    !(mask.is_foreground(x + 1, y)
        && mask.is_foreground(x - 1, y)
        && mask.is_foreground(x, y + 1)
        && mask.is_foreground(x, y - 1))
}

/// Boundary pixels of the filled region, enumerated in row-major order.
///
/// A foreground pixel is kept unless all four axis neighbours are also
/// foreground, which thins a filled region to a one pixel outline.
pub fn boundary_pixels(mask: &MaskBuffer) -> Vec<Point> {
    let mut out = Vec::new();
    for y in 0..mask.height as i64 {
        for x in 0..mask.width as i64 {
            if mask.is_foreground(x, y) && is_edge(mask, x, y) {
                out.push(Point::new(x as f64, y as f64));
            }
        }
    }
    out
}
