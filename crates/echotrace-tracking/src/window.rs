//! Fixed-size matching windows.

use echotrace_core::{GrayImage, Point};

/// A square patch of an image, zero where it leaves the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    size: usize,
    data: Vec<f64>,
}

impl Window {
    /// Cut a `size`x`size` window centred on `center`.
    ///
    /// The centre is rounded half-to-even. Rows and columns outside the
    /// image stay zero, so the window always has the full size.
    pub fn extract(image: &GrayImage, center: Point, size: usize) -> Self {
        let half = (size / 2) as i64;
        let x0 = center.x.round_ties_even() as i64 - half;
        let y0 = center.y.round_ties_even() as i64 - half;
        let mut data = vec![0.0; size * size];
        for wy in 0..size {
            let y = y0 + wy as i64;
            if y < 0 || y >= image.height as i64 {
                continue;
            }
            for wx in 0..size {
                if let Some(v) = image.get_checked(x0 + wx as i64, y) {
                    data[wy * size + wx] = v as f64;
                }
            }
        }
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.size + x]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Spatial gradient `(d/dx, d/dy)`: central differences inside,
    /// one-sided differences on the window border.
    pub fn gradient(&self) -> (Vec<f64>, Vec<f64>) {
        let n = self.size;
        let mut gx = vec![0.0; n * n];
        let mut gy = vec![0.0; n * n];
        if n < 2 {
            return (gx, gy);
        }
        for y in 0..n {
            for x in 0..n {
                gx[y * n + x] = match x {
                    0 => self.get(1, y) - self.get(0, y),
                    _ if x == n - 1 => self.get(x, y) - self.get(x - 1, y),
                    _ => (self.get(x + 1, y) - self.get(x - 1, y)) * 0.5,
                };
                gy[y * n + x] = match y {
                    0 => self.get(x, 1) - self.get(x, 0),
                    _ if y == n - 1 => self.get(x, y) - self.get(x, y - 1),
                    _ => (self.get(x, y + 1) - self.get(x, y - 1)) * 0.5,
                };
            }
        }
        (gx, gy)
    }
}
