//! Resampling of the outline into a fixed number of ordered points.

use std::f64::consts::TAU;

use echotrace_core::{Contour, EchoTraceError, Point, Polar, Result};

use crate::landmarks::{Landmarks, ReferenceFrame};

/// `num` evenly spaced indices into a sequence of length `len`, floored.
///
/// The first index is 0 and the last is `len - 1`.
pub fn linspace_indices(len: usize, num: usize) -> Vec<usize> {
    match (len, num) {
        (0, _) | (_, 0) => Vec::new(),
        (_, 1) => vec![0],
        _ => {
            let step = (len - 1) as f64 / (num - 1) as f64;
            let mut idx: Vec<usize> = (0..num).map(|i| (i as f64 * step) as usize).collect();
            idx[num - 1] = len - 1;
            idx
        }
    }
}

fn sample(arc: &[Polar], num: usize, what: &str) -> Result<Vec<Polar>> {
    if arc.len() < num {
        return Err(EchoTraceError::InvalidMask(format!(
            "{what} has {} outline pixels, {num} distinct samples needed",
            arc.len()
        )));
    }
    Ok(linspace_indices(arc.len(), num)
        .into_iter()
        .map(|i| arc[i])
        .collect())
}

/// Shift angles at or past `hi` down one turn so the retained arc is contiguous.
#[inline]
fn unwrap(mut p: Polar, hi: f64) -> Polar {
    if p.phi >= hi {
        p.phi -= TAU;
    }
    p
}

/// Resample `outline` into `amount_points` ordered points anchored on the
/// landmarks.
///
/// Only the arc running through the apex between the two base corners is
/// kept. Odd counts place the apex exactly in the middle; even counts sample
/// the whole arc evenly.
pub fn resample_outline(
    outline: &[Point],
    landmarks: &Landmarks,
    frame: &ReferenceFrame,
    amount_points: usize,
) -> Result<Contour> {
    let center = frame.to_reference(landmarks.centroid);
    let polar_of = |p: Point| Polar::from_point(frame.to_reference(p), center);

    let left_base = polar_of(landmarks.base_left);
    let right_base = polar_of(landmarks.base_right);
    let lo = left_base.phi.min(right_base.phi);
    let hi = left_base.phi.max(right_base.phi);

    let mut arc: Vec<Polar> = outline
        .iter()
        .map(|p| polar_of(*p))
        .filter(|p| p.phi <= lo || p.phi >= hi)
        .map(|p| unwrap(p, hi))
        .collect();
    arc.sort_by(|a, b| a.phi.total_cmp(&b.phi));

    let selected = if amount_points % 2 == 1 {
        let apex = unwrap(polar_of(landmarks.apex), hi);
        let half = amount_points / 2 + 1;
        let first: Vec<Polar> = arc.iter().copied().filter(|p| p.phi <= apex.phi).collect();
        let second: Vec<Polar> = arc.iter().copied().filter(|p| p.phi >= apex.phi).collect();
        let first = sample(&first, half, "arc before the apex")?;
        let second = sample(&second, half, "arc after the apex")?;

        let mut out = Vec::with_capacity(amount_points);
        out.push(left_base);
        out.extend_from_slice(&first[1..half - 1]);
        out.push(apex);
        out.extend_from_slice(&second[1..half - 1]);
        out.push(right_base);
        out
    } else {
        sample(&arc, amount_points, "outline arc")?
    };

    Ok(selected
        .into_iter()
        .map(|p| frame.to_pixels(p.to_point(center)).round())
        .collect())
}
