//! Coordinate grids, radius fields and radius-ratio fields.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Radial center of a raster in the 1-based grid frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageCenter {
    pub cx: f64,
    pub cy: f64,
}

impl ImageCenter {
    /// Center of a `width x height` raster: `(width/2 + 0.5, height/2 + 0.5)`
    /// with integer halving of the dimensions.
    pub fn of(width: usize, height: usize) -> Self {
        Self {
            cx: (width / 2) as f64 + 0.5,
            cy: (height / 2) as f64 + 0.5,
        }
    }
}

/// Arithmetic sequence `start, start + step, ...` up to and including `end`.
///
/// Empty when `start > end` or `step` is not positive.
pub fn regspace(start: f64, step: f64, end: f64) -> Vec<f64> {
    if !(start <= end) || !(step > 0.0) {
        return Vec::new();
    }
    let n = ((end - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|k| start + k as f64 * step).collect()
}

/// Outer product of a horizontal and a vertical coordinate sequence.
///
/// Both matrices have shape `(ys.len(), xs.len())` with `X[(i, j)] = xs[j]`
/// and `Y[(i, j)] = ys[i]`.
pub fn meshgrid(xs: &[f64], ys: &[f64]) -> (DMatrix<f64>, DMatrix<f64>) {
    let x = DMatrix::from_fn(ys.len(), xs.len(), |_, j| xs[j]);
    let y = DMatrix::from_fn(ys.len(), xs.len(), |i, _| ys[i]);
    (x, y)
}

/// Full-image 1-based grid: columns `1..=width`, rows `1..=height`.
pub fn pixel_grid(width: usize, height: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let xs: Vec<f64> = (1..=width).map(|v| v as f64).collect();
    let ys: Vec<f64> = (1..=height).map(|v| v as f64).collect();
    meshgrid(&xs, &ys)
}

/// Elementwise Euclidean distance of grid points from `center`.
pub fn radius(x: &DMatrix<f64>, y: &DMatrix<f64>, center: ImageCenter) -> DMatrix<f64> {
    debug_assert_eq!(x.shape(), y.shape());
    x.zip_map(y, |xv, yv| {
        let dx = xv - center.cx;
        let dy = yv - center.cy;
        (dx * dx + dy * dy).sqrt()
    })
}

/// Per-pixel radial scale factor `mapped / r`.
///
/// Cells where `r == 0` or the quotient is not finite get ratio `1.0`, so
/// the exact center passes through unchanged.
pub fn ratio_field(r: &DMatrix<f64>, mapped: &DMatrix<f64>) -> DMatrix<f64> {
    debug_assert_eq!(r.shape(), mapped.shape());
    r.zip_map(mapped, radius_ratio)
}

pub(crate) fn radius_ratio(r: f64, mapped: f64) -> f64 {
    if r == 0.0 {
        return 1.0;
    }
    let q = mapped / r;
    if q.is_finite() {
        q
    } else {
        1.0
    }
}
