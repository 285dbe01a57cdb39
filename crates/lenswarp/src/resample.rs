//! Separable radial resampling.
//!
//! A plane is remapped through a radius-ratio field with two 1-D linear
//! interpolation passes: first along every row, then along every column of
//! the row-pass output. This approximates a true 2-D radial remap; the pass
//! order is part of the result and must not be swapped.

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::field::ImageCenter;
use crate::interp::{interp1_into, Extrapolation};

/// Resample `plane` through `ratio` around `center`.
///
/// Row `i` is sampled at abscissas `j - cx` (0-based column index `j`) and
/// queried at `(j - cx) * ratio[(i, j)]`; columns use `i - cy` the same way.
/// Returns a plane of the same shape, or [`Error::ShapeMismatch`] when
/// `ratio` and `plane` differ in shape.
pub fn resample(
    plane: &DMatrix<f64>,
    ratio: &DMatrix<f64>,
    center: ImageCenter,
    extrapolation: Extrapolation,
) -> Result<DMatrix<f64>> {
    if plane.shape() != ratio.shape() {
        return Err(Error::ShapeMismatch {
            planes: plane.shape(),
            raster: ratio.shape(),
        });
    }
    if plane.is_empty() {
        return Ok(plane.clone());
    }
    let rows_done = row_pass(plane, ratio, center.cx, extrapolation);
    Ok(column_pass(&rows_done, ratio, center.cy, extrapolation))
}

fn row_pass(
    plane: &DMatrix<f64>,
    ratio: &DMatrix<f64>,
    cx: f64,
    extrapolation: Extrapolation,
) -> DMatrix<f64> {
    let (h, w) = plane.shape();
    let xi = centered_axis(w, cx);
    let mut out = DMatrix::zeros(h, w);
    let mut values = vec![0.0; w];
    let mut queries = vec![0.0; w];
    let mut result = vec![0.0; w];

    for i in 0..h {
        for j in 0..w {
            values[j] = plane[(i, j)];
            queries[j] = xi[j] * ratio[(i, j)];
        }
        interp1_into(&xi, &values, &queries, extrapolation, &mut result);
        for (j, v) in result.iter().enumerate() {
            out[(i, j)] = *v;
        }
    }
    out
}

fn column_pass(
    plane: &DMatrix<f64>,
    ratio: &DMatrix<f64>,
    cy: f64,
    extrapolation: Extrapolation,
) -> DMatrix<f64> {
    let (h, w) = plane.shape();
    let yi = centered_axis(h, cy);
    let mut out = DMatrix::zeros(h, w);
    let mut values = vec![0.0; h];
    let mut queries = vec![0.0; h];
    let mut result = vec![0.0; h];

    for j in 0..w {
        for i in 0..h {
            values[i] = plane[(i, j)];
            queries[i] = yi[i] * ratio[(i, j)];
        }
        interp1_into(&yi, &values, &queries, extrapolation, &mut result);
        for (i, v) in result.iter().enumerate() {
            out[(i, j)] = *v;
        }
    }
    out
}

/// `k - center` for `k = 0..n`; strictly increasing by construction.
fn centered_axis(n: usize, center: f64) -> Vec<f64> {
    (0..n).map(|k| k as f64 - center).collect()
}
