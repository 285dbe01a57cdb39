//! Piecewise-linear 1-D interpolation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Behavior for query points outside the sampled abscissa range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Hold the nearest boundary sample.
    #[default]
    Clamp,
    /// Extend the first or last segment.
    Linear,
    /// Return a fixed fill value.
    Constant(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpError {
    #[error("abscissa/ordinate length mismatch: {xs} vs {ys}")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("no samples to interpolate")]
    Empty,
    #[error("abscissas must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
}

/// Interpolate samples `(xs, ys)` at every query point.
///
/// `xs` must be strictly increasing. Inside the range the value is
/// `y0 + t·(y1 - y0)` where `t` is the fractional position in the segment,
/// so a flat segment reproduces its value exactly.
pub fn interp1(
    xs: &[f64],
    ys: &[f64],
    queries: &[f64],
    extrapolation: Extrapolation,
) -> Result<Vec<f64>, InterpError> {
    check_samples(xs, ys)?;
    let mut out = vec![0.0; queries.len()];
    interp1_into(xs, ys, queries, extrapolation, &mut out);
    Ok(out)
}

pub(crate) fn check_samples(xs: &[f64], ys: &[f64]) -> Result<(), InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.is_empty() {
        return Err(InterpError::Empty);
    }
    if let Some(index) = xs.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(InterpError::NotIncreasing { index: index + 1 });
    }
    Ok(())
}

/// Unchecked core of [`interp1`]; samples must already satisfy
/// [`check_samples`].
pub(crate) fn interp1_into(
    xs: &[f64],
    ys: &[f64],
    queries: &[f64],
    extrapolation: Extrapolation,
    out: &mut [f64],
) {
    debug_assert_eq!(queries.len(), out.len());
    let n = xs.len();
    let (x_first, x_last) = (xs[0], xs[n - 1]);

    for (q, o) in queries.iter().zip(out.iter_mut()) {
        let q = *q;
        *o = if q.is_nan() {
            f64::NAN
        } else if q < x_first || q > x_last {
            extrapolate(xs, ys, q, extrapolation)
        } else if n == 1 {
            ys[0]
        } else {
            // First index with xs[k] > q; the segment is [k-1, k].
            let k = xs.partition_point(|&x| x <= q).clamp(1, n - 1);
            lerp(xs[k - 1], ys[k - 1], xs[k], ys[k], q)
        };
    }
}

fn extrapolate(xs: &[f64], ys: &[f64], q: f64, extrapolation: Extrapolation) -> f64 {
    let n = xs.len();
    let below = q < xs[0];
    match extrapolation {
        Extrapolation::Constant(v) => v,
        Extrapolation::Clamp => {
            if below {
                ys[0]
            } else {
                ys[n - 1]
            }
        }
        Extrapolation::Linear if n == 1 => ys[0],
        Extrapolation::Linear => {
            if below {
                lerp(xs[0], ys[0], xs[1], ys[1], q)
            } else {
                lerp(xs[n - 2], ys[n - 2], xs[n - 1], ys[n - 1], q)
            }
        }
    }
}

#[inline]
fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, q: f64) -> f64 {
    let t = (q - x0) / (x1 - x0);
    y0 + t * (y1 - y0)
}
