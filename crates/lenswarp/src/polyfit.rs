//! Least-squares polynomial fitting.
//!
//! Fits are solved on a Vandermonde system via SVD. Abscissas are divided by
//! their largest magnitude first so that radii in the hundreds of pixels do
//! not blow up the condition number of the cubic columns; coefficients are
//! rescaled back before they are returned.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while fitting a polynomial.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// Abscissa and ordinate counts differ.
    #[error("sample length mismatch: {xs} abscissas vs {ys} ordinates")]
    LengthMismatch { xs: usize, ys: usize },
    /// Not enough distinct abscissas for the requested degree.
    #[error("need at least {needed} distinct abscissas for degree {degree}, got {got}")]
    NotEnoughPoints {
        degree: usize,
        needed: usize,
        got: usize,
    },
    /// Samples contain NaN or infinite values.
    #[error("samples contain non-finite values")]
    NonFinite,
    /// SVD failed during the least-squares solve.
    #[error("svd failed during polynomial fit: {0}")]
    SvdFailed(String),
}

/// Real polynomial with coefficients in ascending power order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    /// `coeffs[k]` multiplies `x^k`.
    pub coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Self {
        Self { coeffs }
    }

    /// Highest power with a stored coefficient (0 for an empty polynomial).
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Least-squares fit of a polynomial of `degree` to `(xs, ys)`.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, FitError> {
        if xs.len() != ys.len() {
            return Err(FitError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }
        let needed = degree + 1;
        let got = count_distinct(xs);
        if got < needed {
            return Err(FitError::NotEnoughPoints {
                degree,
                needed,
                got,
            });
        }

        let scale = xs.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };

        let n = xs.len();
        let a = DMatrix::from_fn(n, needed, |i, k| (xs[i] / scale).powi(k as i32));
        let b = DVector::from_column_slice(ys);

        let svd = a.svd(true, true);
        let sol = svd
            .solve(&b, 1e-12)
            .map_err(|e| FitError::SvdFailed(e.to_string()))?;

        let coeffs = sol
            .iter()
            .enumerate()
            .map(|(k, c)| c / scale.powi(k as i32))
            .collect();
        Ok(Self { coeffs })
    }

    /// Evaluate at `x` with Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    /// Elementwise evaluation over a matrix.
    pub fn eval_matrix(&self, m: &DMatrix<f64>) -> DMatrix<f64> {
        m.map(|v| self.eval(v))
    }

    /// Root-mean-square residual of the polynomial over samples.
    pub fn rms_residual(&self, xs: &[f64], ys: &[f64]) -> f64 {
        if xs.is_empty() {
            return 0.0;
        }
        let sse: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (self.eval(x) - y).powi(2))
            .sum();
        (sse / xs.len() as f64).sqrt()
    }
}

fn count_distinct(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
