use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::polyfit::Polynomial;

/// Odd-polynomial radial distortion model.
///
/// Maps an undistorted radius `r` to a distorted radius
/// `R(r) = a0·r + a1·r² + a2·r³`. With the default coefficients the model is
/// a mild barrel distortion over the usual working radii.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RadialModel {
    /// Linear (magnification) coefficient.
    pub a0: f64,
    /// Quadratic coefficient.
    pub a1: f64,
    /// Cubic coefficient.
    pub a2: f64,
}

impl Default for RadialModel {
    fn default() -> Self {
        Self::EXAMPLE
    }
}

impl RadialModel {
    /// Example coefficients used when no calibration is supplied.
    pub const EXAMPLE: Self = Self {
        a0: 1.06,
        a1: -0.0002,
        a2: 0.000005,
    };

    /// Identity model (`R(r) = r`).
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn new(a0: f64, a1: f64, a2: f64) -> Self {
        Self { a0, a1, a2 }
    }

    /// Distorted radius for an undistorted radius.
    pub fn distort(&self, r: f64) -> f64 {
        r * (self.a0 + r * (self.a1 + r * self.a2))
    }

    /// Elementwise [`distort`](Self::distort) over a radius field.
    pub fn apply(&self, r: &DMatrix<f64>) -> DMatrix<f64> {
        r.map(|v| self.distort(v))
    }

    /// The model as a cubic polynomial with a zero constant term.
    pub fn as_polynomial(&self) -> Polynomial {
        Polynomial::new(vec![0.0, self.a0, self.a1, self.a2])
    }

    /// Whether `R(r)` is strictly increasing on `[0, max_r]`, checked at
    /// spacing `step`.
    pub fn is_monotonic_on(&self, max_r: f64, step: f64) -> bool {
        if !(step > 0.0) || !(max_r >= 0.0) {
            return false;
        }
        let n = (max_r / step).ceil() as usize;
        let mut prev = self.distort(0.0);
        for k in 1..=n {
            let r = (k as f64 * step).min(max_r);
            let cur = self.distort(r);
            if !(cur > prev) {
                return false;
            }
            prev = cur;
        }
        true
    }
}
