use serde::{Deserialize, Serialize};

use crate::polyfit::Polynomial;

/// Which engine operation produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Forward simulation of the radial model.
    Distortion,
    /// Estimated inverse of the radial model.
    Correction,
}

/// Summary of one distortion or correction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub mode: Mode,
    /// Image dimensions `[width, height]`.
    pub image_size: [usize; 2],
    /// Number of resampling passes applied to every channel.
    pub passes: usize,
    /// Smallest and largest radius ratio in the applied field.
    pub ratio_range: [f64; 2],
}

/// Polynomials estimated for a correction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionFit {
    /// Forward model re-estimated from the sparse sample grid.
    pub forward: Polynomial,
    /// Inverse mapping from distorted radius back to undistorted radius.
    pub inverse: Polynomial,
    /// Number of sparse grid samples the forward fit used.
    pub n_samples: usize,
    /// True when the sample grid was too small to fit and the configured
    /// model coefficients were used as the forward estimate.
    pub used_model_fallback: bool,
    /// RMS residual (pixels) of the inverse fit over its table.
    pub inverse_rms_residual: f64,
}

/// Summary of a correction run, including the fitted polynomials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionReport {
    #[serde(flatten)]
    pub operation: OperationReport,
    pub fit: CorrectionFit,
}
