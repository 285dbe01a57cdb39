use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interp::Extrapolation;
use crate::model::RadialModel;

/// Configuration for distortion and correction runs.
///
/// Every field has a default, so a JSON file only needs the keys it wants to
/// override:
///
/// ```json
/// { "model": { "a0": 1.04, "a1": -0.0001, "a2": 0.000004 }, "refinement_passes": 1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionConfig {
    /// Forward radial model applied by distortion and inverted by correction.
    pub model: RadialModel,
    /// Pixel stride of the sparse sample grid used to re-estimate the model.
    pub sample_stride: usize,
    /// Degree of the forward and inverse polynomial fits.
    pub fit_degree: usize,
    /// How many times correction resamples through the inverse ratio field.
    pub refinement_passes: usize,
    /// Boundary behavior of the 1-D interpolation passes.
    pub extrapolation: Extrapolation,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            model: RadialModel::EXAMPLE,
            sample_stride: 32,
            fit_degree: 3,
            refinement_passes: 2,
            extrapolation: Extrapolation::Clamp,
        }
    }
}

impl DistortionConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config_err = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };
        let data = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config: Self = serde_json::from_str(&data).map_err(|e| config_err(e.to_string()))?;
        config.validate().map_err(config_err)?;
        Ok(config)
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let m = &self.model;
        if ![m.a0, m.a1, m.a2].iter().all(|c| c.is_finite()) {
            return Err("model coefficients must be finite".to_string());
        }
        if self.sample_stride == 0 {
            return Err("sample_stride must be positive".to_string());
        }
        if self.fit_degree == 0 {
            return Err("fit_degree must be at least 1".to_string());
        }
        if let Extrapolation::Constant(v) = self.extrapolation {
            if !v.is_finite() {
                return Err("extrapolation fill value must be finite".to_string());
            }
        }
        Ok(())
    }
}
