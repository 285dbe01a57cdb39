//! Distortion engine: forward simulation and estimated correction.
//!
//! [`DistortionEngine`] owns the currently loaded raster and an immutable
//! [`DistortionConfig`]. Both operations convert the raster to channel
//! planes, build a radius-ratio field, resample every plane and write the
//! result back in place. Nothing is mutated when an operation fails.

use std::path::Path;

use nalgebra::DMatrix;

use crate::codec;
use crate::config::DistortionConfig;
use crate::error::{Error, Result};
use crate::field::{meshgrid, pixel_grid, radius, ratio_field, regspace, ImageCenter};
use crate::planes::ChannelPlanes;
use crate::polyfit::{FitError, Polynomial};
use crate::raster::PixelRaster;
use crate::report::{CorrectionFit, CorrectionReport, Mode, OperationReport};
use crate::resample::resample;

/// Stateful front end over the distortion operations.
///
/// # Examples
///
/// ```
/// use lenswarp::{DistortionConfig, DistortionEngine, Pixel, PixelRaster};
///
/// let mut engine = DistortionEngine::new(DistortionConfig::default());
/// engine.load(PixelRaster::filled(4, 4, Pixel::new(100, 150, 200, 255)));
/// engine.add_distortion().unwrap();
/// engine.correct_distortion().unwrap();
/// assert_eq!(
///     engine.raster().unwrap().get(0, 0),
///     Some(Pixel::new(100, 150, 200, 255))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistortionEngine {
    config: DistortionConfig,
    raster: Option<PixelRaster>,
}

impl DistortionEngine {
    /// Create an engine with no raster loaded.
    pub fn new(config: DistortionConfig) -> Self {
        Self {
            config,
            raster: None,
        }
    }

    /// Access the configuration.
    pub fn config(&self) -> &DistortionConfig {
        &self.config
    }

    /// Replace the loaded raster.
    pub fn load(&mut self, raster: PixelRaster) {
        self.raster = Some(raster);
    }

    /// Decode an image file and load it.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let raster = codec::load_raster(path)?;
        tracing::info!(
            "Loaded {} ({}x{})",
            path.display(),
            raster.width(),
            raster.height()
        );
        self.load(raster);
        Ok(())
    }

    /// Encode the loaded raster to `path`.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        codec::save_raster(self.loaded()?, path)
    }

    /// The loaded raster, if any.
    pub fn raster(&self) -> Option<&PixelRaster> {
        self.raster.as_ref()
    }

    /// Consume the engine and return the loaded raster.
    pub fn into_raster(self) -> Option<PixelRaster> {
        self.raster
    }

    /// Apply the forward radial model to the loaded raster.
    pub fn add_distortion(&mut self) -> Result<OperationReport> {
        let raster = self.loaded()?;
        self.config.validate().map_err(Error::InvalidConfig)?;
        let (width, height) = (raster.width(), raster.height());
        let center = ImageCenter::of(width, height);
        let ratio = distortion_ratio_field(width, height, &self.config);

        let planes = self.resample_planes(raster, &ratio, center, 1)?;
        self.store(&planes)?;

        let report = OperationReport {
            mode: Mode::Distortion,
            image_size: [width, height],
            passes: 1,
            ratio_range: value_range(&ratio),
        };
        tracing::info!(
            "Distortion applied to {}x{} (ratio {:.4}..{:.4})",
            width,
            height,
            report.ratio_range[0],
            report.ratio_range[1]
        );
        Ok(report)
    }

    /// Estimate the inverse of the radial model and apply it to the loaded
    /// raster `refinement_passes` times.
    pub fn correct_distortion(&mut self) -> Result<CorrectionReport> {
        let raster = self.loaded()?;
        self.config.validate().map_err(Error::InvalidConfig)?;
        let (width, height) = (raster.width(), raster.height());
        let center = ImageCenter::of(width, height);

        let fit = estimate_correction(width, height, &self.config)?;
        let (x, y) = pixel_grid(width, height);
        let r = radius(&x, &y, center);
        let corrected = fit.inverse.eval_matrix(&r);
        let ratio = ratio_field(&r, &corrected);

        let passes = self.config.refinement_passes;
        let planes = self.resample_planes(raster, &ratio, center, passes)?;
        self.store(&planes)?;

        let report = CorrectionReport {
            operation: OperationReport {
                mode: Mode::Correction,
                image_size: [width, height],
                passes,
                ratio_range: value_range(&ratio),
            },
            fit,
        };
        tracing::info!(
            "Correction applied to {}x{} ({} passes, inverse rms={:.3e}px)",
            width,
            height,
            passes,
            report.fit.inverse_rms_residual
        );
        Ok(report)
    }

    fn loaded(&self) -> Result<&PixelRaster> {
        match &self.raster {
            Some(r) if !r.is_empty() => Ok(r),
            _ => {
                tracing::error!("Failed to process. Load the image file first");
                Err(Error::NoImageLoaded)
            }
        }
    }

    fn resample_planes(
        &self,
        raster: &PixelRaster,
        ratio: &DMatrix<f64>,
        center: ImageCenter,
        passes: usize,
    ) -> Result<ChannelPlanes> {
        let extrapolation = self.config.extrapolation;
        let mut planes = ChannelPlanes::from_raster(raster);
        for pass in 0..passes {
            tracing::debug!("Resampling pass {}/{}", pass + 1, passes);
            planes = planes.try_map(|p| resample(p, ratio, center, extrapolation))?;
        }
        Ok(planes)
    }

    fn store(&mut self, planes: &ChannelPlanes) -> Result<()> {
        let raster = self.raster.as_mut().ok_or(Error::NoImageLoaded)?;
        planes.write_to(raster)
    }
}

/// Ratio field `R(r) / r` of the configured forward model over a
/// `width x height` raster.
pub fn distortion_ratio_field(width: usize, height: usize, config: &DistortionConfig) -> DMatrix<f64> {
    let (x, y) = pixel_grid(width, height);
    let r = radius(&x, &y, ImageCenter::of(width, height));
    let mapped = config.model.apply(&r);
    ratio_field(&r, &mapped)
}

/// Re-estimate the forward model from a sparse sample grid and fit its
/// numerical inverse.
///
/// The sample grid steps `sample_stride` pixels inward from each edge. When
/// it yields fewer distinct radii than the fit needs (small images), the
/// configured model coefficients stand in for the forward fit. The inverse is
/// fitted by swapping domain and range over a dense radius table spanning
/// `0..=max(width, height) / 2`, extended to at least `fit_degree + 1` so
/// tiny images still get a determined system.
///
/// Fails with [`Error::InvalidConfig`] when `config` does not validate.
pub fn estimate_correction(
    width: usize,
    height: usize,
    config: &DistortionConfig,
) -> Result<CorrectionFit> {
    config.validate().map_err(Error::InvalidConfig)?;
    let degree = config.fit_degree;
    let center = ImageCenter::of(width, height);

    let stride = config.sample_stride as f64;
    let xs = regspace(stride, stride, width as f64 - stride);
    let ys = regspace(stride, stride, height as f64 - stride);
    let (sx, sy) = meshgrid(&xs, &ys);
    let r_sample = radius(&sx, &sy, center);
    let mapped_sample = config.model.apply(&r_sample);

    let mut pairs: Vec<(f64, f64)> = r_sample
        .iter()
        .copied()
        .zip(mapped_sample.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (r_sorted, mapped_sorted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let n_samples = r_sorted.len();

    let (forward, used_model_fallback) = match Polynomial::fit(&r_sorted, &mapped_sorted, degree) {
        Ok(p) => (p, false),
        Err(FitError::NotEnoughPoints { got, needed, .. }) => {
            tracing::warn!(
                "Sample grid too sparse for a degree-{} fit ({} of {} distinct radii); using model coefficients",
                degree,
                got,
                needed
            );
            (config.model.as_polynomial(), true)
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!("Forward fit from {} samples: {:?}", n_samples, forward.coeffs);

    let table_end = (width.max(height) / 2).max(degree + 1);
    let r_table = regspace(0.0, 1.0, table_end as f64);
    let mapped_table: Vec<f64> = r_table.iter().map(|&r| forward.eval(r)).collect();
    let inverse = Polynomial::fit(&mapped_table, &r_table, degree)?;
    let inverse_rms_residual = inverse.rms_residual(&mapped_table, &r_table);
    tracing::debug!(
        "Inverse fit over {} radii: {:?} (rms={:.3e})",
        r_table.len(),
        inverse.coeffs,
        inverse_rms_residual
    );

    Ok(CorrectionFit {
        forward,
        inverse,
        n_samples,
        used_model_fallback,
        inverse_rms_residual,
    })
}

fn value_range(m: &DMatrix<f64>) -> [f64; 2] {
    m.iter()
        .fold([f64::INFINITY, f64::NEG_INFINITY], |[lo, hi], &v| {
            [lo.min(v), hi.max(v)]
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RadialModel;
    use crate::raster::Pixel;
    use crate::test_utils::{gradient_raster, mean_abs_error};
    use approx::assert_abs_diff_eq;

    const SOLID: Pixel = Pixel::new(100, 150, 200, 255);

    fn engine_with(raster: PixelRaster) -> DistortionEngine {
        let mut engine = DistortionEngine::new(DistortionConfig::default());
        engine.load(raster);
        engine
    }

    #[test]
    fn operations_without_image_fail_cleanly() {
        let mut engine = DistortionEngine::default();
        assert!(matches!(engine.add_distortion(), Err(Error::NoImageLoaded)));
        assert!(matches!(engine.correct_distortion(), Err(Error::NoImageLoaded)));
        assert!(engine.raster().is_none());

        engine.load(PixelRaster::default());
        assert!(matches!(engine.add_distortion(), Err(Error::NoImageLoaded)));
        assert_eq!(engine.raster(), Some(&PixelRaster::default()));
    }

    #[test]
    fn solid_image_survives_distortion_and_correction() {
        let mut engine = engine_with(PixelRaster::filled(4, 4, SOLID));
        engine.add_distortion().unwrap();
        let report = engine.correct_distortion().unwrap();
        assert!(report.fit.used_model_fallback);

        let out = engine.into_raster().unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));
        assert!(out.pixels().iter().all(|&p| p == SOLID));
    }

    #[test]
    fn shapes_are_preserved() {
        for (w, h) in [(1, 1), (7, 3), (40, 65)] {
            let mut engine = engine_with(gradient_raster(w, h));
            engine.add_distortion().unwrap();
            engine.correct_distortion().unwrap();
            let out = engine.raster().unwrap();
            assert_eq!((out.width(), out.height()), (w, h));
        }
    }

    #[test]
    fn center_pixel_is_nearly_unchanged() {
        let input = gradient_raster(64, 48);
        let center = input.get(24, 32).unwrap();

        let mut engine = engine_with(input.clone());
        engine.add_distortion().unwrap();
        let distorted = engine.raster().unwrap().get(24, 32).unwrap();
        assert!((distorted.red as i32 - center.red as i32).abs() <= 1);
        assert!((distorted.green as i32 - center.green as i32).abs() <= 1);

        let mut engine = engine_with(input);
        engine.correct_distortion().unwrap();
        let corrected = engine.raster().unwrap().get(24, 32).unwrap();
        assert!((corrected.red as i32 - center.red as i32).abs() <= 1);
        assert!((corrected.green as i32 - center.green as i32).abs() <= 1);
    }

    #[test]
    fn distortion_then_correction_approximately_inverts() {
        let input = gradient_raster(96, 96);
        let mut engine = engine_with(input.clone());
        engine.add_distortion().unwrap();
        engine.correct_distortion().unwrap();
        let out = engine.raster().unwrap();

        let err = mean_abs_error(&input, out, 24);
        assert!(err < 5.0, "interior mean abs error {err}");
    }

    #[test]
    fn correction_then_distortion_approximately_inverts() {
        let input = gradient_raster(128, 128);
        let mut engine = engine_with(input.clone());
        engine.correct_distortion().unwrap();
        engine.add_distortion().unwrap();
        let out = engine.raster().unwrap();

        let err = mean_abs_error(&input, out, 32);
        assert!(err < 5.0, "interior mean abs error {err}");
    }

    #[test]
    fn invalid_config_is_rejected_without_mutation() {
        let input = gradient_raster(64, 64);
        let config = DistortionConfig {
            sample_stride: 0,
            ..Default::default()
        };
        let mut engine = DistortionEngine::new(config.clone());
        engine.load(input.clone());

        assert!(matches!(
            engine.correct_distortion(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            engine.add_distortion(),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(engine.raster(), Some(&input));
        assert!(matches!(
            estimate_correction(64, 64, &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn identity_model_leaves_image_untouched() {
        let input = gradient_raster(33, 20);
        let config = DistortionConfig {
            model: RadialModel::IDENTITY,
            ..Default::default()
        };
        let mut engine = DistortionEngine::new(config);
        engine.load(input.clone());
        engine.add_distortion().unwrap();
        assert_eq!(engine.raster(), Some(&input));
    }

    #[test]
    fn distortion_ratio_field_matches_model() {
        let ratio = distortion_ratio_field(9, 9, &DistortionConfig::default());
        // Cell (0, 0) sits at grid (1, 1), center (4.5, 4.5).
        let r = (2.0f64 * 3.5 * 3.5).sqrt();
        let expected = RadialModel::EXAMPLE.distort(r) / r;
        assert_abs_diff_eq!(ratio[(0, 0)], expected, epsilon = 1e-12);
        assert!(ratio.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn correction_fit_inverts_forward_model() {
        let fit = estimate_correction(640, 480, &DistortionConfig::default()).unwrap();
        assert!(!fit.used_model_fallback);
        // 19 x 14 interior samples at a 32 px stride.
        assert_eq!(fit.n_samples, 19 * 14);
        for (c, t) in fit.forward.coeffs.iter().zip([0.0, 1.06, -0.0002, 0.000005]) {
            assert_abs_diff_eq!(*c, t, epsilon = 1e-6);
        }
        for r in [5.0, 60.0, 150.0, 300.0] {
            let back = fit.inverse.eval(RadialModel::EXAMPLE.distort(r));
            assert_abs_diff_eq!(back, r, epsilon = 2.0);
        }
    }

    #[test]
    fn correction_runs_configured_number_of_passes() {
        let config = DistortionConfig {
            refinement_passes: 1,
            ..Default::default()
        };
        let mut engine = DistortionEngine::new(config);
        engine.load(gradient_raster(16, 16));
        let report = engine.correct_distortion().unwrap();
        assert_eq!(report.operation.passes, 1);
        assert_eq!(report.operation.mode, Mode::Correction);
        assert!(report.operation.ratio_range[0] <= report.operation.ratio_range[1]);
    }
}
