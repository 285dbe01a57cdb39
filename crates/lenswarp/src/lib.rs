//! lenswarp — radial lens distortion simulation and correction for RGBA
//! rasters.
//!
//! A cubic radial model `R(r) = a0*r + a1*r^2 + a2*r^3` maps the distance of a
//! pixel from the image center to its distorted distance. The crate can
//! apply that model to an image (simulation) and estimate and apply its
//! numerical inverse (correction). The stages are:
//!
//! 1. **Planes** – split the raster into four `f64` channel planes.
//! 2. **Field** – build a 1-based pixel grid, the radius of every pixel from
//!    the center and the radius-ratio field `R(r) / r`.
//! 3. **Fit** – for correction, re-estimate the forward model on a sparse
//!    sample grid and fit the inverse polynomial by swapping axes.
//! 4. **Resample** – separable 1-D linear interpolation, rows then columns.
//! 5. **Narrow** – write the planes back as 8-bit channels.
//!
//! # Public API
//! - [`DistortionEngine`] holds the loaded raster and runs both operations
//! - [`DistortionConfig`] for the model, fit and boundary settings
//! - free functions for the numerical building blocks ([`interp1`],
//!   [`Polynomial::fit`], [`resample`], [`ratio_field`], ...)
//! - [`load_raster`] / [`save_raster`] at the file boundary

mod codec;
mod config;
mod engine;
mod error;
mod field;
mod interp;
mod model;
mod planes;
mod polyfit;
mod raster;
mod report;
mod resample;

#[cfg(test)]
pub(crate) mod test_utils;

pub use codec::{load_raster, save_raster, OutputFormat};
pub use config::DistortionConfig;
pub use engine::{distortion_ratio_field, estimate_correction, DistortionEngine};
pub use error::{Error, Result};
pub use field::{meshgrid, pixel_grid, radius, ratio_field, regspace, ImageCenter};
pub use interp::{interp1, Extrapolation, InterpError};
pub use model::RadialModel;
pub use planes::{narrow_to_u8, ChannelPlane, ChannelPlanes};
pub use polyfit::{FitError, Polynomial};
pub use raster::{Pixel, PixelRaster};
pub use report::{CorrectionFit, CorrectionReport, Mode, OperationReport};
pub use resample::resample;
