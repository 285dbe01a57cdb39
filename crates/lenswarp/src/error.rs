use std::path::PathBuf;

use thiserror::Error;

use crate::interp::InterpError;
use crate::polyfit::FitError;

/// Errors produced by the distortion engine and its I/O boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was requested before any raster was loaded.
    #[error("failed to process: load an image first")]
    NoImageLoaded,
    /// Rows handed to [`PixelRaster::from_rows`](crate::PixelRaster::from_rows) differ in length.
    #[error("ragged raster: row {row} has {found} pixels, expected {expected}")]
    RaggedRaster {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Planes and raster disagree on shape.
    #[error("shape mismatch: planes are {planes:?} (rows, cols), raster is {raster:?}")]
    ShapeMismatch {
        planes: (usize, usize),
        raster: (usize, usize),
    },
    /// The input image could not be read or decoded.
    #[error("failed to load file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The output image could not be encoded or written.
    #[error("failed to save file {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The output path does not name a format that can be written.
    #[error("unsupported output format for {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// A configuration file could not be read or parsed.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Interp(#[from] InterpError),
    #[error(transparent)]
    Fit(#[from] FitError),
}

pub type Result<T> = std::result::Result<T, Error>;
