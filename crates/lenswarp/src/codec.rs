//! Image file boundary: decode any supported file into a [`PixelRaster`] and
//! encode a raster back out.
//!
//! Decoding always converts to RGBA8. The output format is chosen from the
//! file extension and checked before any processing, so an unusable output
//! path fails fast.

use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};
use crate::raster::PixelRaster;

/// Formats the encoder can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Bmp,
    Tiff,
    /// Alpha is dropped on write.
    Jpeg,
}

impl OutputFormat {
    /// Pick the output format from the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let unsupported = || Error::UnsupportedFormat {
            path: path.to_path_buf(),
        };
        match ImageFormat::from_path(path).map_err(|_| unsupported())? {
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Bmp => Ok(Self::Bmp),
            ImageFormat::Tiff => Ok(Self::Tiff),
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            _ => Err(unsupported()),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Decode an image file into an RGBA8 raster.
pub fn load_raster(path: &Path) -> Result<PixelRaster> {
    let img = image::open(path).map_err(|source| {
        tracing::error!("Failed to load file: {}", path.display());
        Error::Decode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(PixelRaster::from_rgba_image(&img.to_rgba8()))
}

/// Encode `raster` to `path` in the format implied by its extension.
pub fn save_raster(raster: &PixelRaster, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let rgba = raster.to_rgba_image();
    let written = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(path, format.image_format()),
        _ => rgba.save_with_format(path, format.image_format()),
    };
    written.map_err(|source| {
        tracing::error!("Failed to save file: {}", path.display());
        Error::Encode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(
        "Saved {}x{} raster to {} as {:?}",
        raster.width(),
        raster.height(),
        path.display(),
        format
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::random_raster;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lenswarp-codec-{}-{name}", std::process::id()))
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.png")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.bmp")).unwrap(), OutputFormat::Bmp);
        assert_eq!(OutputFormat::from_path(Path::new("a.tif")).unwrap(), OutputFormat::Tiff);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        for name in ["out.xyz", "out"] {
            let err = OutputFormat::from_path(Path::new(name)).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat { .. }), "{name}");
        }
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let raster = random_raster(13, 7, 3);
        let path = temp_path("rt.png");
        save_raster(&raster, &path).unwrap();
        let back = load_raster(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, raster);
    }

    #[test]
    fn jpeg_write_drops_alpha() {
        let raster = random_raster(8, 8, 11);
        let path = temp_path("rt.jpg");
        save_raster(&raster, &path).unwrap();
        let back = load_raster(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!((back.width(), back.height()), (8, 8));
        assert!(back.pixels().iter().all(|p| p.alpha == 255));
    }

    #[test]
    fn missing_input_is_decode_error() {
        let err = load_raster(Path::new("/nonexistent/lenswarp-input.png")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
