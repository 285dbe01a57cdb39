//! Per-channel `f64` planes, the working representation of all arithmetic.

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::raster::{Pixel, PixelRaster};

/// A single channel as a `height x width` real matrix.
pub type ChannelPlane = DMatrix<f64>;

/// Four channel planes that together represent one [`PixelRaster`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlanes {
    pub red: ChannelPlane,
    pub green: ChannelPlane,
    pub blue: ChannelPlane,
    pub alpha: ChannelPlane,
}

impl ChannelPlanes {
    /// Split a raster into four planes holding the exact 8-bit values.
    pub fn from_raster(raster: &PixelRaster) -> Self {
        let (h, w) = (raster.height(), raster.width());
        let channel = |pick: fn(&Pixel) -> u8| {
            DMatrix::from_fn(h, w, |i, j| pick(&raster.pixels()[i * w + j]) as f64)
        };
        Self {
            red: channel(|p| p.red),
            green: channel(|p| p.green),
            blue: channel(|p| p.blue),
            alpha: channel(|p| p.alpha),
        }
    }

    /// `(rows, cols)` of the planes.
    pub fn shape(&self) -> (usize, usize) {
        self.red.shape()
    }

    /// Apply `f` to each plane, red first, stopping at the first error.
    pub fn try_map(
        &self,
        mut f: impl FnMut(&ChannelPlane) -> Result<ChannelPlane>,
    ) -> Result<Self> {
        Ok(Self {
            red: f(&self.red)?,
            green: f(&self.green)?,
            blue: f(&self.blue)?,
            alpha: f(&self.alpha)?,
        })
    }

    /// Write the planes back into `raster`, narrowing every value to `u8`.
    ///
    /// See [`narrow_to_u8`] for the narrowing rule.
    pub fn write_to(&self, raster: &mut PixelRaster) -> Result<()> {
        let raster_shape = (raster.height(), raster.width());
        if self.shape() != raster_shape {
            return Err(Error::ShapeMismatch {
                planes: self.shape(),
                raster: raster_shape,
            });
        }
        let w = raster.width();
        for (idx, p) in raster.pixels_mut().iter_mut().enumerate() {
            let (i, j) = (idx / w, idx % w);
            *p = Pixel::new(
                narrow_to_u8(self.red[(i, j)]),
                narrow_to_u8(self.green[(i, j)]),
                narrow_to_u8(self.blue[(i, j)]),
                narrow_to_u8(self.alpha[(i, j)]),
            );
        }
        Ok(())
    }
}

/// Narrow a real channel value to 8 bits.
///
/// Truncates toward zero, then wraps modulo 256 like a fixed-width integer
/// cast. NaN narrows to 0 and infinities saturate before wrapping.
pub fn narrow_to_u8(v: f64) -> u8 {
    (v as i64) as u8
}
