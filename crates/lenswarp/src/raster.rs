//! RGBA8 pixel raster shared between the codec boundary and the engine.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl From<Rgba<u8>> for Pixel {
    fn from(p: Rgba<u8>) -> Self {
        let [red, green, blue, alpha] = p.0;
        Self::new(red, green, blue, alpha)
    }
}

impl From<Pixel> for Rgba<u8> {
    fn from(p: Pixel) -> Self {
        Rgba([p.red, p.green, p.blue, p.alpha])
    }
}

/// Rectangular grid of pixels stored row-major.
///
/// `height` is the number of rows and `width` the length of every row.
/// A raster with no rows has width 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelRaster {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelRaster {
    /// Raster of `width x height` pixels, all set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Pixel) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    /// Build a raster from explicit rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self> {
        let Some(expected) = rows.first().map(Vec::len) else {
            return Ok(Self::default());
        };
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(Error::RaggedRaster {
                row,
                expected,
                found: r.len(),
            });
        }
        if expected == 0 {
            return Ok(Self::default());
        }
        let height = rows.len();
        Ok(Self {
            width: expected,
            height,
            pixels: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a raster by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        let mut pixels = Vec::with_capacity(width * height);
        for i in 0..height {
            for j in 0..width {
                pixels.push(f(i, j));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        (row < self.height && col < self.width).then(|| self.pixels[row * self.width + col])
    }

    /// Mutable pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Pixel> {
        if row < self.height && col < self.width {
            Some(&mut self.pixels[row * self.width + col])
        } else {
            None
        }
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // chunks_exact panics on 0; an empty raster has no rows anyway.
        self.pixels.chunks_exact(self.width.max(1))
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Copy an `image` RGBA buffer into a raster.
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self::from_fn(w as usize, h as usize, |i, j| {
            Pixel::from(*img.get_pixel(j as u32, i as u32))
        })
    }

    /// Copy the raster into an `image` RGBA buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width as u32, self.height as u32);
        for (i, row) in self.rows().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                img.put_pixel(j as u32, i as u32, p.into());
            }
        }
        img
    }
}
