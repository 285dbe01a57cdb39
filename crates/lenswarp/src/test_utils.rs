//! Shared raster builders and comparison helpers for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::raster::{Pixel, PixelRaster};

/// Raster of uniformly random pixels, reproducible from `seed`.
pub(crate) fn random_raster(width: usize, height: usize, seed: u64) -> PixelRaster {
    let mut rng = StdRng::seed_from_u64(seed);
    PixelRaster::from_fn(width, height, |_, _| {
        Pixel::new(rng.gen(), rng.gen(), rng.gen(), rng.gen())
    })
}

/// Smooth opaque gradient: red follows the column, green the row, blue the
/// diagonal. Slopes stay below two levels per pixel for images of a few
/// dozen pixels and up.
pub(crate) fn gradient_raster(width: usize, height: usize) -> PixelRaster {
    let wd = width.saturating_sub(1).max(1);
    let hd = height.saturating_sub(1).max(1);
    let dd = (width + height).saturating_sub(2).max(1);
    PixelRaster::from_fn(width, height, |row, col| {
        Pixel::new(
            (40 + col * 160 / wd) as u8,
            (40 + row * 160 / hd) as u8,
            (60 + (row + col) * 120 / dd) as u8,
            255,
        )
    })
}

/// Mean absolute RGB difference over the interior that is `margin` pixels
/// away from every border.
pub(crate) fn mean_abs_error(a: &PixelRaster, b: &PixelRaster, margin: usize) -> f64 {
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    let mut sum = 0u64;
    let mut n = 0u64;
    for row in margin..a.height().saturating_sub(margin) {
        for col in margin..a.width().saturating_sub(margin) {
            let (p, q) = (a.get(row, col).unwrap(), b.get(row, col).unwrap());
            for (u, v) in [(p.red, q.red), (p.green, q.green), (p.blue, q.blue)] {
                sum += u.abs_diff(v) as u64;
                n += 1;
            }
        }
    }
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}
