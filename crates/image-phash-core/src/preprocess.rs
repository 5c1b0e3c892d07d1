//! Grayscale conversion and resampling shared by both hash engines.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::types::{Channels, RawImage};

// Rec.601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// A fixed-size square grid of luminance values in `[0, 1]`.
///
/// Produced by [`intensity_matrix`] and never mutated afterwards; each hash
/// engine consumes the grid size it asked for.
#[derive(Debug, Clone)]
pub struct IntensityMatrix {
    values: Array2<f32>,
}

impl IntensityMatrix {
    /// Side length of the grid
    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub(crate) fn values(&self) -> &Array2<f32> {
        &self.values
    }
}

/// Convert a raw image to luminance and resample it to a `target`x`target` grid.
///
/// Grayscale formula: 0.299*R + 0.587*G + 0.114*B, scaled to `[0, 1]`.
/// Resampling is bilinear (`FilterType::Triangle`), so repeated calls over
/// the same pixels produce bit-identical grids.
pub fn intensity_matrix(image: &RawImage, target: u32) -> Result<IntensityMatrix> {
    let luma: Vec<f32> = match image.channels() {
        Channels::Gray => image.samples().iter().map(|&s| s as f32 / 255.0).collect(),
        Channels::Rgb => image
            .samples()
            .chunks_exact(3)
            .map(|px| {
                (LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32) / 255.0
            })
            .collect(),
    };

    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(image.width(), image.height(), luma).ok_or_else(|| {
            Error::InvalidImage("pixel buffer does not match image dimensions".into())
        })?;

    let resized = imageops::resize(&buffer, target, target, FilterType::Triangle);

    let values = Array2::from_shape_vec((target as usize, target as usize), resized.into_raw())
        .map_err(|e| Error::InvalidImage(format!("resampled grid has the wrong shape: {}", e)))?;

    Ok(IntensityMatrix { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{flat_gray, flat_rgb};

    #[test]
    fn grid_has_requested_size() {
        let image = flat_gray(100, 60, 128);
        let matrix = intensity_matrix(&image, 32).unwrap();
        assert_eq!(matrix.size(), 32);
        assert_eq!(matrix.values().dim(), (32, 32));
    }

    #[test]
    fn flat_input_yields_flat_grid() {
        let image = flat_gray(50, 50, 200);
        let matrix = intensity_matrix(&image, 32).unwrap();
        let expected = 200.0 / 255.0;
        for &v in matrix.values().iter() {
            assert!((v - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn luma_weights_order_the_primaries() {
        // Green carries the most weight, blue the least.
        let green = intensity_matrix(&flat_rgb(8, 8, [0, 255, 0]), 4).unwrap();
        let red = intensity_matrix(&flat_rgb(8, 8, [255, 0, 0]), 4).unwrap();
        let blue = intensity_matrix(&flat_rgb(8, 8, [0, 0, 255]), 4).unwrap();
        assert!(green.values()[[0, 0]] > red.values()[[0, 0]]);
        assert!(red.values()[[0, 0]] > blue.values()[[0, 0]]);
    }

    #[test]
    fn upscaling_tiny_input_is_valid() {
        let image = flat_gray(1, 1, 77);
        let matrix = intensity_matrix(&image, 32).unwrap();
        assert_eq!(matrix.size(), 32);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let image = crate::test_support::smooth_field(7, 64);
        let a = intensity_matrix(&image, 32).unwrap();
        let b = intensity_matrix(&image, 32).unwrap();
        assert_eq!(a.values(), b.values());
    }
}
