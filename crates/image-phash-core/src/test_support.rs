//! Deterministic synthetic images for tests.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::types::{Channels, RawImage};

/// A single-value grayscale frame.
pub(crate) fn flat_gray(width: u32, height: u32, value: u8) -> RawImage {
    RawImage::new(
        width,
        height,
        Channels::Gray,
        vec![value; width as usize * height as usize],
    )
    .unwrap()
}

/// A single-color RGB frame.
pub(crate) fn flat_rgb(width: u32, height: u32, color: [u8; 3]) -> RawImage {
    let samples = color
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 3)
        .collect();
    RawImage::new(width, height, Channels::Rgb, samples).unwrap()
}

/// A smooth pseudo-random luminance field: 16x16 LCG noise upscaled
/// bilinearly. Broad spectrum like a natural image, fully deterministic
/// per seed.
pub(crate) fn smooth_field(seed: u64, size: u32) -> RawImage {
    let coarse = GrayImage::from_raw(16, 16, lcg_bytes(seed, 256)).unwrap();
    let fine = imageops::resize(&coarse, size, size, FilterType::Triangle);
    RawImage::new(size, size, Channels::Gray, fine.into_raw()).unwrap()
}

/// Photometric negative of an image.
pub(crate) fn invert(image: &RawImage) -> RawImage {
    let samples = image.samples().iter().map(|&s| 255 - s).collect();
    RawImage::new(image.width(), image.height(), image.channels(), samples).unwrap()
}

fn lcg_bytes(seed: u64, count: usize) -> Vec<u8> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}
