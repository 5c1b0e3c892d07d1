//! Deterministic synthetic images shared by the integration tests.

use image::imageops::{self, FilterType};
use image::GrayImage;
use image_phash_core::{Channels, RawImage};

/// 16x16 pseudo-random noise upscaled bilinearly into a smooth luminance
/// field. Broad spectrum like a natural image, fully deterministic per seed.
pub fn smooth_field_image(seed: u64, size: u32) -> GrayImage {
    let coarse = GrayImage::from_raw(16, 16, lcg_bytes(seed, 256)).unwrap();
    imageops::resize(&coarse, size, size, FilterType::Triangle)
}

pub fn smooth_field(seed: u64, size: u32) -> RawImage {
    raw_from_gray(&smooth_field_image(seed, size))
}

pub fn raw_from_gray(image: &GrayImage) -> RawImage {
    RawImage::new(
        image.width(),
        image.height(),
        Channels::Gray,
        image.as_raw().clone(),
    )
    .unwrap()
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
