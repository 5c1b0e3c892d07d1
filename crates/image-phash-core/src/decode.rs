//! Decoding collaborator: file path in, [`RawImage`] out.
//!
//! Decoding is delegated to the `image` crate; an unreadable, missing, or
//! corrupt file surfaces as [`Error::Decode`](crate::Error::Decode) before
//! any hash engine runs.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use log::debug;

use crate::dct::dct_hash;
use crate::error::Result;
use crate::mh::mh_hash;
use crate::types::{Channels, DctHash, MhHash, RawImage};

/// Decode an image file into caller-owned pixel data.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RawImage> {
    let decoded = image::open(&path)?;
    debug!(
        "decoded {} ({}x{})",
        path.as_ref().display(),
        decoded.width(),
        decoded.height()
    );
    raw_from_dynamic(&decoded)
}

/// Flatten a decoded image into a [`RawImage`].
///
/// Grayscale sources stay single-channel; everything else is converted to
/// 8-bit RGB first.
pub fn raw_from_dynamic(decoded: &DynamicImage) -> Result<RawImage> {
    match decoded {
        DynamicImage::ImageLuma8(gray) => RawImage::new(
            gray.width(),
            gray.height(),
            Channels::Gray,
            gray.as_raw().clone(),
        ),
        other => {
            let rgb = other.to_rgb8();
            RawImage::new(rgb.width(), rgb.height(), Channels::Rgb, rgb.into_raw())
        }
    }
}

/// Calculate a DCT hash from an image file
pub fn dct_hash_from_file<P: AsRef<Path>>(path: P) -> Result<DctHash> {
    let image = load_image(path)?;
    dct_hash(&image)
}

/// Calculate a Marr-Hildreth hash from an image file
pub fn mh_hash_from_file<P: AsRef<Path>>(path: P) -> Result<MhHash> {
    let image = load_image(path)?;
    mh_hash(&image)
}
