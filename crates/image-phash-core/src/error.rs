use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the image-phash library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decode failure reported by the image decoder
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Structurally invalid pixel data
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Fingerprints of different bit widths were submitted for comparison
    #[error("Fingerprint width mismatch: {left} bits vs {right} bits")]
    WidthMismatch { left: u32, right: u32 },

    /// A buffer or string that encodes no known fingerprint form
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}
