//! Core functionality for computing and comparing perceptual image hashes.
//!
//! Perceptual hashing generates fingerprints that remain similar for
//! visually similar images, unlike cryptographic hashes where minor changes
//! produce completely different outputs. This library provides:
//! - A 64-bit DCT hash read from the low-frequency coefficients of a
//!   32x32 discrete cosine transform
//! - A 576-bit Marr-Hildreth hash built from edge-response statistics over
//!   overlapping image blocks
//! - A Hamming distance comparator over both fingerprint kinds
//!
//! ## Hamming Distance Interpretation
//!
//! For the 64-bit DCT hash:
//! - 0-3: nearly identical images (same image with minor modifications)
//! - 4-10: similar images (same subject with moderate differences)
//! - >10: different images
//!
//! The 576-bit MH hash scales accordingly; unrelated pairs land around 288.
//!
//! Hash computation is a pure function of the decoded pixels: no state
//! persists between calls, and any number of computations may run in
//! parallel. Callers that want a worker pool put one around the library,
//! not inside it.

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use decode::{dct_hash_from_file, load_image, mh_hash_from_file, raw_from_dynamic};
pub use dct::{dct_hash, DCT_SIMILARITY_THRESHOLD};
pub use distance::hamming_distance;
pub use error::{Error, Result};
pub use mh::{mh_hash, MH_SIMILARITY_THRESHOLD};
pub use types::*;

// -- Public Modules --
pub mod decode;
pub mod dct;
pub mod distance;
pub mod mh;
pub mod preprocess;
pub mod types;

// -- Test Modules --
#[cfg(test)]
pub(crate) mod test_support;
