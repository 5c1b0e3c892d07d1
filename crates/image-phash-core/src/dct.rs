//! DCT-based 64-bit perceptual hash.
//!
//! The image is reduced to a 32x32 luminance grid, transformed with a 2-D
//! DCT-II, and the hash is read off the 8x8 low-frequency block at offset
//! (1, 1) -- skipping the DC row and column, which carry no discriminative
//! signal. The 64 retained coefficients are scanned row-major; bit 63 of the
//! hash corresponds to the first coefficient in scan order, and a bit is set
//! when its coefficient is at or above the median of the block.
//!
//! Coefficients exactly at the median set their bit. A flat image, whose
//! retained coefficients are all zero, therefore hashes to all ones.

use std::sync::Arc;

use log::trace;
use once_cell::sync::Lazy;
use rustdct::{DctPlanner, TransformType2And3};

use crate::error::Result;
use crate::preprocess::{intensity_matrix, IntensityMatrix};
use crate::types::{DctHash, RawImage};

/// Side length of the intensity grid fed to the transform
pub const DCT_GRID_SIZE: u32 = 32;

/// Side length of the low-frequency block the hash is read from
const HASH_BLOCK: usize = 8;

/// Offset of the low-frequency block; skips the DC row and column
const BLOCK_OFFSET: usize = 1;

/// Hamming distances at or below this mark a pair of DCT hashes as
/// near-duplicates. 10 of 64 bits; pairs of unrelated images land around 32.
pub const DCT_SIMILARITY_THRESHOLD: u32 = 10;

/// Shared 32-point DCT-II plan. Planning is deterministic and the plan is
/// immutable, so a single lazily built instance serves every call.
struct Dct2d {
    transform: Arc<dyn TransformType2And3<f32>>,
    scratch_len: usize,
}

static DCT_PLAN: Lazy<Dct2d> = Lazy::new(|| {
    let transform = DctPlanner::new().plan_dct2(DCT_GRID_SIZE as usize);
    let scratch_len = transform.get_scratch_len();
    Dct2d {
        transform,
        scratch_len,
    }
});

/// Compute the 64-bit DCT hash of a decoded image.
pub fn dct_hash(image: &RawImage) -> Result<DctHash> {
    let matrix = intensity_matrix(image, DCT_GRID_SIZE)?;
    Ok(hash_matrix(&matrix))
}

/// Hash an already-preprocessed 32x32 intensity grid.
pub(crate) fn hash_matrix(matrix: &IntensityMatrix) -> DctHash {
    let n = matrix.size();
    let coefficients = dct_2d(matrix.values().iter().copied().collect(), n);

    // Row-major scan of the 8x8 block at (1, 1): exactly 64 coefficients.
    let mut scan = Vec::with_capacity(HASH_BLOCK * HASH_BLOCK);
    for row in BLOCK_OFFSET..BLOCK_OFFSET + HASH_BLOCK {
        let start = row * n + BLOCK_OFFSET;
        scan.extend_from_slice(&coefficients[start..start + HASH_BLOCK]);
    }

    let hash = quantize(&scan);
    trace!("dct hash {:#018x}", hash);
    DctHash(hash)
}

/// Threshold the scanned coefficients against their median, most-significant
/// bit first. Coefficients exactly at the median set their bit.
fn quantize(scan: &[f32]) -> u64 {
    let mut sorted = scan.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    // Upper of the two middle values; with 64 entries this is index 32.
    let median = sorted[sorted.len() / 2];

    let mut hash = 0u64;
    for (i, &coefficient) in scan.iter().enumerate() {
        if coefficient >= median {
            hash |= 1 << (63 - i);
        }
    }
    hash
}

/// Separable 2-D DCT-II over a row-major n x n buffer: transform the rows,
/// transpose, transform the rows again, transpose back.
fn dct_2d(mut buffer: Vec<f32>, n: usize) -> Vec<f32> {
    let plan = &*DCT_PLAN;
    let mut scratch = vec![0.0f32; plan.scratch_len];

    for row in buffer.chunks_mut(n) {
        plan.transform.process_dct2_with_scratch(row, &mut scratch);
    }
    transpose_square(&mut buffer, n);
    for row in buffer.chunks_mut(n) {
        plan.transform.process_dct2_with_scratch(row, &mut scratch);
    }
    transpose_square(&mut buffer, n);

    buffer
}

fn transpose_square(buffer: &mut [f32], n: usize) {
    for y in 0..n {
        for x in y + 1..n {
            buffer.swap(y * n + x, x * n + y);
        }
    }
}
