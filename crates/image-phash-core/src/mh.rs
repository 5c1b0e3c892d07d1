//! Marr-Hildreth 576-bit perceptual hash.
//!
//! The image is reduced to a 416x416 luminance grid and a
//! Laplacian-of-Gaussian-like edge response is built as the difference of
//! two Gaussian blurs (sigma 1.0 and 2.0). The response is tiled into a
//! 12x12 grid of 64x64 blocks at stride 32, so adjacent blocks overlap by
//! half in both axes and the grid exactly covers the response
//! (64 + 11 * 32 = 416). Each block is summarised by the mean of its
//! absolute edge response.
//!
//! Every block is then compared against four neighbors -- right, down,
//! down-right, down-left -- with indices wrapping modulo the grid, so each
//! of the 144 blocks emits exactly four bits: 576 in total. A bit is set
//! when the block's statistic strictly exceeds the neighbor's; ties clear
//! the bit, so a flat image hashes to all zeros. Blocks are traversed
//! row-major and bits are packed most-significant first.

use log::trace;
use ndarray::{s, Array2};

use crate::error::Result;
use crate::preprocess::{intensity_matrix, IntensityMatrix};
use crate::types::{MhHash, RawImage};

/// Side length of the intensity grid for the edge-response stage
pub const MH_GRID_SIZE: u32 = 416;

/// Blocks per axis
const GRID_BLOCKS: usize = 12;

/// Side length of one block
const BLOCK_SIZE: usize = 64;

/// Stride between block origins; half a block, so adjacent blocks overlap
const BLOCK_STRIDE: usize = 32;

/// Fine and coarse blur scales for the difference-of-Gaussians response
const SIGMA_FINE: f32 = 1.0;
const SIGMA_COARSE: f32 = 2.0;

/// Neighbor offsets compared against each block: right, down, down-right,
/// down-left. Offsets wrap modulo the grid.
const NEIGHBORS: [(usize, usize); 4] = [(0, 1), (1, 0), (1, 1), (1, GRID_BLOCKS - 1)];

/// Hamming distances at or below this mark a pair of MH hashes as
/// near-duplicates. 86 of 576 bits; pairs of unrelated images land around 288.
pub const MH_SIMILARITY_THRESHOLD: u32 = 86;

/// Compute the 576-bit Marr-Hildreth hash of a decoded image.
pub fn mh_hash(image: &RawImage) -> Result<MhHash> {
    let matrix = intensity_matrix(image, MH_GRID_SIZE)?;
    Ok(hash_matrix(&matrix))
}

/// Hash an already-preprocessed 416x416 intensity grid.
pub(crate) fn hash_matrix(matrix: &IntensityMatrix) -> MhHash {
    let response = edge_response(matrix.values());
    let stats = block_statistics(&response);
    let hash = pack_comparisons(&stats);
    trace!("mh hash {}", hash);
    hash
}

/// Difference-of-Gaussians approximation of the Marr-Hildreth edge detector.
fn edge_response(grid: &Array2<f32>) -> Array2<f32> {
    let fine = gaussian_blur(grid, SIGMA_FINE);
    let coarse = gaussian_blur(grid, SIGMA_COARSE);
    fine - coarse
}

/// Separable Gaussian blur with clamp-to-edge borders.
fn gaussian_blur(grid: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() / 2;
    let (rows, cols) = grid.dim();

    let mut horizontal = Array2::zeros((rows, cols));
    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0;
            for (k, &weight) in kernel.iter().enumerate() {
                let sx = (x + k).saturating_sub(radius).min(cols - 1);
                acc += weight * grid[[y, sx]];
            }
            horizontal[[y, x]] = acc;
        }
    }

    let mut blurred = Array2::zeros((rows, cols));
    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0;
            for (k, &weight) in kernel.iter().enumerate() {
                let sy = (y + k).saturating_sub(radius).min(rows - 1);
                acc += weight * horizontal[[sy, x]];
            }
            blurred[[y, x]] = acc;
        }
    }

    blurred
}

/// Normalized 1-D Gaussian kernel with radius ceil(3 * sigma).
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as i32;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|d| (-((d * d) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in kernel.iter_mut() {
        *weight /= sum;
    }
    kernel
}

/// Mean absolute edge response of each 64x64 block, on a 12x12 grid.
fn block_statistics(response: &Array2<f32>) -> Array2<f32> {
    let mut stats = Array2::zeros((GRID_BLOCKS, GRID_BLOCKS));
    for br in 0..GRID_BLOCKS {
        for bc in 0..GRID_BLOCKS {
            let window = response.slice(s![
                br * BLOCK_STRIDE..br * BLOCK_STRIDE + BLOCK_SIZE,
                bc * BLOCK_STRIDE..bc * BLOCK_STRIDE + BLOCK_SIZE,
            ]);
            let sum: f32 = window.iter().map(|v| v.abs()).sum();
            stats[[br, bc]] = sum / (BLOCK_SIZE * BLOCK_SIZE) as f32;
        }
    }
    stats
}

/// One bit per block/neighbor pair, packed most-significant first.
fn pack_comparisons(stats: &Array2<f32>) -> MhHash {
    let mut bytes = [0u8; MhHash::BYTES];
    let mut bit = 0usize;
    for br in 0..GRID_BLOCKS {
        for bc in 0..GRID_BLOCKS {
            for &(dr, dc) in NEIGHBORS.iter() {
                let nr = (br + dr) % GRID_BLOCKS;
                let nc = (bc + dc) % GRID_BLOCKS;
                if stats[[br, bc]] > stats[[nr, nc]] {
                    bytes[bit / 8] |= 0x80 >> (bit % 8);
                }
                bit += 1;
            }
        }
    }
    debug_assert_eq!(bit, MhHash::BITS as usize);
    MhHash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{flat_gray, smooth_field};

    #[test]
    fn black_image_hashes_to_all_zeros() {
        // Zero luminance stays exactly zero through every stage, so all
        // block statistics tie and ties clear the bit.
        let hash = mh_hash(&flat_gray(64, 64, 0)).unwrap();
        assert_eq!(hash.0, [0u8; MhHash::BYTES]);
    }

    #[test]
    fn equal_statistics_clear_every_bit() {
        let stats = Array2::from_elem((GRID_BLOCKS, GRID_BLOCKS), 0.25f32);
        assert_eq!(pack_comparisons(&stats).0, [0u8; MhHash::BYTES]);
    }

    #[test]
    fn dominant_block_sets_exactly_its_four_bits() {
        // Only block (0, 0) exceeds its neighbors, so only its four
        // comparisons -- the first four bits -- are set. Every other block
        // either ties or loses its comparisons.
        let mut stats = Array2::zeros((GRID_BLOCKS, GRID_BLOCKS));
        stats[[0, 0]] = 1.0f32;
        let hash = pack_comparisons(&stats);
        assert_eq!(hash.0[0], 0xf0);
        assert_eq!(&hash.0[1..], &[0u8; MhHash::BYTES - 1][..]);
    }

    #[test]
    fn hash_is_deterministic() {
        let image = smooth_field(5, 256);
        let a = mh_hash(&image).unwrap();
        let b = mh_hash(&image).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_hashes_differently() {
        let a = mh_hash(&smooth_field(5, 256)).unwrap();
        let b = mh_hash(&smooth_field(55, 256)).unwrap();
        assert!(a.distance(&b) > MH_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 13);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
        }
    }

    #[test]
    fn blur_preserves_a_flat_grid() {
        let grid = Array2::from_elem((32, 32), 0.5f32);
        let blurred = gaussian_blur(&grid, 1.0);
        for &v in blurred.iter() {
            assert!((v - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn comparison_count_fills_the_hash_exactly() {
        assert_eq!(GRID_BLOCKS * GRID_BLOCKS * NEIGHBORS.len(), 576);
        assert_eq!(BLOCK_SIZE + (GRID_BLOCKS - 1) * BLOCK_STRIDE, 416);
    }
}
