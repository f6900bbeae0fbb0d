//! Block-mean perceptual hash
//!
//! The image is cut into an `n x n` grid and every block becomes one bit, set
//! when the block is brighter than the median of its horizontal band. The
//! algorithm itself comes from `image_hasher`.

use crate::fingerprint::Fingerprint;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};

/// Computes a `grid * grid` bit fingerprint of the image
///
/// The grid edge is rounded up to a multiple of 4 so the bands split evenly.
pub fn block_hash(image: &DynamicImage, grid: u32) -> Fingerprint {
    let grid = grid.max(4).div_ceil(4) * 4;
    let hasher = HasherConfig::new()
        .hash_alg(HashAlg::Blockhash)
        .hash_size(grid, grid)
        .to_hasher();

    Fingerprint::from_bytes(hasher.hash_image(image).as_bytes().to_vec())
}
