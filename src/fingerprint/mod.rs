//! Perceptual fingerprints and near-duplicate detection
//!
//! Every thumbnail is fitted to a fixed square, reduced to a block-mean hash
//! and compared against the corpus. Two fingerprints are near-duplicates when
//! their Hamming distance is strictly below the configured threshold.

mod blockhash;
mod dedup;
mod thumbnail;

pub use blockhash::block_hash;
pub use dedup::{DedupEngine, ImageCandidate, ProcessedThumbnail};
pub use thumbnail::{fit_thumbnail, save_thumbnail};

use std::fmt;

/// Fixed-length perceptual hash of an image
///
/// Bits are packed most-significant first. The hex form is what the corpus
/// stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Wraps raw packed bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Packs a bit sequence, most-significant bit first
    ///
    /// A trailing partial byte is padded with zeros.
    #[cfg(test)]
    pub(crate) fn from_bits(bits: &[bool]) -> Self {
        let bytes = bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &bit)| byte | ((bit as u8) << (7 - i)))
            })
            .collect();
        Self { bytes }
    }

    /// Decodes a hex-encoded fingerprint
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self {
            bytes: hex::decode(hex_str)?,
        })
    }

    /// Hex encoding used for storage
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bits in the fingerprint
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Number of differing bit positions
    ///
    /// Returns None when the fingerprints have different lengths; they were
    /// produced with different grid sizes and are not comparable.
    pub fn distance(&self, other: &Fingerprint) -> Option<u32> {
        if self.bytes.len() != other.bytes.len() {
            return None;
        }

        Some(
            self.bytes
                .iter()
                .zip(&other.bytes)
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }

    /// True when `other` is within `threshold` (exclusive) of this fingerprint
    pub fn is_near(&self, other: &Fingerprint, threshold: u32) -> bool {
        matches!(self.distance(other), Some(d) if d < threshold)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
