//! Perceptual image hashing.
//!
//! This module provides the `PerceptualHasher`, which computes a pHash:
//! the image is reduced to a small grayscale square, transformed with a
//! DCT, and the low-frequency 8x8 block is thresholded against its median.
//! Re-encoding or recompressing an image leaves the hash unchanged or
//! nearly so; grouping still requires exact equality.

use std::path::Path;

use image::{ImageError, ImageReader};
use image_hasher::{HashAlg, HasherConfig, ImageHash};

use super::{FingerprintError, FingerprintStrategy};

/// Hash width and height in bits.
pub const HASH_SIZE: u32 = 8;

/// Computes perceptual hashes for images.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a pHash hasher (median over DCT, 8x8 bits).
    #[must_use]
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_SIZE, HASH_SIZE)
            .hash_alg(HashAlg::Median)
            .preproc_dct()
            .to_hasher();
        Self { hasher }
    }

    /// Compute the perceptual hash for an image at the given path.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::Io` if the file cannot be read and
    /// `FingerprintError::Decode` for corrupt or unsupported data.
    pub fn compute_hash(&self, path: &Path) -> Result<ImageHash, FingerprintError> {
        // Sniff the header: extra extensions tell the decoder nothing
        let img = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| FingerprintError::io(path, e))?
            .decode()
            .map_err(|e| match e {
                ImageError::IoError(source) => FingerprintError::io(path, source),
                other => FingerprintError::decode(path, other),
            })?;

        Ok(self.hasher.hash_image(&img))
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintStrategy for PerceptualHasher {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let hash = self.compute_hash(path)?;
        let encoded = hex::encode(hash.as_bytes());
        log::trace!("pHash {}: {}", path.display(), encoded);
        Ok(encoded)
    }
}
