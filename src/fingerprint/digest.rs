//! Streaming content digests.
//!
//! # Overview
//!
//! Generic files have no structure worth decoding, so their fingerprint
//! is a cryptographic digest of the raw bytes. Files are read in
//! [`CHUNK_SIZE`] pieces so memory use does not depend on file size.
//!
//! The same digests are used for decoded video frames.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{FingerprintError, FingerprintStrategy};

/// Read buffer size for streaming digests (8 KiB).
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Digest algorithm for generic files and video frames.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5 (128-bit). Adequate for duplicate detection, not for security.
    Md5,
    /// SHA-256 (256-bit).
    Sha256,
    /// BLAKE3 (256-bit), fastest of the three.
    #[default]
    Blake3,
}

impl DigestAlgorithm {
    /// Length of the hex-encoded output.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

enum DigestState {
    Md5(Md5),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(Md5::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Digest an in-memory buffer.
#[must_use]
pub fn digest_bytes(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    let mut state = DigestState::new(algorithm);
    state.update(data);
    state.finalize_hex()
}

/// Streaming file digester.
#[derive(Debug, Clone)]
pub struct ContentDigester {
    algorithm: DigestAlgorithm,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ContentDigester {
    /// Create a digester for the given algorithm.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            shutdown_flag: None,
        }
    }

    /// Abort long reads when the flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Algorithm used by this digester.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Digest everything a reader yields, [`CHUNK_SIZE`] bytes at a time.
    ///
    /// # Errors
    ///
    /// Returns the first read error, or `Interrupted` if shutdown was
    /// requested between chunks.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "Shutdown"));
            }
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted && !self.is_shutdown_requested() => {
                    continue
                }
                Err(e) => return Err(e),
            };
            state.update(&buffer[..n]);
        }

        Ok(state.finalize_hex())
    }

    /// Digest a file on disk.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::Io` if the file cannot be opened or read.
    pub fn digest_file(&self, path: &Path) -> Result<String, FingerprintError> {
        let file = File::open(path).map_err(|e| FingerprintError::io(path, e))?;
        self.digest_reader(file).map_err(|e| {
            if e.kind() == io::ErrorKind::Interrupted && self.is_shutdown_requested() {
                FingerprintError::Interrupted(path.to_path_buf())
            } else {
                FingerprintError::io(path, e)
            }
        })
    }
}

impl Default for ContentDigester {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default())
    }
}

impl FingerprintStrategy for ContentDigester {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let hex = self.digest_file(path)?;
        log::trace!("{} digest {}: {}", self.algorithm, path.display(), hex);
        Ok(hex)
    }
}
