//! Per-category fingerprint strategies.
//!
//! A fingerprint is the grouping key for duplicate detection. Each
//! [`MediaCategory`] is bound to exactly one strategy:
//!
//! | Category | Strategy                                   | Module          |
//! |----------|--------------------------------------------|-----------------|
//! | Generic  | streaming digest of the raw bytes          | [`digest`]      |
//! | Image    | DCT perceptual hash                        | [`perceptual`]  |
//! | Audio    | mean of 13 MFCCs over all frames           | [`audio`]       |
//! | Video    | digest of the first decoded frame's pixels | [`video`]       |
//!
//! Fingerprints carry their category, so values produced by different
//! strategies never compare equal even when the hex strings coincide.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::fingerprint::{DigestAlgorithm, StrategySet};
//! use mediadupe::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let strategies = StrategySet::new(DigestAlgorithm::Sha256, "ffmpeg");
//! let record = FileRecord::classified(PathBuf::from("holiday.jpg"), 0);
//! match strategies.fingerprint(&record) {
//!     Ok(fp) => println!("{}", fp),
//!     Err(e) => eprintln!("skipped: {}", e),
//! }
//! ```

pub mod audio;
pub mod digest;
pub mod mfcc;
pub mod perceptual;
pub mod video;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{FileRecord, MediaCategory};

pub use audio::AudioFingerprinter;
pub use digest::{ContentDigester, DigestAlgorithm, CHUNK_SIZE};
pub use mfcc::{MfccExtractor, N_MFCC};
pub use perceptual::PerceptualHasher;
pub use video::VideoFrameHasher;

/// Category-scoped grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fingerprint {
    /// Category of the strategy that produced the value
    pub category: MediaCategory,
    /// Hex-encoded strategy output
    pub value: String,
}

impl Fingerprint {
    /// Create a new fingerprint.
    #[must_use]
    pub fn new(category: MediaCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.value)
    }
}

/// Errors that make a single file unfingerprintable.
///
/// These never abort a scan: the file is skipped and reported.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file could not be opened or a read failed mid-stream.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The content could not be decoded as the expected media type.
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// Path of the undecodable file
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// No decoder is available for this file on this system.
    #[error("Unsupported media {path}: {reason}")]
    Unsupported {
        /// Path of the file
        path: PathBuf,
        /// What is missing
        reason: String,
    },

    /// Fingerprinting was cancelled by a shutdown request.
    #[error("Interrupted while fingerprinting {0}")]
    Interrupted(PathBuf),
}

impl FingerprintError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } | Self::Unsupported { path, .. } => {
                path
            }
            Self::Interrupted(path) => path,
        }
    }
}

/// A function from file content to a fingerprint value.
pub trait FingerprintStrategy: Send + Sync {
    /// Compute the hex-encoded fingerprint value of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`FingerprintError`] if the file cannot be read or decoded.
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError>;
}

/// The complete category → strategy binding used by a scan.
pub struct StrategySet {
    generic: ContentDigester,
    image: PerceptualHasher,
    audio: AudioFingerprinter,
    video: VideoFrameHasher,
}

impl StrategySet {
    /// Build the strategies for one scan.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - Digest used for generic files and video frames
    /// * `ffmpeg` - Program used to decode video frames
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            generic: ContentDigester::new(algorithm),
            image: PerceptualHasher::new(),
            audio: AudioFingerprinter::new(),
            video: VideoFrameHasher::new(ffmpeg, algorithm),
        }
    }

    /// Let long generic reads stop early on shutdown.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: std::sync::Arc<std::sync::atomic::AtomicBool>) -> Self {
        self.generic = self.generic.with_shutdown_flag(flag);
        self
    }

    /// Strategy bound to a category.
    #[must_use]
    pub fn strategy_for(&self, category: MediaCategory) -> &dyn FingerprintStrategy {
        match category {
            MediaCategory::Generic => &self.generic,
            MediaCategory::Image => &self.image,
            MediaCategory::Audio => &self.audio,
            MediaCategory::Video => &self.video,
        }
    }

    /// Fingerprint a walked file with the strategy for its category.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's [`FingerprintError`].
    pub fn fingerprint(&self, record: &FileRecord) -> Result<Fingerprint, FingerprintError> {
        let value = self
            .strategy_for(record.category)
            .fingerprint(&record.path)?;
        Ok(Fingerprint::new(record.category, value))
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::new(DigestAlgorithm::default(), video::DEFAULT_FFMPEG)
    }
}
