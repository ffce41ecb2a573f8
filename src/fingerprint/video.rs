//! First-frame video fingerprinting.
//!
//! Only the first video frame is decoded: `ffmpeg` writes it to stdout as
//! raw `rgb24` pixels and the bytes are digested. Two different videos
//! that open on an identical frame are therefore reported as duplicates.
//!
//! A video whose first frame cannot be decoded is reported as a
//! `FingerprintError::Decode` skip, never dropped silently.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::digest::{digest_bytes, DigestAlgorithm};
use super::{FingerprintError, FingerprintStrategy};

/// Program looked up on `PATH` when no ffmpeg path is configured.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Digest of the first decoded video frame.
#[derive(Debug, Clone)]
pub struct VideoFrameHasher {
    ffmpeg: PathBuf,
    algorithm: DigestAlgorithm,
}

impl VideoFrameHasher {
    /// Create a hasher using the given ffmpeg executable.
    #[must_use]
    pub fn new(ffmpeg: impl Into<PathBuf>, algorithm: DigestAlgorithm) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            algorithm,
        }
    }

    /// Decode the first frame of `path` to raw RGB bytes.
    ///
    /// # Errors
    ///
    /// `Unsupported` if ffmpeg cannot be started, `Decode` if it fails or
    /// produces no frame.
    pub fn first_frame(&self, path: &Path) -> Result<Vec<u8>, FingerprintError> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| FingerprintError::Unsupported {
                path: path.to_path_buf(),
                reason: format!("cannot run {}: {}", self.ffmpeg.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .find(|line| !line.trim().is_empty())
                .map_or_else(|| format!("ffmpeg exited with {}", output.status), str::to_owned);
            return Err(FingerprintError::decode(path, reason));
        }
        if output.stdout.is_empty() {
            return Err(FingerprintError::decode(path, "no decodable video frame"));
        }

        Ok(output.stdout)
    }
}

impl Default for VideoFrameHasher {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG, DigestAlgorithm::default())
    }
}

impl FingerprintStrategy for VideoFrameHasher {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let frame = self.first_frame(path)?;
        log::trace!(
            "Decoded first frame of {} ({} bytes)",
            path.display(),
            frame.len()
        );
        Ok(digest_bytes(self.algorithm, &frame))
    }
}
