//! Duplicate finder: walk, fingerprint, group.
//!
//! # Overview
//!
//! The pipeline has three stages:
//! 1. **Walking** - collect [`FileRecord`]s from the root (see [`crate::scanner`])
//! 2. **Fingerprint** - compute each file's [`Fingerprint`] with the strategy
//!    bound to its category, in parallel on a bounded rayon pool
//! 3. **Grouping** - merge the results in walk order into a
//!    [`GroupAccumulator`] and keep groups with two or more members
//!
//! Files that cannot be fingerprinted are skipped and listed in the
//! [`ScanSummary`]; they never abort the scan.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
//! use mediadupe::fingerprint::DigestAlgorithm;
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_io_threads(4)
//!     .with_algorithm(DigestAlgorithm::Sha256);
//! let finder = DuplicateFinder::new(config);
//!
//! let (result, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//! for group in &result {
//!     println!("{}: {} files", group.fingerprint, group.len());
//! }
//! println!("{} files skipped", summary.skipped.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use super::groups::{GroupAccumulator, ScanResult};
use crate::fingerprint::{DigestAlgorithm, Fingerprint, FingerprintError, StrategySet};
use crate::progress::ProgressCallback;
use crate::scanner::{FileRecord, MediaCategory, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads for fingerprinting.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Digest for generic files and video frames.
    pub algorithm: DigestAlgorithm,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Program used to decode video frames.
    pub ffmpeg_path: PathBuf,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("ffmpeg_path", &self.ffmpeg_path)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            algorithm: DigestAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            ffmpeg_path: PathBuf::from(crate::fingerprint::video::DEFAULT_FFMPEG),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the ffmpeg executable.
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A file that was walked but could not be fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path of the file
    pub path: PathBuf,
    /// Category the file was classified as
    pub category: MediaCategory,
    /// Why it was skipped
    pub reason: String,
}

/// Files fingerprinted per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    /// Generic files
    pub generic: usize,
    /// Images
    pub image: usize,
    /// Audio files
    pub audio: usize,
    /// Videos
    pub video: usize,
}

impl CategoryCounts {
    fn increment(&mut self, category: MediaCategory) {
        match category {
            MediaCategory::Generic => self.generic += 1,
            MediaCategory::Image => self.image += 1,
            MediaCategory::Audio => self.audio += 1,
            MediaCategory::Video => self.video += 1,
        }
    }

    /// Count for one category.
    #[must_use]
    pub fn get(&self, category: MediaCategory) -> usize {
        match category {
            MediaCategory::Generic => self.generic,
            MediaCategory::Image => self.image,
            MediaCategory::Audio => self.audio,
            MediaCategory::Video => self.video,
        }
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.generic + self.image + self.audio + self.video
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files walked
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Files successfully fingerprinted, per category
    pub fingerprinted: CategoryCounts,
    /// Files that could not be fingerprinted
    pub skipped: Vec<SkippedFile>,
    /// Non-fatal errors from directory traversal
    pub walk_errors: Vec<ScanError>,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one copy per group)
    pub duplicate_files: usize,
    /// Bytes that could be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// True when any file was skipped or any walk error occurred.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.skipped.is_empty() || !self.walk_errors.is_empty()
    }

    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size with IEC units (KiB, MiB, GiB).
///
/// ```
/// use mediadupe::duplicates::format_size;
///
/// assert_eq!(format_size(1024), "1.0 KiB");
/// assert!(format_size(5 * 1024 * 1024).contains("MiB"));
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root directory cannot be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while opening the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The fingerprint worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder that runs the walk, fingerprint and grouping stages.
///
/// Each call to [`DuplicateFinder::find_duplicates`] is an independent scan;
/// nothing is carried over between calls.
pub struct DuplicateFinder {
    config: FinderConfig,
    strategies: StrategySet,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut strategies = StrategySet::new(config.algorithm, config.ffmpeg_path.clone());
        if let Some(ref flag) = config.shutdown_flag {
            strategies = strategies.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, strategies }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder was built with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate groups under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist
    /// - The path is not a directory, or cannot be read
    /// - The scan is interrupted by shutdown signal
    ///
    /// Per-file failures are not errors; see [`ScanSummary::skipped`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediadupe::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((result, summary)) => {
    ///         println!("Found {} duplicate groups", result.len());
    ///         println!("Can reclaim {}", summary.reclaimable_display());
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(&self, path: &Path) -> Result<(ScanResult, ScanSummary), FinderError> {
        let start_time = Instant::now();

        validate_root(path)?;
        let root = absolute_root(path)?;
        let path = root.as_path();
        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        let mut walk_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    walk_errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (result, mut summary) = self.group_files(files)?;
        summary.walk_errors = walk_errors;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} skipped",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.skipped.len()
        );

        Ok((result, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Files are grouped in the order given.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` on shutdown.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(ScanResult, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let (result, mut summary) = self.group_files(files)?;
        summary.scan_duration = start_time.elapsed();
        Ok((result, summary))
    }

    fn group_files(&self, files: Vec<FileRecord>) -> Result<(ScanResult, ScanSummary), FinderError> {
        let mut summary = ScanSummary {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            ..Default::default()
        };

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if files.is_empty() {
            return Ok((ScanResult::default(), summary));
        }

        let results = self.fingerprint_all(files)?;

        if self.config.is_shutdown_requested() {
            log::info!("Fingerprinting interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut accumulator = GroupAccumulator::new();
        for (file, outcome) in results {
            match outcome {
                Ok(fingerprint) => {
                    summary.fingerprinted.increment(file.category);
                    accumulator.insert(fingerprint, file);
                }
                Err(FingerprintError::Interrupted(_)) => return Err(FinderError::Interrupted),
                Err(e) => {
                    log::warn!("Skipping {}: {}", file.path.display(), e);
                    summary.skipped.push(SkippedFile {
                        path: file.path,
                        category: file.category,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::debug!(
            "{} distinct fingerprints over {} files",
            accumulator.distinct_fingerprints(),
            summary.fingerprinted.total()
        );

        let result = accumulator.finish();
        summary.duplicate_groups = result.len();
        summary.duplicate_files = result.duplicate_files();
        summary.reclaimable_space = result.wasted_space();

        Ok((result, summary))
    }

    /// Fingerprint every file on a bounded pool, keeping input order.
    fn fingerprint_all(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<Vec<(FileRecord, Result<Fingerprint, FingerprintError>)>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("fingerprint", files.len());
        }

        log::info!(
            "Fingerprinting {} files on {} threads",
            files.len(),
            self.config.io_threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        let completed = AtomicUsize::new(0);
        let results = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    if self.config.is_shutdown_requested() {
                        let path = file.path.clone();
                        return (file, Err(FingerprintError::Interrupted(path)));
                    }

                    let outcome = self.strategies.fingerprint(&file);
                    if let Ok(ref fp) = outcome {
                        log::trace!("{} -> {}", file.path.display(), fp);
                    }

                    if let Some(ref callback) = self.config.progress_callback {
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, &file.path.to_string_lossy());
                        callback.on_item_completed(file.size);
                    }

                    (file, outcome)
                })
                .collect::<Vec<_>>()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("fingerprint");
        }

        Ok(results)
    }
}

/// Fail fast on a root that cannot be scanned at all.
/// Resolve a relative root against the working directory.
///
/// Absolute roots are kept as given, symlinks included.
fn absolute_root(path: &Path) -> Result<PathBuf, FinderError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::fs::canonicalize(path).map_err(|source| FinderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_root(path: &Path) -> Result<(), FinderError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FinderError::PermissionDenied(path.to_path_buf()));
        }
        Err(source) => {
            return Err(FinderError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }

    match std::fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(FinderError::PermissionDenied(path.to_path_buf()))
        }
        Err(source) => Err(FinderError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
