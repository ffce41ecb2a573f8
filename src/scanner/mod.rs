//! Scanner module for directory traversal and file classification.
//!
//! This module provides functionality for:
//! - Deterministic directory walking using jwalk
//! - Mapping file extensions to a [`MediaCategory`]
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`classifier`]: Extension table and category lookup
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} [{}]: {} bytes", file.path.display(), file.category, file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod classifier;
pub mod walker;

use std::path::PathBuf;

pub use classifier::{classify, extension_of, ExtensionTable, MediaCategory};
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// Records are created at walk time and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file under the walk root; absolute for finder scans
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Category selected from the file's extension
    pub category: MediaCategory,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, category: MediaCategory) -> Self {
        Self {
            path,
            size,
            category,
        }
    }

    /// Create a record whose category is taken from the default extension table.
    #[must_use]
    pub fn classified(path: PathBuf, size: u64) -> Self {
        let category = path
            .file_name()
            .map(|name| classify(&name.to_string_lossy()))
            .unwrap_or_default();
        Self::new(path, size, category)
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Loops are reported as walk errors and skipped.
    pub follow_symlinks: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,

    /// Extension table used to classify discovered files.
    pub extensions: ExtensionTable,
}

impl WalkerConfig {
    /// Set symlink following.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set the ignore patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Set the extension table.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionTable) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Non-fatal errors that can occur while walking a directory tree.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry disappeared between listing and inspection.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A symbolic link points back into one of its own ancestors.
    #[error("Symlink loop at {0}")]
    SymlinkLoop(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path of the entry that produced this error.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::SymlinkLoop(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
