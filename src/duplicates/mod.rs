//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Running a scan end to end ([`DuplicateFinder`])
//! - Accumulating files by fingerprint ([`GroupAccumulator`])
//! - Duplicate group management ([`DuplicateGroup`], [`ScanResult`])

pub mod finder;
pub mod groups;

pub use finder::{
    format_size, CategoryCounts, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
    SkippedFile,
};
pub use groups::{DuplicateGroup, GroupAccumulator, ScanResult};
