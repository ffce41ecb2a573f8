//! Duplicate groups and the per-scan accumulator.
//!
//! # Overview
//!
//! [`GroupAccumulator`] collects fingerprinted files under their
//! [`Fingerprint`] in the order they are offered. [`GroupAccumulator::finish`]
//! drops every group with a single member and returns a [`ScanResult`].
//!
//! # Example
//!
//! ```
//! use mediadupe::duplicates::GroupAccumulator;
//! use mediadupe::fingerprint::Fingerprint;
//! use mediadupe::scanner::{FileRecord, MediaCategory};
//! use std::path::PathBuf;
//!
//! let fp = Fingerprint::new(MediaCategory::Generic, "abc");
//! let mut acc = GroupAccumulator::new();
//! acc.insert(fp.clone(), FileRecord::classified(PathBuf::from("/a.txt"), 3));
//! acc.insert(fp, FileRecord::classified(PathBuf::from("/b.txt"), 3));
//! acc.insert(
//!     Fingerprint::new(MediaCategory::Generic, "def"),
//!     FileRecord::classified(PathBuf::from("/c.txt"), 3),
//! );
//!
//! let result = acc.finish();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.groups()[0].len(), 2);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::fingerprint::Fingerprint;
use crate::scanner::{FileRecord, MediaCategory};

/// Files sharing one fingerprint.
///
/// Members are in walk discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Shared fingerprint
    pub fingerprint: Fingerprint,
    /// Member files
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, files: Vec<FileRecord>) -> Self {
        Self { fingerprint, files }
    }

    /// Category shared by every member.
    #[must_use]
    pub fn category(&self) -> MediaCategory {
        self.fingerprint.category
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (all files minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total size of all files in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Bytes held by every copy except the largest one.
    ///
    /// Media groups can have members of different sizes (e.g. the same
    /// picture saved twice), so the largest file is assumed kept.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        let largest = self.files.iter().map(|f| f.size).max().unwrap_or(0);
        self.total_size() - largest
    }

    /// Member paths in discovery order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// All duplicate groups found by one scan.
///
/// Groups are ordered by the discovery position of their first member;
/// callers must not depend on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    groups: Vec<DuplicateGroup>,
}

impl ScanResult {
    /// Retained groups.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateGroup> {
        self.groups.iter()
    }

    /// Look up the group for a fingerprint.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| &g.fingerprint == fingerprint)
    }

    /// Total redundant copies across all groups.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Total reclaimable bytes across all groups.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }

    /// Consume into a fingerprint → paths map.
    #[must_use]
    pub fn into_map(self) -> HashMap<Fingerprint, Vec<PathBuf>> {
        self.groups
            .into_iter()
            .map(|g| {
                let paths = g.files.into_iter().map(|f| f.path).collect();
                (g.fingerprint, paths)
            })
            .collect()
    }
}

impl IntoIterator for ScanResult {
    type Item = DuplicateGroup;
    type IntoIter = std::vec::IntoIter<DuplicateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a DuplicateGroup;
    type IntoIter = std::slice::Iter<'a, DuplicateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Accumulates fingerprinted files for a single scan.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    /// Group slot per fingerprint, in first-seen order
    index: HashMap<Fingerprint, usize>,
    slots: Vec<(Fingerprint, Vec<FileRecord>)>,
}

impl GroupAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the group for `fingerprint`.
    pub fn insert(&mut self, fingerprint: Fingerprint, file: FileRecord) {
        debug_assert_eq!(
            fingerprint.category, file.category,
            "fingerprint category {} does not match file category {}",
            fingerprint.category, file.category
        );
        match self.index.get(&fingerprint) {
            Some(&slot) => self.slots[slot].1.push(file),
            None => {
                self.index.insert(fingerprint.clone(), self.slots.len());
                self.slots.push((fingerprint, vec![file]));
            }
        }
    }

    /// Number of distinct fingerprints seen so far.
    #[must_use]
    pub fn distinct_fingerprints(&self) -> usize {
        self.slots.len()
    }

    /// Keep only groups with two or more members.
    #[must_use]
    pub fn finish(self) -> ScanResult {
        let groups = self
            .slots
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(fingerprint, files)| {
                log::debug!("Duplicate group {}: {} files", fingerprint, files.len());
                DuplicateGroup::new(fingerprint, files)
            })
            .collect();
        ScanResult { groups }
    }
}
