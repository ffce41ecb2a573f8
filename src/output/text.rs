//! Plain-text report.
//!
//! ```text
//! [1] image, 3 files, 180.0 KiB
//!     /photos/a.jpg
//!     /photos/b.png
//!     /photos/copy/a.jpg
//!
//! 42 files scanned (1.2 MiB): 1 duplicate group, 2 duplicate files, 120.0 KiB reclaimable
//! Skipped 1 file:
//!     /photos/broken.jpg: Failed to decode /photos/broken.jpg: ...
//! ```

use std::io;

use crate::duplicates::{format_size, ScanResult, ScanSummary};

/// Text output formatter.
pub struct TextOutput<'a> {
    result: &'a ScanResult,
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(result: &'a ScanResult, summary: &'a ScanSummary) -> Self {
        Self { result, summary }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        if self.result.is_empty() {
            writeln!(writer, "No duplicates found.")?;
        }

        for (idx, group) in self.result.iter().enumerate() {
            writeln!(
                writer,
                "[{}] {}, {} files, {}",
                idx + 1,
                group.category(),
                group.len(),
                format_size(group.total_size())
            )?;
            for file in &group.files {
                writeln!(writer, "    {}", file.path.display())?;
            }
            writeln!(writer)?;
        }

        let summary = self.summary;
        writeln!(
            writer,
            "{} files scanned ({}): {} duplicate {}, {} duplicate {}, {} reclaimable",
            summary.total_files,
            summary.total_size_display(),
            summary.duplicate_groups,
            plural(summary.duplicate_groups, "group", "groups"),
            summary.duplicate_files,
            plural(summary.duplicate_files, "file", "files"),
            summary.reclaimable_display()
        )?;

        if !summary.skipped.is_empty() {
            writeln!(
                writer,
                "Skipped {} {}:",
                summary.skipped.len(),
                plural(summary.skipped.len(), "file", "files")
            )?;
            for skipped in &summary.skipped {
                writeln!(writer, "    {}: {}", skipped.path.display(), skipped.reason)?;
            }
        }

        if !summary.walk_errors.is_empty() {
            writeln!(writer, "Unreadable entries: {}", summary.walk_errors.len())?;
            for error in &summary.walk_errors {
                writeln!(writer, "    {}", error)?;
            }
        }

        writer.flush()
    }

    /// Render the report into a string.
    ///
    /// # Errors
    ///
    /// Never fails in practice; writing to a `Vec` is infallible.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
