//! File type classification by extension.
//!
//! The category of a file decides which fingerprint strategy is applied to
//! it. Classification only looks at the file name: the extension is the
//! text after the final `.`, compared case-insensitively. Names without a
//! `.` have an empty extension.
//!
//! | Category | Extensions          |
//! |----------|---------------------|
//! | Image    | `jpg` `jpeg` `png`  |
//! | Audio    | `mp3` `wav` `flac`  |
//! | Video    | `mp4` `avi` `mkv`   |
//! | Generic  | everything else     |
//!
//! [`ExtensionTable`] can map additional extensions, but never removes or
//! remaps the built-in ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv"];

/// Media category of a file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// Any file without a media-specific strategy.
    #[default]
    Generic,
    /// Still image.
    Image,
    /// Audio track.
    Audio,
    /// Video file.
    Video,
}

impl MediaCategory {
    /// All categories, in declaration order.
    pub const ALL: [MediaCategory; 4] = [Self::Generic, Self::Image, Self::Audio, Self::Video];

    /// Lowercase name used in fingerprints and output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Built-in extensions for this category (empty for `Generic`).
    #[must_use]
    pub fn builtin_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Generic => &[],
            Self::Image => IMAGE_EXTENSIONS,
            Self::Audio => AUDIO_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the lowercased extension of a file name.
///
/// # Examples
///
/// ```
/// use mediadupe::scanner::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), "jpg");
/// assert_eq!(extension_of("archive.tar.gz"), "gz");
/// assert_eq!(extension_of("README"), "");
/// ```
#[must_use]
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) => file_name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Classify a file name with the built-in table.
///
/// # Examples
///
/// ```
/// use mediadupe::scanner::{classify, MediaCategory};
///
/// assert_eq!(classify("clip.MKV"), MediaCategory::Video);
/// assert_eq!(classify("notes.txt"), MediaCategory::Generic);
/// ```
#[must_use]
pub fn classify(file_name: &str) -> MediaCategory {
    builtin_category(&extension_of(file_name)).unwrap_or(MediaCategory::Generic)
}

fn builtin_category(extension: &str) -> Option<MediaCategory> {
    MediaCategory::ALL
        .into_iter()
        .find(|category| category.builtin_extensions().contains(&extension))
}

/// Extension-to-category lookup table.
///
/// Starts from the built-in table; extra extensions can be registered
/// for any category. Built-in entries always win over extras.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTable {
    extra: HashMap<String, MediaCategory>,
}

impl ExtensionTable {
    /// Create a table with only the built-in entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register additional extensions for a category.
    ///
    /// Extensions are matched case-insensitively; a leading `.` is ignored.
    #[must_use]
    pub fn with_extra<I, S>(mut self, category: MediaCategory, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                continue;
            }
            if let Some(builtin) = builtin_category(&ext) {
                if builtin != category {
                    log::warn!(
                        "Ignoring extra extension '{}' for {}: already mapped to {}",
                        ext,
                        category,
                        builtin
                    );
                }
                continue;
            }
            self.extra.insert(ext, category);
        }
        self
    }

    /// Classify a file name.
    #[must_use]
    pub fn classify(&self, file_name: &str) -> MediaCategory {
        let ext = extension_of(file_name);
        builtin_category(&ext)
            .or_else(|| self.extra.get(&ext).copied())
            .unwrap_or(MediaCategory::Generic)
    }

    /// Number of extra extensions registered.
    #[must_use]
    pub fn extra_len(&self) -> usize {
        self.extra.len()
    }
}
