//! Layered application configuration.
//!
//! Sources are merged with figment, later sources winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config FILE`, or `config.toml` in the platform config dir)
//! 3. `MEDIADUPE_*` environment variables (`__` separates nested keys,
//!    e.g. `MEDIADUPE_EXTRA_EXTENSIONS__IMAGE`)
//! 4. Command-line flags, applied by the CLI after loading
//!
//! ```toml
//! io_threads = 8
//! algorithm = "sha256"
//! follow_symlinks = false
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ffmpeg_path = "/usr/local/bin/ffmpeg"
//!
//! [extra_extensions]
//! image = ["webp", "gif"]
//! audio = ["ogg"]
//! video = ["webm", "mov"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::fingerprint::DigestAlgorithm;
use crate::scanner::{ExtensionTable, MediaCategory, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MEDIADUPE_";

/// Extensions added to the built-in classifier table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraExtensions {
    /// Treated as images
    pub image: Vec<String>,
    /// Treated as audio
    pub audio: Vec<String>,
    /// Treated as video
    pub video: Vec<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint worker threads.
    pub io_threads: usize,
    /// Digest for generic files and video frames.
    pub algorithm: DigestAlgorithm,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    /// ffmpeg executable used for video frames.
    pub ffmpeg_path: PathBuf,
    /// Additional extension mappings.
    pub extra_extensions: ExtraExtensions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            algorithm: DigestAlgorithm::default(),
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            ffmpeg_path: PathBuf::from(crate::fingerprint::video::DEFAULT_FFMPEG),
            extra_extensions: ExtraExtensions::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, a TOML file and the environment.
    ///
    /// With `path = None` the platform default file is used if it exists.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given file is missing, or if any source
    /// contains a value of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path(),
        };

        let config: Self = Self::figment(file.as_deref())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Invalid configuration")?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Defaults merged with an optional TOML file, without the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(file) => figment.merge(Toml::file(file)),
            None => figment,
        }
    }

    /// Platform-specific `config.toml` location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mediadupe", "mediadupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Classifier table with the configured extras.
    #[must_use]
    pub fn extension_table(&self) -> ExtensionTable {
        ExtensionTable::new()
            .with_extra(MediaCategory::Image, &self.extra_extensions.image)
            .with_extra(MediaCategory::Audio, &self.extra_extensions.audio)
            .with_extra(MediaCategory::Video, &self.extra_extensions.video)
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_follow_symlinks(self.follow_symlinks)
            .with_ignore_patterns(self.ignore_patterns.clone())
            .with_extensions(self.extension_table())
    }
}
