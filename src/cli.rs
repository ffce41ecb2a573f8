//! Command-line interface definitions for mediadupe.
//!
//! Global options (verbosity, error format) come before the subcommand.
//! Scan options left unset fall back to the loaded [`Config`].
//!
//! # Example
//!
//! ```bash
//! # Text report
//! mediadupe scan ~/Pictures
//!
//! # JSON report with SHA-256 for generic files
//! mediadupe scan ~/Downloads --output json --algorithm sha256
//!
//! # Debug logging, custom ffmpeg
//! mediadupe -v scan ~/Videos --ffmpeg /opt/ffmpeg/bin/ffmpeg
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::fingerprint::DigestAlgorithm;

/// Media-aware duplicate file finder.
///
/// Generic files are compared by content digest, images by perceptual hash,
/// audio by averaged MFCCs and videos by their first frame.
#[derive(Debug, Parser)]
#[command(name = "mediadupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Digest for generic files and video frames [default: blake3]
    #[arg(short, long, value_enum)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Number of fingerprint worker threads [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Follow symbolic links during scan
    ///
    /// Symlink loops are reported and skipped.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// Added to the patterns from the config file.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// ffmpeg executable used to decode video frames [default: ffmpeg]
    #[arg(long = "ffmpeg", value_name = "PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Configuration file (TOML)
    ///
    /// If not specified, the platform-specific default is used when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ScanArgs {
    /// Overlay the flags given on the command line onto `config`.
    #[must_use]
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(threads) = self.io_threads {
            config.io_threads = usize::from(threads);
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        if let Some(ref ffmpeg) = self.ffmpeg_path {
            config.ffmpeg_path = ffmpeg.clone();
        }
        config
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
