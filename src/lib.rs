//! mediadupe - media-aware duplicate file finder
//!
//! Files are grouped by a fingerprint chosen from their extension:
//! generic files by content digest, images by perceptual hash, audio by
//! averaged MFCCs and videos by a digest of their first frame. Only
//! files of the same category with equal fingerprints are grouped.
//!
//! ```no_run
//! use mediadupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (result, _summary) = finder.find_duplicates(Path::new("/photos"))?;
//! for (fingerprint, paths) in result.into_map() {
//!     println!("{}: {:?}", fingerprint, paths);
//! }
//! # Ok::<(), mediadupe::duplicates::FinderError>(())
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the parsed command line and report the exit code.
///
/// Logging is not initialised here; see [`logging::init_logging`].
///
/// # Errors
///
/// Returns an error if configuration is invalid, the scan fails
/// fatally, or the report cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Scan(ref args) => run_scan(args, cli.quiet),
    }
}

fn run_scan(args: &ScanArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let config = args.apply_to(Config::load(args.config.as_deref())?);
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler()?;

    // JSON goes to stdout for scripts; keep stderr free of bars too
    let show_progress = !quiet && args.output == OutputFormat::Text;
    let progress = Arc::new(Progress::new(!show_progress));

    let finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_algorithm(config.algorithm)
        .with_walker_config(config.walker_config())
        .with_ffmpeg_path(config.ffmpeg_path.clone())
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone());

    if show_progress {
        logging::attach_progress(progress.multi());
    }
    let finder = DuplicateFinder::new(finder_config);
    let scanned = finder.find_duplicates(&args.path);
    logging::detach_progress();
    let (result, summary) =
        scanned.with_context(|| format!("Scan of {} failed", args.path.display()))?;

    let exit_code = ExitCode::from_scan(&result, &summary);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&result, &summary)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&result, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON report")?,
    }
    out.flush()?;

    Ok(exit_code)
}
