//! Logging setup.
//!
//! `log` facade with an `env_logger` backend. The level comes from, in
//! priority order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `-v` / `-vv` (debug / trace)
//! 3. Default: info
//!
//! Skipped files are logged at warn, per-file fingerprints at trace.
//!
//! While progress bars are drawing, records are written through
//! [`MultiProgress::suspend`] so a log line never lands inside a bar.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::RwLock;

use env_logger::{Builder, Target, WriteStyle};
use indicatif::MultiProgress;
use log::LevelFilter;

/// Progress display that log output must step around, if any.
static PROGRESS_TARGET: RwLock<Option<MultiProgress>> = RwLock::new(None);

/// Suspend `multi` around every log record until [`detach_progress`].
pub fn attach_progress(multi: &MultiProgress) {
    if let Ok(mut target) = PROGRESS_TARGET.write() {
        *target = Some(multi.clone());
    }
}

/// Write log records straight to stderr again.
pub fn detach_progress() {
    if let Ok(mut target) = PROGRESS_TARGET.write() {
        *target = None;
    }
}

/// Stderr writer that clears the attached progress bars while writing.
struct SuspendingStderr;

impl Write for SuspendingStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let multi = PROGRESS_TARGET.read().ok().and_then(|target| target.clone());
        match multi {
            Some(multi) => multi.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Initialize logging from the CLI verbosity flags.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    builder
        .target(Target::Pipe(Box::new(SuspendingStderr)))
        .write_style(if io::stderr().is_terminal() {
            WriteStyle::Always
        } else {
            WriteStyle::Never
        });
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }

    builder.format(move |buf, record| {
        let level_style = buf.default_level_style(record.level());
        if verbose >= 1 {
            let timestamp = buf.timestamp_seconds();
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                timestamp,
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                record.level(),
                record.args()
            )
        }
    });

    if builder.try_init().is_ok() && !use_env {
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
