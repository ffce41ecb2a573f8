//! Output formatters for duplicate scan results.
//!
//! - [`text`]: human-readable report (default)
//! - [`json`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::duplicates::DuplicateFinder;
//! use mediadupe::error::ExitCode;
//! use mediadupe::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (result, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let code = ExitCode::from_scan(&result, &summary);
//! let output = JsonOutput::new(&result, &summary, code);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
