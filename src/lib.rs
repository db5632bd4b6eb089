//! Report an unrecoverable invariant violation on standard error and abort.
//!
//! ```no_run
//! use fatalreport::{check, report_fatal};
//!
//! let index: usize = 7;
//! check!(index < 4, "index {} past the end", index);
//! report_fatal("value {} out of range", &[42.into()]);
//! ```

pub mod arg;
mod assert;
pub mod config;
pub mod fatal;
pub mod template;

pub use arg::FatalArg;
pub use config::{ConfigError, ReporterConfig};
pub use fatal::{report_fatal, report_fatal_fmt, write_report, write_report_fmt};
pub use template::{render, RenderError};
