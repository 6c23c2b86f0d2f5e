//! `maestro_allure` - Maestro UI test logs to Allure 2 results.
//!
//! The pipeline is:
//! 1. [`parser`] turns raw log records into [`parser::LogEvent`]s.
//! 2. [`tree`] rebuilds the nested step forest from the flat event stream.
//! 3. [`report`] anchors the forest in calendar time and assembles the
//!    Allure result and container documents.
//!
//! Everything else ([`source`], [`browserstack`], [`writer`], [`cli`]) is
//! I/O around those three stages.

pub mod browserstack;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod parser;
pub mod report;
pub mod source;
pub mod tree;
pub mod util;
pub mod writer;

pub use error::{ConvertError, ErrorCode, Result, StructuredError};
