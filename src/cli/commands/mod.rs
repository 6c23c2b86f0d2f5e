//! Command implementations.

pub mod build;
pub mod completions;
pub mod convert;
pub mod tree;
pub mod version;

use crate::config::{CliOverrides, Settings, load_settings};
use crate::error::Result;
use crate::format::TestSummary;
use crate::report::{ScenarioMeta, assemble};
use crate::tree::StepTree;
use crate::writer::ResultsWriter;
use serde::Serialize;
use std::env;

/// Settings for a run started in the current directory.
///
/// # Errors
///
/// Returns an error if the working directory or a config file cannot be read.
pub fn current_settings(overrides: &CliOverrides) -> Result<Settings> {
    load_settings(&env::current_dir()?, overrides)
}

/// Convert one log and write its attachment and result document.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_test(
    writer: &ResultsWriter,
    log_text: &str,
    meta: &ScenarioMeta,
) -> Result<TestSummary> {
    let tree = StepTree::from_log(log_text);
    let attachment_file = writer.write_attachment(&meta.attachment_source, log_text)?;
    let result = assemble(&tree, meta);
    let result_file = writer.write_result(&result)?;
    let stats = tree.stats();

    Ok(TestSummary {
        name: result.name,
        uuid: result.uuid,
        history_id: result.history_id,
        status: result.status,
        steps: stats.total,
        passed: stats.passed,
        failed: stats.failed,
        duration_ms: stats.duration_ms,
        result_file,
        attachment_file,
    })
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
