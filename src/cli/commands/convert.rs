//! Single-log conversion.

use super::{current_settings, print_json, write_test};
use crate::cli::ConvertArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ConvertSummary, format_summary_line};
use crate::report::{ScenarioMeta, TestContainer};
use crate::source::{HttpClient, fetch_text};
use crate::tree::TreeStats;
use crate::util::parse_start_time_ms;
use crate::writer::ResultsWriter;

/// File name of the raw log in single-log mode.
pub const RAW_LOG_FILE: &str = "_raw_maestro_log.txt";

/// Execute the convert command.
///
/// # Errors
///
/// Returns an error if the start time is malformed, the log cannot be
/// fetched, or the results cannot be written.
pub fn execute(args: &ConvertArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = current_settings(overrides)?;
    let anchor = args
        .start_time
        .as_deref()
        .map(parse_start_time_ms)
        .transpose()?;

    let client = HttpClient::new(settings.credentials.clone(), settings.timeout);
    let log_text = fetch_text(&args.source, &client)?;

    let writer = ResultsWriter::create(&settings.out_dir)?;
    let meta = ScenarioMeta::new(&settings.suite, &settings.test, RAW_LOG_FILE).with_anchor(anchor);
    let summary = write_test(&writer, &log_text, &meta)?;

    let container = TestContainer::new(&settings.suite, vec![summary.uuid]);
    writer.write_container(&container)?;

    if json {
        return print_json(&ConvertSummary {
            out_dir: settings.out_dir,
            container: container.uuid,
            tests: vec![summary],
        });
    }

    let stats = TreeStats {
        total: summary.steps,
        passed: summary.passed,
        failed: summary.failed,
        duration_ms: summary.duration_ms,
    };
    println!("Wrote Allure results to: {}", settings.out_dir.display());
    println!("{}", format_summary_line(&summary.name, &stats));
    Ok(())
}
