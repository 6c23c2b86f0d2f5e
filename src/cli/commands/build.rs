//! Whole-build conversion from BrowserStack.

use super::{current_settings, print_json, write_test};
use crate::browserstack::BrowserStackClient;
use crate::cli::BuildArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::ConvertSummary;
use crate::report::TestContainer;
use crate::source::{HttpClient, fetch_text};
use crate::util::progress::ProgressTracker;
use crate::writer::ResultsWriter;

/// Execute the build command.
///
/// # Errors
///
/// Returns an error if credentials are missing, an API call or log download
/// fails, or the results cannot be written.
pub fn execute(args: &BuildArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = current_settings(overrides)?;
    let credentials = settings.require_credentials("--build-id")?.clone();
    let http = HttpClient::new(Some(credentials), settings.timeout);
    let client = BrowserStackClient::new(&http, &settings.api_base);

    let spinner = ProgressTracker::new_spinner(&format!("Listing tests of build {}...", args.build_id));
    let listed = client.tests_for_build(&args.build_id);
    spinner.finish_and_clear();
    let tests = listed?;

    let writer = ResultsWriter::create(&settings.out_dir)?;
    let progress = ProgressTracker::new(u64::try_from(tests.len()).unwrap_or(u64::MAX), "Converting");
    let mut summaries = Vec::with_capacity(tests.len());

    for test in &tests {
        progress.set_message(format!("{} on {}", test.name, test.device));
        let log_text = fetch_text(&test.log_url, &http)?;
        summaries.push(write_test(&writer, &log_text, &test.scenario_meta(&settings.suite))?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let container = TestContainer::new(
        &settings.suite,
        summaries.iter().map(|summary| summary.uuid).collect(),
    );
    writer.write_container(&container)?;

    if json {
        return print_json(&ConvertSummary {
            out_dir: settings.out_dir,
            container: container.uuid,
            tests: summaries,
        });
    }

    println!("Wrote Allure results to: {}", settings.out_dir.display());
    println!(
        "Converted {} BrowserStack test(s) from build {}.",
        summaries.len(),
        args.build_id
    );
    Ok(())
}
