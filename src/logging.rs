//! Logging setup.
//!
//! Human-readable compact output on stderr, plus an optional JSON-lines file
//! for CI artifacts. `RUST_LOG` overrides the verbosity flags when set.

use crate::error::{ConvertError, Result, ResultExt};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Level for this crate implied by `-q` / `-v` flags.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directive: our crate at the chosen level, dependencies at `warn`.
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> String {
    format!("warn,maestro_allure={}", level_for(verbose, quiet))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| ConvertError::Other(anyhow::anyhow!("Failed to initialize logging: {err}")))
}

/// Test logging; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
