//! Progress indicators for batch conversions.
//!
//! Bars and spinners draw to stderr only when it is a terminal, so piped
//! runs in CI stay clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};
use std::time::Duration;

/// Progress is shown only if stderr is an interactive terminal.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Determinate bar counting converted tests.
///
/// # Panics
/// Panics if the progress bar template string is invalid.
#[must_use]
pub fn create_progress_bar(total: u64, message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tests {msg}")
                .expect("valid template")
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Spinner for remote calls whose size is unknown up front.
///
/// # Panics
/// Panics if the spinner template string is invalid.
#[must_use]
pub fn create_spinner(message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if show {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Bar wrapper that decides visibility once at construction.
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(total: u64, message: &str) -> Self {
        Self {
            bar: create_progress_bar(total, message, should_show_progress()),
        }
    }

    #[must_use]
    pub fn new_spinner(message: &str) -> Self {
        Self {
            bar: create_spinner(message, should_show_progress()),
        }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
