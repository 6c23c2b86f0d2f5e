//! Output formatting for `maestro_allure`.
//!
//! Human-readable text for terminals, JSON for pipelines. With `--json`,
//! stdout carries only the JSON document and diagnostics go to stderr.
//!
//! # Output Types
//!
//! - [`ConvertSummary`] - files written by `convert` / `build`
//! - [`TreeOutput`] - reconstructed steps printed by `tree`

mod output;
mod text;

pub use output::{ConvertSummary, TestSummary, TreeOutput};
pub use text::{
    TextFormatOptions, format_duration_ms, format_status_icon, format_step_duration,
    format_step_line, format_summary_line, icons, render_tree, terminal_width, truncate_title,
};
