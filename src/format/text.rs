//! Text formatting for terminal output.
//!
//! Plain (non-ANSI) rendering of step trees and conversion summaries:
//! - Status icons (✓ ✗)
//! - Durations as seconds with millisecond precision
//! - Width-aware truncation of step names

use crate::tree::{StepNode, StepStatus, StepTree, TreeStats};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Status icon characters.
pub mod icons {
    /// Passed step (checkmark).
    pub const PASSED: &str = "✓";
    /// Failed step (X mark).
    pub const FAILED: &str = "✗";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub max_width: Option<usize>,
    pub indent: usize,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            max_width: None,
            indent: 2,
        }
    }

    /// Fit lines to the current terminal.
    #[must_use]
    pub fn for_terminal() -> Self {
        Self {
            max_width: Some(terminal_width()),
            ..Self::plain()
        }
    }
}

impl Default for TextFormatOptions {
    fn default() -> Self {
        Self::plain()
    }
}

#[must_use]
pub const fn format_status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => icons::PASSED,
        StepStatus::Failed => icons::FAILED,
    }
}

/// `1500` -> `1.500s`.
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    format!("{}.{:03}s", ms / 1000, ms % 1000)
}

/// Duration of a step, `?` when its start is unknown.
#[must_use]
pub fn format_step_duration(node: &StepNode) -> String {
    match (node.start_ms, node.stop_ms) {
        (Some(start), Some(stop)) => format_duration_ms(stop.saturating_sub(start)),
        _ => "?".to_string(),
    }
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|columns| columns.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(80)
}

/// Truncate text to fit within `max_len` visible columns.
///
/// Handles wide characters (emojis, CJK) correctly using `unicode-width`.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }

    let (target_len, ellipsis) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };

    let mut w = 0;
    let mut s = String::new();
    for c in title.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if w + cw > target_len {
            break;
        }
        w += cw;
        s.push(c);
    }
    s.push_str(ellipsis);
    s
}

/// One step line: `{indent}{icon} {name} ({duration})`.
#[must_use]
pub fn format_step_line(node: &StepNode, depth: usize, options: TextFormatOptions) -> String {
    let indent = " ".repeat(depth * options.indent);
    let icon = format_status_icon(node.status);
    let duration = format!("({})", format_step_duration(node));

    let prefix_len = indent.len() + UnicodeWidthStr::width(icon) + 1;
    let suffix_len = 1 + duration.len();
    let name = options.max_width.map_or_else(
        || node.name.clone(),
        |width| truncate_title(&node.name, width.saturating_sub(prefix_len + suffix_len)),
    );

    format!("{indent}{icon} {name} {duration}")
}

/// Render the whole forest, one line per step, children indented.
#[must_use]
pub fn render_tree(tree: &StepTree, options: TextFormatOptions) -> String {
    fn visit(nodes: &[StepNode], depth: usize, options: TextFormatOptions, out: &mut Vec<String>) {
        for node in nodes {
            out.push(format_step_line(node, depth, options));
            visit(&node.children, depth + 1, options, out);
        }
    }

    let mut lines = Vec::new();
    visit(&tree.roots, 0, options, &mut lines);
    lines.join("\n")
}

/// `Test: <name> | Steps: N (passed: P, failed: F) | Duration: S.SSSs`
#[must_use]
pub fn format_summary_line(test: &str, stats: &TreeStats) -> String {
    format!(
        "Test: {test} | Steps: {} (passed: {}, failed: {}) | Duration: {}",
        stats.total,
        stats.passed,
        stats.failed,
        format_duration_ms(stats.duration_ms)
    )
}
