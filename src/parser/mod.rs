//! Maestro log line parsing.
//!
//! Recognizes runner step events of the shape
//!
//! ```text
//! 12:01:02.345 [ INFO ] maestro.cli.runner.TestSuiteInteractor.invoke: Tap on "Login" RUNNING
//! ```
//!
//! and ignores everything else the runner prints. Step names may span
//! several physical lines (UI element descriptors are rendered multi-line),
//! so lines are first grouped into records: a record starts at a line that
//! begins with a timestamp and absorbs the following untimestamped lines,
//! of which only a short window may continue a step name.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Event line head: timestamp, level and invoker, then the rest of the
/// line. The invoker is matched loosely because the emitting class differs
/// between Maestro versions.
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<time>\d{2}:\d{2}:\d{2}\.\d{3})\s+\[\s*\w+\s*\]\s+(?P<invoker>[\w$.]*(?:TestSuiteInteractor|MaestroCommandRunner)[\w$.]*):\s+(?P<rest>.*)$",
    )
    .expect("event prefix regex")
});

/// State word closing a step name, anchored at the end of one physical line.
static STATE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?P<state>RUNNING|COMPLETED|FAILED)\s*$").expect("state tail regex")
});

/// Continuation lines a step name may span (multi-line UI element
/// descriptors). Anything longer is output, not a name.
pub const MAX_CONTINUATION_LINES: usize = 8;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h>\d{2}):(?P<m>\d{2}):(?P<s>\d{2})\.(?P<ms>\d{3})").expect("time regex")
});

static RECORD_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}\.\d{3}\s").expect("record start regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Lifecycle state carried by an event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `RUNNING`: a step opened.
    Start,
    /// `COMPLETED`: a step closed successfully.
    Complete,
    /// `FAILED`: a step closed with a failure.
    Fail,
}

impl EventKind {
    #[must_use]
    pub fn from_state(state: &str) -> Option<Self> {
        match state {
            "RUNNING" => Some(Self::Start),
            "COMPLETED" => Some(Self::Complete),
            "FAILED" => Some(Self::Fail),
            _ => None,
        }
    }

    /// The runner's spelling of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "RUNNING",
            Self::Complete => "COMPLETED",
            Self::Fail => "FAILED",
        }
    }

    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(self, Self::Complete | Self::Fail)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized step event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since local midnight, `None` if the digits were out of range.
    pub timestamp_ms: Option<u64>,
    /// Whitespace-normalized step name.
    pub name: String,
    pub kind: EventKind,
}

impl LogEvent {
    #[must_use]
    pub fn new(timestamp_ms: Option<u64>, name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            timestamp_ms,
            name: name.into(),
            kind,
        }
    }
}

/// Convert `HH:MM:SS.mmm` into milliseconds since midnight.
///
/// Returns `None` when the shape does not match or a field is out of range.
#[must_use]
pub fn parse_hms_ms(time: &str) -> Option<u64> {
    let caps = TIME_RE.captures(time)?;
    let field = |name: &str| caps.name(name)?.as_str().parse::<u64>().ok();

    let hours = field("h")?;
    let minutes = field("m")?;
    let seconds = field("s")?;
    let millis = field("ms")?;

    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(((hours * 3600 + minutes * 60 + seconds) * 1000) + millis)
}

/// Collapse every whitespace run (newlines and tabs included) to one space
/// and trim the ends.
#[must_use]
pub fn normalize_step_name(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Parse a single record (one line, or several joined with `\n`).
#[must_use]
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let lines: Vec<&str> = line.split('\n').collect();
    parse_record(&lines)
}

/// Stack-trace frames and causes never continue a step name.
fn is_trace_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("at ") || trimmed.starts_with("Caused by:") || trimmed.starts_with("... ")
}

/// State word at the end of `line` and the text before it.
fn split_state(line: &str) -> Option<(&str, EventKind)> {
    let caps = STATE_TAIL_RE.captures(line)?;
    let state = caps.name("state")?;
    let whole = caps.get(0)?;
    Some((&line[..whole.start()], EventKind::from_state(state.as_str())?))
}

/// Parse the event a record starts with.
///
/// The head line is matched once. A state word ending the head line closes
/// the event right away, so trailing output (stack traces, hierarchy dumps)
/// is never scanned. Otherwise the name grows over at most
/// [`MAX_CONTINUATION_LINES`] following lines, stopping at the first
/// stack-trace line.
fn parse_record(lines: &[&str]) -> Option<LogEvent> {
    let (head, continuation) = lines.split_first()?;
    let caps = PREFIX_RE.captures(head.trim_end_matches('\r'))?;
    let timestamp_ms = parse_hms_ms(caps.name("time")?.as_str());
    let rest = caps.name("rest")?.as_str();

    if let Some((name, kind)) = split_state(rest) {
        return (!name.trim().is_empty())
            .then(|| LogEvent::new(timestamp_ms, normalize_step_name(name), kind));
    }

    let mut name = rest.to_string();
    for line in continuation.iter().take(MAX_CONTINUATION_LINES) {
        let line = line.trim_end_matches('\r');
        if is_trace_line(line) {
            return None;
        }
        if let Some((tail, kind)) = split_state(line) {
            name.push('\n');
            name.push_str(tail);
            let name = normalize_step_name(&name);
            return (!name.is_empty()).then(|| LogEvent::new(timestamp_ms, name, kind));
        }
        name.push('\n');
        name.push_str(line);
    }
    None
}

/// Split raw log text into records keyed on leading timestamps.
#[must_use]
pub fn split_records(text: &str) -> Vec<Vec<&str>> {
    let mut records: Vec<Vec<&str>> = Vec::new();

    for line in text.lines() {
        if RECORD_START_RE.is_match(line) {
            records.push(vec![line]);
        } else if let Some(current) = records.last_mut() {
            current.push(line);
        }
    }

    records
}

/// Parse a whole log into its ordered step events.
#[must_use]
pub fn parse_log(text: &str) -> Vec<LogEvent> {
    let records = split_records(text);
    let events: Vec<LogEvent> = records
        .iter()
        .filter_map(|record| parse_record(record))
        .collect();

    tracing::debug!(
        records = records.len(),
        events = events.len(),
        "Parsed Maestro log"
    );
    events
}
