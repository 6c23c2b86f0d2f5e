//! Step tree reconstruction.
//!
//! The Maestro log carries no parent pointers: a step is nested under
//! whatever step was open when its `RUNNING` line appeared. The builder
//! keeps a stack of open steps and matches every close event against the
//! nearest open step with the same name, not strictly the top of the
//! stack, so interleaved close lines from sub-flows still pair up.
//!
//! Recovery rules:
//! - a close with no open step of that name becomes a root-level step
//!   whose start and stop are the close timestamp;
//! - a step still open at end of input is closed as failed with
//!   `stop == start`.
//!
//! Two same-named steps open at different depths are resolved by recency
//! (the most recently opened wins). For a sub-flow that calls itself this
//! can pair a close with the wrong invocation; the log gives no way to tell.

use crate::parser::{EventKind, LogEvent, parse_log};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Terminal status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Passed,
    Failed,
}

impl StepStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Status implied by a close event; `None` for `Start`.
    #[must_use]
    pub const fn from_close(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Complete => Some(Self::Passed),
            EventKind::Fail => Some(Self::Failed),
            EventKind::Start => None,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed step with relative timestamps (ms since local midnight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNode {
    pub name: String,
    pub start_ms: Option<u64>,
    pub stop_ms: Option<u64>,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StepNode>,
}

/// True if any node at any depth failed.
///
/// Every subtree is visited; a passed parent does not hide a failed child.
#[must_use]
pub fn any_failed(nodes: &[StepNode]) -> bool {
    nodes
        .iter()
        .any(|node| node.status.is_failed() || any_failed(&node.children))
}

/// The reconstructed forest plus the log's time bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTree {
    pub roots: Vec<StepNode>,
    /// Timestamp of the first event that carried one.
    pub first_ms: Option<u64>,
    /// Latest timestamp seen on a close event.
    pub last_ms: Option<u64>,
}

/// Step counts and duration of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl StepTree {
    /// Build the tree from an ordered event stream.
    #[must_use]
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = LogEvent>,
    {
        let mut builder = TreeBuilder::new();
        for event in events {
            builder.push(event);
        }
        builder.finish()
    }

    /// Parse raw log text and build its tree.
    #[must_use]
    pub fn from_log(text: &str) -> Self {
        Self::from_events(parse_log(text))
    }

    /// Depth-first, pre-order view of every node.
    #[must_use]
    pub fn flatten(&self) -> Vec<&StepNode> {
        fn visit<'a>(nodes: &'a [StepNode], out: &mut Vec<&'a StepNode>) {
            for node in nodes {
                out.push(node);
                visit(&node.children, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.roots, &mut out);
        out
    }

    #[must_use]
    pub fn any_failed(&self) -> bool {
        any_failed(&self.roots)
    }

    /// Observed span between the first event and the last close, 0 if unknown.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        match (self.first_ms, self.last_ms) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let flat = self.flatten();
        let failed = flat.iter().filter(|node| node.status.is_failed()).count();
        TreeStats {
            total: flat.len(),
            passed: flat.len() - failed,
            failed,
            duration_ms: self.duration_ms(),
        }
    }
}

/// Step still being built; children are arena indices.
#[derive(Debug)]
struct PendingNode {
    name: String,
    start_ms: Option<u64>,
    stop_ms: Option<u64>,
    status: Option<StepStatus>,
    children: Vec<usize>,
}

/// Incremental, single-pass tree builder.
///
/// Nodes live in an arena while the stack of open steps refers to them by
/// index; [`TreeBuilder::finish`] moves them into the owned tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Vec<PendingNode>,
    roots: Vec<usize>,
    open: Vec<usize>,
    first_ms: Option<u64>,
    last_ms: Option<u64>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps currently open.
    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// Feed the next event in log order.
    pub fn push(&mut self, event: LogEvent) {
        if self.first_ms.is_none() {
            self.first_ms = event.timestamp_ms;
        }

        debug!(
            name = %event.name,
            kind = %event.kind,
            timestamp_ms = ?event.timestamp_ms,
            depth = self.open.len(),
            "Step event"
        );

        match StepStatus::from_close(event.kind) {
            None => self.open_step(event.name, event.timestamp_ms),
            Some(status) => self.close_step(event.name, event.timestamp_ms, status),
        }
    }

    fn alloc(&mut self, node: PendingNode) -> usize {
        self.arena.push(node);
        self.arena.len() - 1
    }

    fn open_step(&mut self, name: String, timestamp_ms: Option<u64>) {
        let id = self.alloc(PendingNode {
            name,
            start_ms: timestamp_ms,
            stop_ms: None,
            status: None,
            children: Vec::new(),
        });

        match self.open.last() {
            Some(&parent) => self.arena[parent].children.push(id),
            None => self.roots.push(id),
        }
        self.open.push(id);
    }

    fn close_step(&mut self, name: String, timestamp_ms: Option<u64>, status: StepStatus) {
        let position = self
            .open
            .iter()
            .rposition(|&id| self.arena[id].name == name);

        if let Some(position) = position {
            let id = self.open.remove(position);
            let node = &mut self.arena[id];
            node.stop_ms = timestamp_ms.or(node.start_ms);
            node.status = Some(status);
        } else {
            warn!(
                name = %name,
                timestamp_ms = ?timestamp_ms,
                %status,
                "Close event without a matching RUNNING line; recording as root step"
            );
            let id = self.alloc(PendingNode {
                name,
                start_ms: timestamp_ms,
                stop_ms: timestamp_ms,
                status: Some(status),
                children: Vec::new(),
            });
            self.roots.push(id);
        }

        if let Some(ts) = timestamp_ms {
            self.last_ms = Some(self.last_ms.map_or(ts, |last| last.max(ts)));
        }
    }

    /// Close whatever is still open and return the finished tree.
    #[must_use]
    pub fn finish(mut self) -> StepTree {
        debug!(
            steps = self.arena.len(),
            still_open = self.open_depth(),
            "Finishing step tree"
        );
        while let Some(id) = self.open.pop() {
            let node = &mut self.arena[id];
            warn!(
                name = %node.name,
                start_ms = ?node.start_ms,
                "Step never closed; marking as failed"
            );
            node.stop_ms = node.start_ms;
            node.status = Some(StepStatus::Failed);
        }

        let root_ids = std::mem::take(&mut self.roots);
        let roots = root_ids
            .into_iter()
            .map(|id| materialize(&mut self.arena, id))
            .collect();

        StepTree {
            roots,
            first_ms: self.first_ms,
            last_ms: self.last_ms,
        }
    }
}

fn materialize(arena: &mut [PendingNode], id: usize) -> StepNode {
    let pending = &mut arena[id];
    let name = std::mem::take(&mut pending.name);
    let child_ids = std::mem::take(&mut pending.children);
    let start_ms = pending.start_ms;
    let stop_ms = pending.stop_ms;
    let status = pending.status.unwrap_or(StepStatus::Failed);

    let children = child_ids
        .into_iter()
        .map(|child| materialize(arena, child))
        .collect();

    StepNode {
        name,
        start_ms,
        stop_ms,
        status,
        children,
    }
}
