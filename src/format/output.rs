//! JSON output shapes for `--json` mode.

use crate::report::overall_status;
use crate::tree::{StepNode, StepStatus, StepTree, TreeStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// One converted test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub name: String,
    pub uuid: Uuid,
    pub history_id: Uuid,
    pub status: StepStatus,
    pub steps: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub result_file: PathBuf,
    pub attachment_file: PathBuf,
}

/// Output of `convert` and `build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertSummary {
    pub out_dir: PathBuf,
    pub container: Uuid,
    pub tests: Vec<TestSummary>,
}

/// Output of `tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOutput {
    pub status: StepStatus,
    pub first_ms: Option<u64>,
    pub last_ms: Option<u64>,
    pub stats: TreeStats,
    pub steps: Vec<StepNode>,
}

impl From<StepTree> for TreeOutput {
    fn from(tree: StepTree) -> Self {
        let status = overall_status(&tree);
        let stats = tree.stats();
        Self {
            status,
            first_ms: tree.first_ms,
            last_ms: tree.last_ms,
            stats,
            steps: tree.roots,
        }
    }
}
