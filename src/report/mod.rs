//! Allure 2 result assembly.
//!
//! Turns a [`StepTree`] (relative times) into the documents Allure reads
//! from a results directory:
//! - [`TestResult`] - one `<uuid>-result.json` per converted log
//! - [`TestContainer`] - one `<uuid>-container.json` grouping a batch
//!
//! Field names follow the Allure 2 JSON schema (`historyId`, `fullName`,
//! ...); optional lists are omitted when empty.

mod timebase;

pub use timebase::TimeBase;

use crate::tree::{StepNode, StepStatus, StepTree};
use crate::util::{history_key, new_document_id, now_epoch_ms};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment name Allure shows for the raw log.
pub const RAW_LOG_ATTACHMENT_NAME: &str = "_raw_maestro_log";
/// MIME type of the raw log attachment.
pub const RAW_LOG_MIME: &str = "text/plain";

/// Allure execution stage. Converted logs are always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Finished,
}

/// `name`/`value` pair used for labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// `name`/`value` pair shown in Allure's parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

impl Link {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            link_type: link_type.into(),
        }
    }
}

/// Reference to a file stored next to the result document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub source: String,
}

impl Attachment {
    /// The raw Maestro log, stored under `source` in the results directory.
    #[must_use]
    pub fn raw_log(source: impl Into<String>) -> Self {
        Self {
            name: RAW_LOG_ATTACHMENT_NAME.to_string(),
            mime_type: RAW_LOG_MIME.to_string(),
            source: source.into(),
        }
    }
}

/// A step with absolute (epoch ms) timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultStep {
    pub name: String,
    pub status: StepStatus,
    pub stage: Stage,
    pub start: i64,
    pub stop: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ResultStep>,
}

impl ResultStep {
    /// Shift a relative node and all of its descendants.
    #[must_use]
    pub fn from_node(node: &StepNode, base: &TimeBase) -> Self {
        Self {
            name: node.name.clone(),
            status: node.status,
            stage: Stage::Finished,
            start: base.shift(node.start_ms),
            stop: base.shift(node.stop_ms.or(node.start_ms)),
            steps: node
                .children
                .iter()
                .map(|child| Self::from_node(child, base))
                .collect(),
        }
    }
}

/// One Allure test result document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub uuid: Uuid,
    pub history_id: Uuid,
    pub name: String,
    pub full_name: String,
    pub status: StepStatus,
    pub stage: Stage,
    pub start: i64,
    pub stop: i64,
    pub steps: Vec<ResultStep>,
    pub attachments: Vec<Attachment>,
    pub labels: Vec<Label>,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Allure container grouping the results of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestContainer {
    pub uuid: Uuid,
    pub name: String,
    pub children: Vec<Uuid>,
    pub befores: Vec<serde_json::Value>,
    pub afters: Vec<serde_json::Value>,
    pub links: Vec<Link>,
}

impl TestContainer {
    /// Container named after the suite, listing `children` in order.
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Uuid>) -> Self {
        Self {
            uuid: new_document_id(),
            name: name.into(),
            children,
            befores: Vec::new(),
            afters: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// Identity and metadata of the scenario a log belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioMeta {
    pub suite: String,
    pub test: String,
    /// Extra history seed, e.g. device/OS/session of a matrix cell.
    pub history_discriminator: Option<String>,
    /// Known calendar start of the first event, epoch ms.
    pub anchor_epoch_ms: Option<i64>,
    /// File name of the stored raw log.
    pub attachment_source: String,
    pub extra_labels: Vec<Label>,
    pub parameters: Vec<Parameter>,
    pub links: Vec<Link>,
}

impl ScenarioMeta {
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        test: impl Into<String>,
        attachment_source: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            history_discriminator: None,
            anchor_epoch_ms: None,
            attachment_source: attachment_source.into(),
            extra_labels: Vec::new(),
            parameters: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor_epoch_ms: Option<i64>) -> Self {
        self.anchor_epoch_ms = anchor_epoch_ms;
        self
    }

    #[must_use]
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.history_discriminator = Some(discriminator.into());
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.extra_labels = labels;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    /// Default labels followed by the caller's extras.
    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        let mut labels = vec![
            Label::new("suite", &self.suite),
            Label::new("framework", "maestro"),
            Label::new("language", "yaml"),
        ];
        labels.extend(self.extra_labels.iter().cloned());
        labels
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}: {}", self.suite, self.test)
    }
}

/// Overall status: failed if any step anywhere failed.
#[must_use]
pub fn overall_status(tree: &StepTree) -> StepStatus {
    if tree.any_failed() {
        StepStatus::Failed
    } else {
        StepStatus::Passed
    }
}

/// Assemble a result using the current wall clock for the fallback anchor.
#[must_use]
pub fn assemble(tree: &StepTree, meta: &ScenarioMeta) -> TestResult {
    assemble_at(tree, meta, now_epoch_ms())
}

/// Assemble a result with an explicit "now" (epoch ms).
#[must_use]
pub fn assemble_at(tree: &StepTree, meta: &ScenarioMeta, now_ms: i64) -> TestResult {
    let base = TimeBase::resolve(tree.first_ms, tree.last_ms, meta.anchor_epoch_ms, now_ms);

    let start = match tree.first_ms {
        Some(first) => base.shift(Some(first)),
        None => now_ms,
    };
    let stop = match (tree.first_ms, tree.last_ms) {
        (Some(_), Some(last)) => base.shift(Some(last)),
        _ => start,
    };

    let status = overall_status(tree);
    let history_id = history_key(
        &meta.suite,
        &meta.test,
        meta.history_discriminator.as_deref(),
    );

    tracing::info!(
        test = %meta.test,
        %status,
        steps = tree.roots.len(),
        %history_id,
        "Assembled Allure result"
    );

    TestResult {
        uuid: new_document_id(),
        history_id,
        name: meta.test.clone(),
        full_name: meta.full_name(),
        status,
        stage: Stage::Finished,
        start,
        stop,
        steps: tree
            .roots
            .iter()
            .map(|node| ResultStep::from_node(node, &base))
            .collect(),
        attachments: vec![Attachment::raw_log(&meta.attachment_source)],
        labels: meta.labels(),
        parameters: meta.parameters.clone(),
        links: meta.links.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{EventKind, LogEvent};

    const NOW: i64 = 1_750_000_000_000;

    fn sample_tree() -> StepTree {
        StepTree::from_events([
            LogEvent::new(Some(1000), "Launch app", EventKind::Start),
            LogEvent::new(Some(2500), "Launch app", EventKind::Complete),
            LogEvent::new(Some(3000), "Tap button", EventKind::Start),
            LogEvent::new(Some(3000), "Tap button", EventKind::Fail),
        ])
    }

    #[test]
    fn test_assemble_with_anchor() {
        let anchor = 1_747_748_315_000;
        let meta = ScenarioMeta::new("Suite", "Login", "_raw_maestro_log.txt")
            .with_anchor(Some(anchor));
        let result = assemble_at(&sample_tree(), &meta, NOW);

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.start, anchor);
        assert_eq!(result.stop, anchor + 2000);
        assert_eq!(result.steps[0].start, anchor);
        assert_eq!(result.steps[0].stop, anchor + 1500);
        assert_eq!(result.steps[1].start, anchor + 2000);
        assert_eq!(result.full_name, "Suite: Login");
    }

    #[test]
    fn test_assemble_without_anchor_ends_now() {
        let meta = ScenarioMeta::new("Suite", "Login", "raw.txt");
        let result = assemble_at(&sample_tree(), &meta, NOW);
        assert_eq!(result.stop, NOW);
        assert_eq!(result.start, NOW - 2000);
    }

    #[test]
    fn test_assemble_empty_tree() {
        let meta = ScenarioMeta::new("Suite", "Empty", "raw.txt");
        let result = assemble_at(&StepTree::default(), &meta, NOW);
        assert_eq!(result.status, StepStatus::Passed);
        assert_eq!((result.start, result.stop), (NOW, NOW));
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_default_labels_precede_extras() {
        let meta = ScenarioMeta::new("Suite", "T", "raw.txt")
            .with_labels(vec![Label::new("host", "Pixel 7")]);
        let names: Vec<_> = meta.labels().into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["suite", "framework", "language", "host"]);
    }

    #[test]
    fn test_result_json_shape() {
        let meta = ScenarioMeta::new("Suite", "Login", "raw.txt")
            .with_links(vec![Link::new("Session", "https://example.test", "BrowserStack")]);
        let result = assemble_at(&sample_tree(), &meta, NOW);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["fullName"], "Suite: Login");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "finished");
        assert!(json["historyId"].is_string());
        assert_eq!(json["attachments"][0]["name"], RAW_LOG_ATTACHMENT_NAME);
        assert_eq!(json["attachments"][0]["type"], "text/plain");
        assert_eq!(json["links"][0]["type"], "BrowserStack");
        assert!(json["steps"][0].get("steps").is_none());
    }

    #[test]
    fn test_links_omitted_when_empty() {
        let meta = ScenarioMeta::new("Suite", "Login", "raw.txt");
        let json = serde_json::to_value(assemble_at(&sample_tree(), &meta, NOW)).unwrap();
        assert!(json.get("links").is_none());
        assert_eq!(json["parameters"], serde_json::json!([]));
    }

    #[test]
    fn test_container_shape() {
        let ids = vec![new_document_id(), new_document_id()];
        let container = TestContainer::new("Suite", ids.clone());
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["name"], "Suite");
        assert_eq!(json["children"][1], ids[1].to_string());
        assert_eq!(json["befores"], serde_json::json!([]));
        assert_eq!(json["afters"], serde_json::json!([]));
        assert_eq!(json["links"], serde_json::json!([]));
    }

    #[test]
    fn test_history_id_stable_across_assemblies() {
        let meta = ScenarioMeta::new("Suite", "Login", "raw.txt").with_discriminator("d|a|1|s");
        let a = assemble_at(&sample_tree(), &meta, NOW);
        let b = assemble_at(&sample_tree(), &meta, NOW + 10);
        assert_eq!(a.history_id, b.history_id);
        assert_ne!(a.uuid, b.uuid);
    }
}
