//! BrowserStack App Automate (Maestro v2) build enumeration.
//!
//! A build lists devices, each device lists sessions, and each session
//! lists test cases with a link to their plain-text Maestro log. Every test
//! case becomes one [`RemoteTest`].

use crate::error::Result;
use crate::report::{Label, Link, Parameter, ScenarioMeta};
use crate::source::HttpClient;
use crate::util::{matrix_discriminator, parse_start_time};
use serde::Deserialize;
use serde_json::Value;

/// Dashboard root used for session links.
pub const DASHBOARD_BASE: &str = "https://app-automate.browserstack.com/dashboard/v2";

const UNKNOWN: &str = "unknown";

#[derive(Debug, Default, Deserialize)]
pub struct BuildPayload {
    #[serde(default)]
    pub devices: Option<Vec<DevicePayload>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DevicePayload {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub os_version: Option<Value>,
    #[serde(default)]
    pub sessions: Option<Vec<SessionRef>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionRef {
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionPayload {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub testcases: Option<TestcaseRoot>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestcaseRoot {
    #[serde(default)]
    pub data: Option<Vec<TestcaseGroup>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestcaseGroup {
    #[serde(default)]
    pub testcases: Option<Vec<TestcasePayload>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestcasePayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub maestro_log: Option<String>,
    #[serde(default)]
    pub maestrologs: Option<String>,
}

/// Device facts with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device: String,
    pub os: String,
    pub os_version: String,
    pub session_ids: Vec<String>,
}

impl From<DevicePayload> for DeviceInfo {
    fn from(payload: DevicePayload) -> Self {
        let session_ids = payload
            .sessions
            .unwrap_or_default()
            .into_iter()
            .filter_map(|session| session.id.as_ref().and_then(value_text))
            .collect();

        Self {
            device: non_empty(payload.device).unwrap_or_else(|| UNKNOWN.to_string()),
            os: non_empty(payload.os)
                .map_or_else(|| "android".to_string(), |os| os.to_lowercase()),
            os_version: payload
                .os_version
                .as_ref()
                .and_then(value_text)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            session_ids,
        }
    }
}

/// One test case of one session on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTest {
    pub id: String,
    pub name: String,
    pub device: String,
    pub os: String,
    pub os_version: String,
    pub session_id: String,
    pub build_id: String,
    pub log_url: String,
    /// Session start, epoch ms.
    pub anchor_epoch_ms: Option<i64>,
}

impl RemoteTest {
    /// File name of the stored raw log.
    #[must_use]
    pub fn attachment_name(&self) -> String {
        format!("_raw_{}_maestro_log.txt", self.id)
    }

    #[must_use]
    pub fn session_url(&self) -> String {
        format!(
            "{DASHBOARD_BASE}/builds/{}/sessions/{}",
            self.build_id, self.session_id
        )
    }

    #[must_use]
    pub fn discriminator(&self) -> String {
        matrix_discriminator(&self.device, &self.os, &self.os_version, &self.session_id)
    }

    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        vec![
            Label::new("host", &self.device),
            Label::new("thread", &self.os),
        ]
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new("device", &self.device),
            Parameter::new("os_version", &self.os_version),
            Parameter::new("os", &self.os),
        ]
    }

    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        vec![Link::new(
            "Browserstack session",
            self.session_url(),
            "BrowserStack",
        )]
    }

    /// Metadata for assembling this test's result.
    #[must_use]
    pub fn scenario_meta(&self, suite: &str) -> ScenarioMeta {
        ScenarioMeta::new(suite, &self.name, self.attachment_name())
            .with_anchor(self.anchor_epoch_ms)
            .with_discriminator(self.discriminator())
            .with_labels(self.labels())
            .with_parameters(self.parameters())
            .with_links(self.links())
    }
}

/// Test cases of one session. Cases without a log URL are skipped.
#[must_use]
pub fn tests_from_session(
    build_id: &str,
    device: &DeviceInfo,
    session_id: &str,
    session: SessionPayload,
) -> Vec<RemoteTest> {
    let anchor_epoch_ms = session
        .start_time
        .as_deref()
        .and_then(parse_start_time)
        .map(|time| time.timestamp_millis());

    let groups = session
        .testcases
        .and_then(|root| root.data)
        .unwrap_or_default();

    let mut tests = Vec::new();
    for (index, case) in groups
        .into_iter()
        .flat_map(|group| group.testcases.unwrap_or_default())
        .enumerate()
    {
        let id = case.id.as_ref().and_then(value_text);
        let name = non_empty(case.name).unwrap_or_else(|| {
            format!("Test {}", id.as_deref().unwrap_or(UNKNOWN))
        });
        // Id-less cases still need distinct attachment files.
        let id = id.unwrap_or_else(|| format!("{UNKNOWN}_{session_id}_{index}"));

        let Some(log_url) = non_empty(case.maestro_log).or_else(|| non_empty(case.maestrologs))
        else {
            tracing::warn!(
                test_id = %id,
                session_id,
                device = %device.device,
                "No Maestro text log URL for test; skipping"
            );
            continue;
        };

        tests.push(RemoteTest {
            id,
            name,
            device: device.device.clone(),
            os: device.os.clone(),
            os_version: device.os_version.clone(),
            session_id: session_id.to_string(),
            build_id: build_id.to_string(),
            log_url,
            anchor_epoch_ms,
        });
    }
    tests
}

/// Client for the Maestro v2 API.
pub struct BrowserStackClient<'a> {
    http: &'a HttpClient,
    api_base: String,
}

impl<'a> BrowserStackClient<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Devices of a build.
    ///
    /// # Errors
    ///
    /// Transport, HTTP, content-type or decoding failures.
    pub fn devices(&self, build_id: &str) -> Result<Vec<DeviceInfo>> {
        let build: BuildPayload = self.http.get_json(&self.endpoint(&format!("builds/{build_id}")))?;
        Ok(build
            .devices
            .unwrap_or_default()
            .into_iter()
            .map(DeviceInfo::from)
            .collect())
    }

    /// One session's details.
    ///
    /// # Errors
    ///
    /// Transport, HTTP, content-type or decoding failures.
    pub fn session(&self, build_id: &str, session_id: &str) -> Result<SessionPayload> {
        self.http.get_json(
            &self.endpoint(&format!("builds/{build_id}/sessions/{session_id}")),
        )
    }

    /// Every test case with a log across all devices and sessions, in
    /// API order.
    ///
    /// # Errors
    ///
    /// The first failing API call aborts the listing.
    pub fn tests_for_build(&self, build_id: &str) -> Result<Vec<RemoteTest>> {
        let mut tests = Vec::new();
        for device in self.devices(build_id)? {
            for session_id in &device.session_ids {
                let session = self.session(build_id, session_id)?;
                tests.extend(tests_from_session(build_id, &device, session_id, session));
            }
        }
        tracing::info!(build_id, tests = tests.len(), "Listed BrowserStack tests");
        Ok(tests)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Text form of a scalar JSON value; `None` for null, empty or compound.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
