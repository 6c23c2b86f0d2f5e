//! Configuration management for `maestro_allure`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables
//! 3. Project config (./.maestro-allure.yaml)
//! 4. User config (~/.config/maestro-allure/config.yaml)
//! 5. Defaults

use crate::error::{ConvertError, OptionExt, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".maestro-allure.yaml";
/// Default output directory for Allure results.
pub const DEFAULT_OUT_DIR: &str = "./allure-results";
/// Default suite name.
pub const DEFAULT_SUITE: &str = "Maestro / Android";
/// Default test name for single-log conversions.
pub const DEFAULT_TEST: &str = "Maestro Scenario";
/// Default network timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default BrowserStack Maestro API base URL.
pub const DEFAULT_API_BASE: &str = "https://api-cloud.browserstack.com/app-automate/maestro/v2";

const ENV_PREFIX: &str = "MAESTRO_ALLURE_";

const KNOWN_KEYS: &[&str] = &[
    "suite",
    "test",
    "out-dir",
    "username",
    "access-key",
    "timeout",
    "api-base",
];

/// A flat layer of `key -> value` settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from an explicit set of variables.
    ///
    /// `MAESTRO_ALLURE_*` wins over the plain `BROWSERSTACK_*` names.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        let mut fallback = Self::default();

        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            } else {
                match key.as_str() {
                    "BROWSERSTACK_USERNAME" => fallback.insert("username", value),
                    "BROWSERSTACK_ACCESS_KEY" => fallback.insert("access-key", value),
                    _ => {}
                }
            }
        }

        fallback.merge_from(&layer);
        fallback
    }

    /// Value for a normalized key, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Insert under the normalized key. Unknown keys are dropped.
    pub fn insert(&mut self, key: &str, value: String) {
        let key = normalize_key(key);
        if KNOWN_KEYS.contains(&key.as_str()) {
            self.values.insert(key, value);
        } else {
            tracing::debug!(key = %key, "Ignoring unknown config key");
        }
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub suite: Option<String>,
    pub test: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub username: Option<String>,
    pub access_key: Option<String>,
    pub timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(suite) = &self.suite {
            layer.insert("suite", suite.clone());
        }
        if let Some(test) = &self.test {
            layer.insert("test", test.clone());
        }
        if let Some(path) = &self.out_dir {
            layer.insert("out-dir", path.to_string_lossy().to_string());
        }
        if let Some(username) = &self.username {
            layer.insert("username", username.clone());
        }
        if let Some(access_key) = &self.access_key {
            layer.insert("access-key", access_key.clone());
        }
        if let Some(timeout) = self.timeout {
            layer.insert("timeout", timeout.to_string());
        }

        layer
    }
}

/// BrowserStack username and access key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
}

impl Credentials {
    /// Both halves must be non-empty.
    #[must_use]
    pub fn new(username: &str, access_key: &str) -> Option<Self> {
        let username = username.trim();
        let access_key = access_key.trim();
        if username.is_empty() || access_key.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            access_key: access_key.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"***")
            .finish()
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub suite: String,
    pub test: String,
    pub out_dir: PathBuf,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            suite: DEFAULT_SUITE.to_string(),
            test: DEFAULT_TEST.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Settings {
    /// Resolve typed settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns a config error if `timeout` is not a whole number of seconds.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();

        let timeout = match layer.get("timeout") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .ok_or_config(&format!("timeout must be whole seconds, got '{raw}'"))?;
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let credentials = Credentials::new(
            layer.get("username").unwrap_or_default(),
            layer.get("access-key").unwrap_or_default(),
        );

        Ok(Self {
            suite: non_empty(layer.get("suite")).unwrap_or(defaults.suite),
            test: non_empty(layer.get("test")).unwrap_or(defaults.test),
            out_dir: non_empty(layer.get("out-dir")).map_or(defaults.out_dir, PathBuf::from),
            credentials,
            timeout,
            api_base: non_empty(layer.get("api-base"))
                .map_or(defaults.api_base, |base| base.trim_end_matches('/').to_string()),
        })
    }

    /// Credentials or a missing-credentials error naming `operation`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when no complete pair is configured.
    pub fn require_credentials(&self, operation: &str) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ConvertError::missing_credentials(operation))
    }
}

/// Load project config (./.maestro-allure.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&dir.join(PROJECT_CONFIG_FILE))
}

/// Load user config (~/.config/maestro-allure/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("maestro-allure")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load configuration with the full precedence chain.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or a value
/// is malformed.
pub fn load_settings(project_dir: &Path, cli: &CliOverrides) -> Result<Settings> {
    let user = load_user_config()?;
    let project = load_project_config(project_dir)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    let merged = ConfigLayer::merge_layers(&[user, project, env_layer, cli_layer]);
    Settings::from_layer(&merged)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    if let serde_yaml::Value::Mapping(map) = value {
        for (key, value) in map {
            let Some(key) = key.as_str() else {
                continue;
            };
            if let Some(value) = yaml_scalar_to_string(value) {
                layer.insert(key, value);
            }
        }
    }
    layer
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
