//! Error types and handling for `maestro_allure`.
//!
//! The conversion core (parsing, tree building, report assembly) never
//! fails: malformed input is recovered locally. Every variant here comes
//! from the surrounding I/O layer (credentials, HTTP, files, config).
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for collaborator failures
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for CI pipelines

mod context;
mod structured;

pub use context::{OptionExt, ResultExt};
pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `maestro_allure` operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    // === Credential Errors ===
    /// A command needs BrowserStack credentials but none were configured.
    #[error("BrowserStack credentials required for {operation}")]
    MissingCredentials { operation: String },

    /// The remote host rejected the credentials (HTTP 401).
    #[error("BrowserStack auth failed (401) for {url}. Using username: {username}")]
    AuthFailed { url: String, username: String },

    // === Remote Errors ===
    /// Non-success HTTP status from a remote log or API endpoint.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// API endpoint answered with something other than JSON.
    #[error("Expected JSON from {url}, got content-type={content_type:?}")]
    UnexpectedContentType { url: String, content_type: String },

    // === Input Errors ===
    /// Start-time anchor string could not be parsed.
    #[error("Invalid start time '{value}': expected 'YYYY-MM-DD HH:MM:SS +HHMM' or '... UTC'")]
    InvalidStartTime { value: String },

    /// Attachment file name is empty or path-like.
    #[error("Invalid attachment file name: '{name}'")]
    InvalidAttachmentName { name: String },

    /// Local log file not found.
    #[error("Log file not found: '{path}'")]
    LogNotFound { path: PathBuf },

    // === Configuration Errors ===
    /// Configuration value or file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. }
                | Self::AuthFailed { .. }
                | Self::InvalidStartTime { .. }
                | Self::LogNotFound { .. }
                | Self::InvalidAttachmentName { .. }
                | Self::Config(_)
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredentials { .. } => Some(
                "Use --username/--access-key or set BROWSERSTACK_USERNAME/BROWSERSTACK_ACCESS_KEY",
            ),
            Self::AuthFailed { .. } => Some("Check the BrowserStack username and access key"),
            Self::InvalidStartTime { .. } => {
                Some("Example: --start-time \"2025-05-20 13:38:35 +0000\"")
            }
            Self::LogNotFound { .. } => Some("Pass an existing file path or an http(s) URL"),
            Self::Transport { .. } => Some("Check network access or raise --timeout"),
            _ => None,
        }
    }

    /// Create a missing-credentials error for the named operation.
    #[must_use]
    pub fn missing_credentials(operation: impl Into<String>) -> Self {
        Self::MissingCredentials {
            operation: operation.into(),
        }
    }

    /// Create an invalid start-time error.
    #[must_use]
    pub fn invalid_start_time(value: impl Into<String>) -> Self {
        Self::InvalidStartTime {
            value: value.into(),
        }
    }
}

/// Result type using `ConvertError`.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::HttpStatus {
            url: "https://example.test/log".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://example.test/log");
    }

    #[test]
    fn test_auth_failed_names_username() {
        let err = ConvertError::AuthFailed {
            url: "https://api.test/builds/1".to_string(),
            username: "ci-bot".to_string(),
        };
        assert!(err.to_string().contains("Using username: ci-bot"));
    }

    #[test]
    fn test_user_recoverable() {
        assert!(ConvertError::missing_credentials("build").is_user_recoverable());
        assert!(ConvertError::invalid_start_time("yesterday").is_user_recoverable());

        let not_recoverable = ConvertError::Io(std::io::Error::other("disk full"));
        assert!(!not_recoverable.is_user_recoverable());
    }

    #[test]
    fn test_suggestion() {
        let err = ConvertError::missing_credentials("build");
        assert!(err.suggestion().unwrap().contains("BROWSERSTACK_USERNAME"));

        let err = ConvertError::Config("bad".to_string());
        assert_eq!(err.suggestion(), None);
    }
}
