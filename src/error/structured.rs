//! Structured error output for CI pipelines and scripts.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Credential Errors (exit code 2) ===
    /// No credentials configured
    MissingCredentials,
    /// Remote rejected the credentials
    AuthFailed,

    // === Remote Errors (exit code 3) ===
    /// Non-success HTTP status
    HttpError,
    /// Connection, TLS or timeout failure
    TransportError,
    /// Non-JSON API payload
    UnexpectedContentType,

    // === Input Errors (exit code 4) ===
    /// Start time could not be parsed
    InvalidStartTime,
    /// Local log file missing
    LogNotFound,
    /// Attachment name empty or containing a path separator
    InvalidAttachmentName,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Config file is not valid YAML
    YamlError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::AuthFailed => "AUTH_FAILED",
            Self::HttpError => "HTTP_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::UnexpectedContentType => "UNEXPECTED_CONTENT_TYPE",
            Self::InvalidStartTime => "INVALID_START_TIME",
            Self::LogNotFound => "LOG_NOT_FOUND",
            Self::InvalidAttachmentName => "INVALID_ATTACHMENT_NAME",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Transport failures and server-side statuses may clear on their own;
    /// input and credential errors need the caller to change something.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError | Self::HttpError)
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Credential errors
    /// - 3: Remote errors
    /// - 4: Input errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredentials | Self::AuthFailed => 2,
            Self::HttpError | Self::TransportError | Self::UnexpectedContentType => 3,
            Self::InvalidStartTime | Self::LogNotFound | Self::InvalidAttachmentName => 4,
            Self::ConfigError | Self::YamlError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `ConvertError`.
    #[must_use]
    pub fn from_error(err: &ConvertError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err, code);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &ConvertError) -> (ErrorCode, Option<Value>) {
        match err {
            ConvertError::MissingCredentials { operation } => (
                ErrorCode::MissingCredentials,
                Some(json!({"operation": operation})),
            ),
            ConvertError::AuthFailed { url, username } => (
                ErrorCode::AuthFailed,
                Some(json!({"url": url, "username": username})),
            ),
            ConvertError::HttpStatus { url, status } => (
                ErrorCode::HttpError,
                Some(json!({"url": url, "status": status})),
            ),
            ConvertError::Transport { url, .. } => {
                (ErrorCode::TransportError, Some(json!({"url": url})))
            }
            ConvertError::UnexpectedContentType { url, content_type } => (
                ErrorCode::UnexpectedContentType,
                Some(json!({"url": url, "content_type": content_type})),
            ),
            ConvertError::InvalidStartTime { value } => {
                (ErrorCode::InvalidStartTime, Some(json!({"value": value})))
            }
            ConvertError::LogNotFound { path } => (
                ErrorCode::LogNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            ConvertError::InvalidAttachmentName { name } => (
                ErrorCode::InvalidAttachmentName,
                Some(json!({"name": name})),
            ),
            ConvertError::Config(_) => (ErrorCode::ConfigError, None),
            ConvertError::Io(_) => (ErrorCode::IoError, None),
            ConvertError::Json(_) => (ErrorCode::JsonError, None),
            ConvertError::Yaml(_) => (ErrorCode::YamlError, None),
            ConvertError::WithContext { context, source } => {
                let code = if source.downcast_ref::<std::io::Error>().is_some() {
                    ErrorCode::IoError
                } else {
                    ErrorCode::InternalError
                };
                (code, Some(json!({"context": context})))
            }
            ConvertError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &ConvertError, code: ErrorCode) -> Option<String> {
        if let Some(suggestion) = err.suggestion() {
            return Some(suggestion.to_string());
        }

        match (err, code) {
            (ConvertError::HttpStatus { status, .. }, _) if *status >= 500 => {
                Some("The remote host failed; retry later.".to_string())
            }
            (ConvertError::HttpStatus { status: 404, .. }, _) => {
                Some("Check the build id or log URL.".to_string())
            }
            (_, ErrorCode::YamlError) => {
                Some("Check .maestro-allure.yaml for syntax errors.".to_string())
            }
            _ => None,
        }
    }
}
