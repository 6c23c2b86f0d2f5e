//! Log retrieval.
//!
//! A source is either an `http(s)://` URL or a local path. Remote sources go
//! through [`HttpClient`], which also serves the BrowserStack API.

use crate::config::Credentials;
use crate::error::{ConvertError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

/// Upper bound on a downloaded body. Device logs can be large.
const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// `User-Agent` sent with every request.
#[must_use]
pub fn user_agent() -> String {
    format!("maestro-allure/{}", env!("CARGO_PKG_VERSION"))
}

/// True for `http://` and `https://` sources.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `Authorization` header value for HTTP Basic auth.
#[must_use]
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let token = STANDARD.encode(format!(
        "{}:{}",
        credentials.username, credentials.access_key
    ));
    format!("Basic {token}")
}

/// Map a response status to an error. 2xx passes.
///
/// # Errors
///
/// `AuthFailed` for 401, `HttpStatus` for any other non-2xx status.
pub fn check_status(url: &str, status: u16, credentials: Option<&Credentials>) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        401 => Err(ConvertError::AuthFailed {
            url: url.to_string(),
            username: credentials.map_or_else(|| "<none>".to_string(), |c| c.username.clone()),
        }),
        _ => Err(ConvertError::HttpStatus {
            url: url.to_string(),
            status,
        }),
    }
}

/// Require a JSON content type (`application/json`, `...+json`).
///
/// # Errors
///
/// `UnexpectedContentType` otherwise.
pub fn check_json_content_type(url: &str, content_type: Option<&str>) -> Result<()> {
    let value = content_type.unwrap_or_default();
    let mime = value.split(';').next().unwrap_or_default().trim();
    let lower = mime.to_ascii_lowercase();
    if lower == "application/json" || lower.ends_with("+json") {
        Ok(())
    } else {
        Err(ConvertError::UnexpectedContentType {
            url: url.to_string(),
            content_type: value.to_string(),
        })
    }
}

/// Blocking HTTP client with optional Basic auth and a global timeout.
pub struct HttpClient {
    agent: ureq::Agent,
    credentials: Option<Credentials>,
}

impl HttpClient {
    #[must_use]
    pub fn new(credentials: Option<Credentials>, timeout: Duration) -> Self {
        let agent = ureq::config::Config::builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, credentials }
    }

    fn get(&self, url: &str, accept: &str) -> Result<ureq::http::Response<ureq::Body>> {
        tracing::debug!(url, "GET");
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", user_agent())
            .header("Accept", accept);
        if let Some(credentials) = &self.credentials {
            request = request.header("Authorization", basic_auth_header(credentials));
        }

        let response = request.call().map_err(|source| ConvertError::Transport {
            url: url.to_string(),
            source: Box::new(source),
        })?;
        check_status(url, response.status().as_u16(), self.credentials.as_ref())?;
        Ok(response)
    }

    fn read_body(url: &str, response: ureq::http::Response<ureq::Body>) -> Result<Vec<u8>> {
        let mut body = response.into_body();
        body.with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(|source| ConvertError::Transport {
                url: url.to_string(),
                source: Box::new(source),
            })
    }

    /// Fetch a text body. Invalid UTF-8 is replaced.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx statuses.
    pub fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url, "text/plain, */*")?;
        let bytes = Self::read_body(url, response)?;
        tracing::debug!(url, bytes = bytes.len(), "Fetched text");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetch and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses, a non-JSON content type or a
    /// body that does not decode into `T`.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url, "application/json")?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        check_json_content_type(url, content_type.as_deref())?;

        let bytes = Self::read_body(url, response)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Read a local log file. Invalid UTF-8 is replaced.
///
/// # Errors
///
/// `LogNotFound` for a missing path; other I/O errors pass through.
pub fn read_local(path: &Path) -> Result<String> {
    match fs::read(path) {
        Ok(bytes) => {
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read local log");
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ConvertError::LogNotFound {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Fetch log text from a URL or a local path.
///
/// # Errors
///
/// See [`HttpClient::get_text`] and [`read_local`].
pub fn fetch_text(source: &str, client: &HttpClient) -> Result<String> {
    if is_remote(source) {
        client.get_text(source.trim())
    } else {
        read_local(Path::new(source))
    }
}
