//! Identifier generation for Allure documents.
//!
//! Allure correlates reruns of a test through `historyId`. Two rules:
//! - the same logical scenario must always map to the same key, so a
//!   rerun lands in the same history;
//! - independent matrix cells (different device, OS or session) must map
//!   to different keys, or Allure folds them together as retries.
//!
//! Keys are name-based UUIDv5 values in the URL namespace.

use uuid::Uuid;

/// Fresh random identifier for a result or container document.
#[must_use]
pub fn new_document_id() -> Uuid {
    Uuid::new_v4()
}

/// Seed string hashed into the history key.
///
/// `suite:test`, plus `:discriminator` when one is given and non-empty.
#[must_use]
pub fn history_seed(suite: &str, test: &str, discriminator: Option<&str>) -> String {
    match discriminator.filter(|value| !value.is_empty()) {
        Some(value) => format!("{suite}:{test}:{value}"),
        None => format!("{suite}:{test}"),
    }
}

/// Deterministic history key for a (suite, test, discriminator) triple.
#[must_use]
pub fn history_key(suite: &str, test: &str, discriminator: Option<&str>) -> Uuid {
    let seed = history_seed(suite, test, discriminator);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes())
}

/// Discriminator for one BrowserStack matrix cell.
#[must_use]
pub fn matrix_discriminator(device: &str, os: &str, os_version: &str, session_id: &str) -> String {
    format!("{device}|{os}|{os_version}|{session_id}")
}
