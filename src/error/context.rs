//! Context helpers for attaching a message to foreign errors.

use super::{ConvertError, Result};

/// Extension trait adding context to fallible results.
pub trait ResultExt<T> {
    /// Wrap the error with a static context message.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::WithContext` when `self` is an error.
    fn context(self, context: &str) -> Result<T>;

    /// Wrap the error with a lazily built context message.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::WithContext` when `self` is an error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|source| ConvertError::WithContext {
            context: context.to_string(),
            source: Box::new(source),
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|source| ConvertError::WithContext {
            context: f(),
            source: Box::new(source),
        })
    }
}

/// Extension trait turning `None` into a configuration error.
pub trait OptionExt<T> {
    /// Convert `None` into `ConvertError::Config` with the given message.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Config` when `self` is `None`.
    fn ok_or_config(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config(self, message: &str) -> Result<T> {
        self.ok_or_else(|| ConvertError::Config(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_context_wraps_source() {
        let failed: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("boom"));
        let err = failed.context("write result file").unwrap_err();
        assert_eq!(err.to_string(), "write result file: boom");
    }

    #[test]
    fn test_option_ok_or_config() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_config("out-dir is empty").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
        assert_eq!(Some(3).ok_or_config("unused").unwrap(), 3);
    }
}
