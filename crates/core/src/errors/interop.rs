//! Conversions from foreign errors and context helpers

use super::types::{Error, Result};
use std::path::PathBuf;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "access".to_string(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json {
            message: source.to_string(),
            source,
        }
    }
}

/// Work closures written against `anyhow` fail like any other unit of work
impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Error::Execution {
            message: error.to_string(),
            source: Some(error.into()),
        }
    }
}

/// Attach a description of what was being attempted to an error
///
/// The result is an [`Error::Context`] whose source is the original error,
/// so its variant stays reachable through [`Error::root`].
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    fn with_context<F>(self, describe: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::context(message, e.into()))
    }

    fn with_context<F>(self, describe: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::context(describe(), e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_anyhow_becomes_execution_with_source() {
        let error = Error::from(anyhow::anyhow!("upstream returned 503"));
        assert!(matches!(error, Error::Execution { .. }));
        assert!(error.to_string().contains("upstream returned 503"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_context_keeps_original_error() {
        let parsed: std::result::Result<u32, serde_json::Error> = serde_json::from_str("nope");
        let error = parsed.context("reading coreSize").unwrap_err();

        assert!(matches!(error, Error::Context { .. }));
        assert!(error.to_string().starts_with("reading coreSize: JSON error"));
        assert!(matches!(error.root(), Error::Json { .. }));

        // The chain still reaches the serde_json error underneath
        let source = error.source().expect("wrapped error is kept as the source");
        let cause = source.source().expect("JSON error keeps its cause");
        assert!(cause.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_predicates_look_through_context() {
        let failed: Result<()> = Err(Error::timeout("Slow", std::time::Duration::from_millis(5)));
        let error = failed.context("first attempt").context("retrying").unwrap_err();

        assert!(error.is_engine_failure());
        assert!(matches!(error.root(), Error::Timeout { .. }));
        assert!(!error.is_fallback_undefined());
    }

    #[test]
    fn test_with_context_is_lazy() {
        let ok: std::result::Result<u8, Error> = Ok(3);
        let value = ok
            .with_context(|| unreachable!("only called on error"))
            .unwrap();
        assert_eq!(value, 3);
    }
}
