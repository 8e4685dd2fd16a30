//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;
use std::time::Duration;

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an execution failure without an underlying cause
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Create an execution failure wrapping the error that caused it
    #[must_use]
    pub fn execution_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Execution {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(command: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            command: command.into(),
            duration,
        }
    }

    /// Create a short-circuit error for an open circuit
    #[must_use]
    pub fn short_circuited(command: impl Into<String>) -> Self {
        Error::ShortCircuited {
            command: command.into(),
        }
    }

    /// Create an admission rejection error
    #[must_use]
    pub fn rejected(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Rejected {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create the error returned by commands without a fallback
    #[must_use]
    pub fn fallback_undefined() -> Self {
        Error::FallbackUndefined
    }

    /// Create a sequence conversion error
    #[must_use]
    pub fn conversion(message: impl Into<String>) -> Self {
        Error::Conversion {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Annotate `source` with what was being attempted
    #[must_use]
    pub fn context(message: impl Into<String>, source: Error) -> Self {
        Error::Context {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error beneath any context annotations
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Whether this is the sentinel produced by a missing fallback
    pub fn is_fallback_undefined(&self) -> bool {
        matches!(self.root(), Error::FallbackUndefined)
    }

    /// Whether the failure originated in the execution engine rather than the unit of work
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self.root(),
            Error::Timeout { .. } | Error::ShortCircuited { .. } | Error::Rejected { .. }
        )
    }
}
