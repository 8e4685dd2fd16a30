//! Core error type definitions

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for strix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for strix operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command was built or configured incorrectly
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Failure raised by a unit of work
    #[error("execution failed: {message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The unit of work did not finish within the execution timeout
    #[error("command '{command}' timed out after {duration:?}")]
    Timeout { command: String, duration: Duration },

    /// The circuit breaker for the command is open
    #[error("command '{command}' short-circuited: circuit breaker is open")]
    ShortCircuited { command: String },

    /// The command could not be admitted by its semaphore or thread pool
    #[error("command '{command}' rejected: {reason}")]
    Rejected { command: String, reason: String },

    /// The command does not define a fallback
    #[error("no fallback defined")]
    FallbackUndefined,

    /// Bridging between sequence models failed
    #[error("conversion error: {message}")]
    Conversion { message: String },

    /// File system operations
    #[error("failed to {operation} '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Another error, annotated with what was being attempted
    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
