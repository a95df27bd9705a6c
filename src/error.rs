use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced by the pipeline.
///
/// Structural problems in the analyzed source are never errors; they are
/// reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s. This enum
/// covers the failures that stop a run outright: I/O, an unusable project
/// root, serialization, and cooperative cancellation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The run was aborted through its [`CancelToken`](crate::cancel::CancelToken).
    /// Partial output has been discarded wholesale.
    #[error("run cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
