//! Error types shared by every sink

use std::io;

/// Result type for sink and logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced through the [`Sink`](crate::Sink) write entry point
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The record handed to a formatting sink was not a JSON object
    #[error("cannot decode event: {0}")]
    Format(#[source] serde_json::Error),

    /// A record or one of its fields could not be serialized
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unrecognized output format selector
    #[error("unsupported log format `{0}`, supported: json, text")]
    UnsupportedFormat(String),

    /// A sink failed with its own error type
    #[error("{sink} sink failed: {source}")]
    Sink {
        /// Name of the failing sink
        sink: &'static str,
        /// The underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
