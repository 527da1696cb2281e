//! Error types for the rotating file sink

use std::io;
use std::path::PathBuf;

/// Result type for file sink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while writing log segments
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to open a segment
    #[error("Failed to open log segment {path}: {source}")]
    Open {
        /// The segment path
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to move the active segment aside
    #[error("Failed to rotate {from} to {to}: {source}")]
    Rotation {
        /// Segment being rotated
        from: PathBuf,
        /// Backup name it was moved to
        to: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown file format selector
    #[error("unsupported log format `{0}`, supported: json, text")]
    UnsupportedFormat(String),

    /// A record could not be rendered as text
    #[error("Failed to render record: {0}")]
    Render(#[source] fanlog_logger::Error),
}

impl From<Error> for fanlog_logger::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Configuration(msg) => Self::Configuration(msg),
            Error::UnsupportedFormat(format) => Self::UnsupportedFormat(format),
            Error::Render(inner) => inner,
            other => Self::Sink {
                sink: "file",
                source: Box::new(other),
            },
        }
    }
}
