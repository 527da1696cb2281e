//! Error types for configuration loading and pipeline assembly

use std::io;
use std::path::PathBuf;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading a config or building a logger
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a config file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// The config is not valid TOML for [`LoggerConfig`](crate::LoggerConfig)
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A logger option was rejected
    #[error(transparent)]
    Logger(#[from] fanlog_logger::Error),

    /// The file sink could not be set up
    #[error(transparent)]
    File(#[from] fanlog_logger_file::Error),
}
