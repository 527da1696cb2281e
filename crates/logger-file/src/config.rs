//! Configuration of the rotating file sink

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use fanlog_logger_console::ConsoleFormatter;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};

/// When the active segment is closed and a new one started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationPolicy {
    /// Start a new segment whenever the resolved file name changes
    pub time_rolling: bool,
    /// Start a new segment when the next write would exceed `max_size_bytes`
    pub size_rolling: bool,
    /// Size threshold in bytes
    pub max_size_bytes: u64,
    /// Size-rotated backups to keep; `0` keeps all of them
    pub max_segments: usize,
}

impl RotationPolicy {
    /// Never rotate
    #[must_use]
    pub const fn none() -> Self {
        Self {
            time_rolling: false,
            size_rolling: false,
            max_size_bytes: 0,
            max_segments: 0,
        }
    }

    /// Rotate when the resolved file name changes
    #[must_use]
    pub const fn by_time() -> Self {
        Self {
            time_rolling: true,
            ..Self::none()
        }
    }

    /// Rotate at `max_size_bytes`, keeping `max_segments` backups
    #[must_use]
    pub const fn by_size(max_size_bytes: u64, max_segments: usize) -> Self {
        Self {
            size_rolling: true,
            max_size_bytes,
            max_segments,
            ..Self::none()
        }
    }

    /// Toggle time rolling on top of this policy
    #[must_use]
    pub const fn with_time_rolling(mut self, time_rolling: bool) -> Self {
        self.time_rolling = time_rolling;
        self
    }

    /// Check the policy is usable
    pub fn validate(&self) -> Result<()> {
        if self.size_rolling && self.max_size_bytes == 0 {
            return Err(Error::Configuration(
                "size rolling requires a non-zero max size".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where segments live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkTarget {
    base_path: PathBuf,
    base_file_name: String,
}

impl SinkTarget {
    /// Segments named `base_file_name` (possibly a time pattern) under `base_path`
    pub fn new(base_path: impl Into<PathBuf>, base_file_name: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_file_name: base_file_name.into(),
        }
    }

    /// Directory holding the segments
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Unresolved file name
    #[must_use]
    pub fn base_file_name(&self) -> &str {
        &self.base_file_name
    }
}

impl Default for SinkTarget {
    fn default() -> Self {
        Self::new(".", "fanlog.log")
    }
}

/// What ends up in the segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileLogFormat {
    /// Records as received, one JSON object per write
    #[default]
    Json,
    /// Records rendered like the console, without colors
    Text,
}

impl FileLogFormat {
    /// Selector string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for FileLogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileLogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Full configuration of a [`RotatingFileSink`](crate::RotatingFileSink)
#[derive(Clone)]
pub struct FileSinkConfig {
    /// A disabled sink accepts and drops every record
    pub enabled: bool,
    /// Segment location
    pub target: SinkTarget,
    /// Rotation rules
    pub policy: RotationPolicy,
    /// Output format
    pub format: FileLogFormat,
    /// Formatter used by [`FileLogFormat::Text`]
    pub text_formatter: ConsoleFormatter,
    /// Time source for pattern resolution
    pub clock: Arc<dyn Clock>,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: SinkTarget::default(),
            policy: RotationPolicy::none(),
            format: FileLogFormat::Json,
            text_formatter: ConsoleFormatter::new().with_no_color(true),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for FileSinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSinkConfig")
            .field("enabled", &self.enabled)
            .field("target", &self.target)
            .field("policy", &self.policy)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FileSinkConfig`]
#[derive(Debug, Default)]
pub struct FileSinkConfigBuilder {
    config: FileSinkConfig,
}

impl FileSinkConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the sink
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the directory holding the segments
    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.target.base_path = path.into();
        self
    }

    /// Set the segment file name or time pattern
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.target.base_file_name = name.into();
        self
    }

    /// Set the rotation policy
    #[must_use]
    pub const fn policy(mut self, policy: RotationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the output format
    #[must_use]
    pub const fn format(mut self, format: FileLogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the formatter used for text output; colors are always disabled
    #[must_use]
    pub fn text_formatter(mut self, formatter: ConsoleFormatter) -> Self {
        self.config.text_formatter = formatter.with_no_color(true);
        self
    }

    /// Set the time source
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.config.clock = clock;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> FileSinkConfig {
        self.config
    }
}
