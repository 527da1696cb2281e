//! Logger configuration and pipeline assembly

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fanlog_logger::time::DEFAULT_TIME_FORMAT;
use fanlog_logger::{FanoutWriter, Level, Logger};
use fanlog_logger_console::{ConsoleFormatter, ConsoleSink, FormatSpec, default_parts_order};
use fanlog_logger_file::{FileLogFormat, FileSinkConfigBuilder, RotatingFileSink, RotationPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Name of the config file looked up by [`LoggerConfig::from_dir`]
pub const CONFIG_FILE_NAME: &str = "logger.toml";

const CONFIG_HEADER: &str = "\
# fanlog logger configuration (TOML)
#
# file_log_format       \"json\" or \"text\"
# log_file_name         may contain time tokens when enable_time_rolling is set:
#                         yyyy year, MM month, dd day, HH hour, mm minute, ss second
#                         \"app-yyyyMMddHH.log\" -> \"app-2022021510.log\"
# enable_size_rolling   backups are suffixed .1, .2, ... (higher is older)
# max_file_size_kb      size threshold of one file, in KiB
# max_files_count       backups kept by size rolling, 0 keeps all
# level                 trace, debug, info, warn, error, fatal, panic

";

/// Everything needed to build a [`Logger`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Master switch; a disabled logger drops every call
    pub enable: bool,
    /// Write human-readable lines to stdout
    pub enable_console_print: bool,
    /// Disable ANSI colors on the console
    pub console_no_color: bool,
    /// Write records to log files
    pub enable_log_files: bool,
    /// `json` or `text`
    pub file_log_format: String,
    /// Directory holding the log files
    pub log_files_path: PathBuf,
    /// File name, or time pattern when time rolling is on
    pub log_file_name: String,
    /// Rotate when the resolved file name changes
    pub enable_time_rolling: bool,
    /// Rotate when a file reaches `max_file_size_kb`
    pub enable_size_rolling: bool,
    /// Size threshold in KiB
    pub max_file_size_kb: u64,
    /// Size-rotated backups to keep, 0 keeps all
    pub max_files_count: usize,
    /// Minimum level
    pub level: String,
    /// Label stamped on every record
    pub label: String,
    /// Record the source location of each call
    pub caller: bool,
    /// How the console displays timestamps
    pub console_time_format: String,
    /// Leading parts of a console line
    pub parts_order: Vec<String>,
    /// Parts left out of console lines
    pub parts_exclude: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            enable_console_print: true,
            console_no_color: false,
            enable_log_files: false,
            file_log_format: FileLogFormat::Json.to_string(),
            log_files_path: PathBuf::from("."),
            log_file_name: "fanlog.log".to_string(),
            enable_time_rolling: false,
            enable_size_rolling: false,
            max_file_size_kb: 100 << 10, // 100 MiB
            max_files_count: 0,
            level: Level::Debug.to_string(),
            label: String::new(),
            caller: true,
            console_time_format: DEFAULT_TIME_FORMAT.to_string(),
            parts_order: default_parts_order(),
            parts_exclude: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Load `logger.toml` from `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Serialize as a commented TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!("{CONFIG_HEADER}{body}"))
    }

    /// Save configuration to a file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;

        fs::write(path, contents).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether any file sink option is on. Rolling implies file output.
    #[must_use]
    pub const fn files_enabled(&self) -> bool {
        self.enable_log_files || self.enable_time_rolling || self.enable_size_rolling
    }

    /// The rotation policy described by this config
    #[must_use]
    pub const fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy {
            time_rolling: self.enable_time_rolling,
            size_rolling: self.enable_size_rolling,
            max_size_bytes: self.max_file_size_kb.saturating_mul(1024),
            max_segments: self.max_files_count,
        }
    }

    /// Assemble the console and file sinks into a logger
    pub fn build(&self) -> Result<Logger> {
        if !self.enable {
            return Ok(Logger::new(Arc::new(FanoutWriter::new())).disabled());
        }

        let level: Level = self.level.parse()?;
        let format: FileLogFormat = self.file_log_format.parse()?;

        let spec = self
            .parts_exclude
            .iter()
            .fold(
                FormatSpec::new().with_parts_order(self.parts_order.iter().cloned()),
                |spec, part| spec.exclude(part.clone()),
            );
        let formatter = ConsoleFormatter::new()
            .with_spec(spec)
            .with_display_time_format(self.console_time_format.clone());

        let console = ConsoleSink::stdout(formatter.clone().with_no_color(self.console_no_color))
            .with_enabled(self.enable_console_print);

        let file = RotatingFileSink::new(
            FileSinkConfigBuilder::new()
                .enabled(self.files_enabled())
                .base_path(&self.log_files_path)
                .file_name(self.log_file_name.clone())
                .policy(self.rotation_policy())
                .format(format)
                .text_formatter(formatter)
                .build(),
        )?;

        debug!(
            "Building logger: console={}, files={}, level={}",
            self.enable_console_print,
            self.files_enabled(),
            level
        );

        let fanout = FanoutWriter::new()
            .with_sink(Arc::new(console))
            .with_sink(Arc::new(file));

        Ok(Logger::new(Arc::new(fanout))
            .with_level(level)
            .with_label(self.label.clone())
            .with_caller(self.caller))
    }
}

/// Create the config directory and its parents
pub fn ensure_config_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
