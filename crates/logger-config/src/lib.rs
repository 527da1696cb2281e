//! TOML configuration for fanlog
//!
//! [`LoggerConfig`] describes a whole pipeline: a console sink, a rotating
//! file sink, the minimum level and the record label. [`LoggerConfig::build`]
//! assembles them into a [`Logger`](fanlog_logger::Logger) writing through a
//! fan-out.
//!
//! ```toml
//! enable_log_files = true
//! log_files_path = "/var/log/app"
//! log_file_name = "app-yyyyMMdd.log"
//! enable_time_rolling = true
//! level = "info"
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod config;
mod error;

pub use config::{CONFIG_FILE_NAME, LoggerConfig, ensure_config_path};
pub use error::{Error, Result};
