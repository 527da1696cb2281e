//! Rotating file sink for fanlog
//!
//! This crate provides a [`Sink`](fanlog_logger::Sink) that appends records
//! to log segments on disk and supports:
//! - Time rotation driven by a pattern in the file name (`app-yyyyMMdd.log`)
//! - Size rotation with numbered backups (`app.log.1`, `app.log.2`, ...)
//! - JSON output, or text rendered like the console without colors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod clock;
mod config;
mod error;
pub mod pattern;
pub mod segment;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FileLogFormat, FileSinkConfig, FileSinkConfigBuilder, RotationPolicy, SinkTarget};
pub use error::{Error, Result};
pub use segment::SegmentNamer;
pub use writer::RotatingFileSink;
