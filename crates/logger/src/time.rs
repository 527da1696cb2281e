//! Process-wide encoding of the `time` field

use std::borrow::Cow;

use chrono::{DateTime, TimeZone};
use parking_lot::RwLock;
use serde_json::Value;

/// Default text layout for timestamps (`2024-01-31 13:45:10.123`)
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// How the `time` field of a record is encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFieldFormat {
    /// Text rendered with a `chrono` format string
    Text(Cow<'static, str>),
    /// Integer seconds since the Unix epoch
    UnixSeconds,
    /// Integer milliseconds since the Unix epoch
    UnixMillis,
    /// Integer microseconds since the Unix epoch
    UnixMicros,
}

impl TimeFieldFormat {
    /// Text encoding with [`DEFAULT_TIME_FORMAT`]
    pub const DEFAULT: Self = Self::Text(Cow::Borrowed(DEFAULT_TIME_FORMAT));

    /// Encode `now` as a JSON value
    pub fn encode<Tz>(&self, now: &DateTime<Tz>) -> Value
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Self::Text(layout) => Value::String(now.format(layout).to_string()),
            Self::UnixSeconds => Value::from(now.timestamp()),
            Self::UnixMillis => Value::from(now.timestamp_millis()),
            Self::UnixMicros => Value::from(now.timestamp_micros()),
        }
    }
}

impl Default for TimeFieldFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static TIME_FIELD_FORMAT: RwLock<TimeFieldFormat> =
    parking_lot::const_rwlock(TimeFieldFormat::DEFAULT);

/// Current process-wide time field encoding
pub fn time_field_format() -> TimeFieldFormat {
    TIME_FIELD_FORMAT.read().clone()
}

/// Change the process-wide time field encoding.
///
/// Records written before the change keep their old encoding, so readers of
/// mixed output should switch modes only at startup.
pub fn set_time_field_format(format: TimeFieldFormat) {
    *TIME_FIELD_FORMAT.write() = format;
}
