//! Log record type and its JSON encoding

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::fields::{CALLER_FIELD, LABEL_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIME_FIELD};
use crate::time::TimeFieldFormat;
use crate::{Error, Level, Result};

/// A log record under construction.
///
/// Encodes to exactly one JSON object: `level`, `time`, then `label` and
/// `caller` when present, then extra fields in insertion order, and finally
/// `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Log level
    pub level: Level,
    /// Logger label
    pub label: Option<String>,
    /// `file:line` of the call site
    pub caller: Option<String>,
    /// Extra fields, in insertion order
    pub fields: Vec<(String, Value)>,
    /// The log message
    pub message: Option<String>,
}

impl Record {
    /// Create a new record with no fields
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self {
            level,
            label: None,
            caller: None,
            fields: Vec::new(),
            message: None,
        }
    }

    /// Builder-style method for setting the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder-style method for setting the call site
    #[must_use]
    pub fn with_caller(mut self, file: &str, line: u32) -> Self {
        self.caller = Some(format!("{file}:{line}"));
        self
    }

    /// Builder-style method for setting the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a field holding any serializable value
    pub fn push_field<T>(&mut self, key: impl Into<String>, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(Error::Encode)?;
        self.fields.push((key.into(), value));
        Ok(())
    }

    /// Serialize the record as one JSON object, stamped with `now`
    pub fn encode<Tz>(&self, now: &DateTime<Tz>, time_format: &TimeFieldFormat) -> Result<Vec<u8>>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut out = Vec::with_capacity(128);
        out.push(b'{');

        write_entry(&mut out, LEVEL_FIELD, &self.level, true)?;
        write_entry(&mut out, TIME_FIELD, &time_format.encode(now), false)?;
        if let Some(label) = &self.label {
            write_entry(&mut out, LABEL_FIELD, label, false)?;
        }
        if let Some(caller) = &self.caller {
            write_entry(&mut out, CALLER_FIELD, caller, false)?;
        }
        for (key, value) in &self.fields {
            write_entry(&mut out, key, value, false)?;
        }
        if let Some(message) = &self.message {
            write_entry(&mut out, MESSAGE_FIELD, message, false)?;
        }

        out.push(b'}');
        Ok(out)
    }
}

fn write_entry<T>(out: &mut Vec<u8>, key: &str, value: &T, first: bool) -> Result<()>
where
    T: Serialize + ?Sized,
{
    if !first {
        out.push(b',');
    }
    serde_json::to_writer(&mut *out, key).map_err(Error::Encode)?;
    out.push(b':');
    serde_json::to_writer(&mut *out, value).map_err(Error::Encode)
}
