//! Record-producing logger front end

use std::panic::Location;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;

use crate::fields::ERROR_FIELD;
use crate::time::time_field_format;
use crate::{Error, Level, Record, Result, Sink};

/// Builds one JSON record per log call and hands it to a [`Sink`].
///
/// Cloning is cheap; clones and labeled sub-loggers share the same sink.
#[derive(Clone)]
pub struct Logger {
    writer: Arc<dyn Sink>,
    min_level: Level,
    label: Option<String>,
    caller: bool,
    enabled: bool,
}

impl Logger {
    /// Create a logger writing to `writer`, at debug level with caller info
    pub fn new(writer: Arc<dyn Sink>) -> Self {
        Self {
            writer,
            min_level: Level::Debug,
            label: None,
            caller: true,
            enabled: true,
        }
    }

    /// Create with a specific minimum level
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Create with a label stamped on every record
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }

    /// Enable or disable the `caller` field
    #[must_use]
    pub const fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Turn every log call into a no-op
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// A logger sharing this one's sink but stamping a different label
    #[must_use]
    pub fn labeled(&self, label: impl Into<String>) -> Self {
        self.clone().with_label(label)
    }

    /// Minimum level that is written
    #[must_use]
    pub const fn level(&self) -> Level {
        self.min_level
    }

    /// Current label, if any
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Check if a level is enabled
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.enabled && level >= self.min_level
    }

    /// The sink records are written to
    #[must_use]
    pub fn writer(&self) -> &Arc<dyn Sink> {
        &self.writer
    }

    /// Flush the underlying sink
    pub fn flush(&self) -> Result<()> {
        self.writer.flush()
    }

    /// Start a record at `level`
    #[track_caller]
    pub fn log(&self, level: Level) -> Event<'_> {
        self.event(level, Location::caller())
    }

    /// Start a trace record
    #[track_caller]
    pub fn trace(&self) -> Event<'_> {
        self.event(Level::Trace, Location::caller())
    }

    /// Start a debug record
    #[track_caller]
    pub fn debug(&self) -> Event<'_> {
        self.event(Level::Debug, Location::caller())
    }

    /// Start an info record
    #[track_caller]
    pub fn info(&self) -> Event<'_> {
        self.event(Level::Info, Location::caller())
    }

    /// Start a warn record
    #[track_caller]
    pub fn warn(&self) -> Event<'_> {
        self.event(Level::Warn, Location::caller())
    }

    /// Start an error record
    #[track_caller]
    pub fn error(&self) -> Event<'_> {
        self.event(Level::Error, Location::caller())
    }

    /// Start a fatal record. The process keeps running.
    #[track_caller]
    pub fn fatal(&self) -> Event<'_> {
        self.event(Level::Fatal, Location::caller())
    }

    /// Start a panic record. The caller does not unwind.
    #[track_caller]
    pub fn panic(&self) -> Event<'_> {
        self.event(Level::Panic, Location::caller())
    }

    /// Start an error record carrying `err`, or an info record when `err` is `None`
    #[track_caller]
    pub fn err(&self, err: Option<&dyn std::error::Error>) -> Event<'_> {
        match err {
            Some(err) => self.event(Level::Error, Location::caller()).err(err),
            None => self.event(Level::Info, Location::caller()),
        }
    }

    fn event(&self, level: Level, location: &Location<'_>) -> Event<'_> {
        if !self.is_enabled(level) {
            return Event {
                logger: self,
                record: None,
                error: None,
            };
        }

        let mut record = Record::new(level);
        record.label.clone_from(&self.label);
        if self.caller {
            record = record.with_caller(location.file(), location.line());
        }

        Event {
            logger: self,
            record: Some(record),
            error: None,
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("writer", &self.writer.name())
            .field("min_level", &self.min_level)
            .field("label", &self.label)
            .field("caller", &self.caller)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// A record being filled in. Nothing is written until [`Event::msg`] or
/// [`Event::send`] is called.
#[must_use = "an event is only written by `msg` or `send`"]
pub struct Event<'a> {
    logger: &'a Logger,
    record: Option<Record>,
    error: Option<Error>,
}

impl Event<'_> {
    /// Whether this event will be written
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.record.is_some()
    }

    /// Add a string field
    pub fn str(self, key: &str, value: &str) -> Self {
        self.field(key, value)
    }

    /// Add a field holding any serializable value
    pub fn field<T>(mut self, key: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        if let Some(record) = self.record.as_mut()
            && let Err(e) = record.push_field(key, value)
        {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Add the `error` field
    pub fn err(self, err: &dyn std::error::Error) -> Self {
        self.field(ERROR_FIELD, &err.to_string())
    }

    /// Set the message and write the record
    pub fn msg(mut self, message: impl Into<String>) -> Result<()> {
        if let Some(record) = self.record.as_mut() {
            record.message = Some(message.into());
        }
        self.send()
    }

    /// Write the record without a message
    pub fn send(self) -> Result<()> {
        let Some(record) = self.record else {
            return Ok(());
        };
        if let Some(e) = self.error {
            return Err(e);
        }

        let bytes = record.encode(&Local::now(), &time_field_format())?;
        self.logger.writer.write(&bytes).map(|_| ())
    }
}
