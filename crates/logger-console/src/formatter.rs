//! Rendering of one JSON record into a human-readable line

use std::collections::BTreeMap;
use std::path::PathBuf;

use fanlog_logger::fields::{CALLER_FIELD, LABEL_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIME_FIELD};
use fanlog_logger::time::DEFAULT_TIME_FORMAT;
use fanlog_logger::{Error, ReservedKeys, Result, TimeFieldFormat, time_field_format};
use serde_json::value::RawValue;

use crate::format::{
    Field, FormatSpec, format_caller, format_label, format_level, format_message,
    format_timestamp,
};

/// Turns serialized records into single colorized lines.
///
/// Rendering is pure: every call decodes into a private map and returns a
/// fresh buffer, so one formatter can be shared between threads.
#[derive(Clone)]
pub struct ConsoleFormatter {
    spec: FormatSpec,
    reserved: ReservedKeys,
    no_color: bool,
    display_time_format: String,
    time_field_format: Option<TimeFieldFormat>,
}

impl ConsoleFormatter {
    /// Formatter with the default spec, colors on
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: FormatSpec::new(),
            reserved: ReservedKeys::default(),
            no_color: false,
            display_time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_field_format: None,
        }
    }

    /// Use a different format spec
    #[must_use]
    pub fn with_spec(mut self, spec: FormatSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Use a different reserved key set
    #[must_use]
    pub fn with_reserved_keys(mut self, reserved: ReservedKeys) -> Self {
        self.reserved = reserved;
        self
    }

    /// Disable ANSI colors
    #[must_use]
    pub const fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// `chrono` format used to display timestamps
    #[must_use]
    pub fn with_display_time_format(mut self, format: impl Into<String>) -> Self {
        self.display_time_format = format.into();
        self
    }

    /// Decode timestamps with `format` instead of the process-wide mode
    #[must_use]
    pub fn with_time_field_format(mut self, format: TimeFieldFormat) -> Self {
        self.time_field_format = Some(format);
        self
    }

    /// The format spec in use
    #[must_use]
    pub const fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// Render one record, terminated by a newline
    pub fn render(&self, record: &[u8]) -> Result<Vec<u8>> {
        let raw: BTreeMap<String, &RawValue> =
            serde_json::from_slice(record).map_err(Error::Format)?;
        let event = raw
            .into_iter()
            .map(|(key, value)| Ok((key, Field::decode(value)?)))
            .collect::<serde_json::Result<BTreeMap<_, _>>>()
            .map_err(Error::Format)?;

        let mut line = self
            .spec
            .parts_order()
            .iter()
            .filter(|part| !self.spec.is_excluded(part))
            .map(|part| self.render_part(part, event.get(part.as_str())))
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.render_fields(&mut line, &event);
        line.push('\n');

        Ok(line.into_bytes())
    }

    fn render_part(&self, part: &str, field: Option<&Field<'_>>) -> String {
        let value = field.map(Field::value);
        if let Some(f) = self.spec.part_formatter(part) {
            return f(value);
        }

        match part {
            TIME_FIELD => {
                let mode = self
                    .time_field_format
                    .clone()
                    .unwrap_or_else(time_field_format);
                format_timestamp(value, &mode, &self.display_time_format, self.no_color)
            }
            LEVEL_FIELD => format_level(value, self.no_color),
            LABEL_FIELD => format_label(value, self.no_color),
            CALLER_FIELD => {
                let cwd: Option<PathBuf> = std::env::current_dir().ok();
                format_caller(value, cwd.as_deref(), self.no_color)
            }
            MESSAGE_FIELD => format_message(field),
            _ => field.map_or_else(String::new, |f| {
                self.spec.field_value(&f.text(), false, self.no_color)
            }),
        }
    }

    fn render_fields(&self, line: &mut String, event: &BTreeMap<String, Field<'_>>) {
        let error_key = self.reserved.error_key();
        let parts = self.spec.parts_order();

        let mut fields: Vec<&str> = event
            .keys()
            .map(String::as_str)
            .filter(|key| !self.reserved.contains(key))
            .filter(|key| !parts.iter().any(|part| part == key))
            .collect();

        if let Some(pos) = fields.iter().position(|key| *key == error_key) {
            let error = fields.remove(pos);
            fields.insert(0, error);
        }

        for key in fields {
            let is_error = key == error_key;
            let field = &event[key];

            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&self.spec.field_name(key, is_error, self.no_color));

            match self.spec.field_formatter(key) {
                Some(f) => line.push_str(&f(Some(field.value()))),
                None => line.push_str(&self.spec.field_value(
                    &field.quoted_text(),
                    is_error,
                    self.no_color,
                )),
            }
        }
    }
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new()
    }
}
