//! Part ordering and the default part formatters

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use fanlog_logger::TimeFieldFormat;
use fanlog_logger::fields::{CALLER_FIELD, LABEL_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIME_FIELD};
use serde_json::Value;
use serde_json::value::RawValue;
use termcolor::Color;

use crate::color::{bold, dark_gray, fg, paint};

/// Renders one part of a record from its (possibly missing) value
pub type PartFormatter = Arc<dyn Fn(Option<&Value>) -> String + Send + Sync>;

/// Renders a piece of already-stringified text (field names and values)
pub type TextFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Default order of the leading parts of a console line
#[must_use]
pub fn default_parts_order() -> Vec<String> {
    [TIME_FIELD, LEVEL_FIELD, LABEL_FIELD, CALLER_FIELD, MESSAGE_FIELD]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Which parts lead a console line, in what order, and how each is rendered.
#[derive(Clone)]
pub struct FormatSpec {
    parts_order: Vec<String>,
    parts_exclude: HashSet<String>,
    part_formatters: HashMap<String, PartFormatter>,
    field_formatters: HashMap<String, PartFormatter>,
    field_name: Option<TextFormatter>,
    field_value: Option<TextFormatter>,
    error_field_name: Option<TextFormatter>,
    error_field_value: Option<TextFormatter>,
}

impl FormatSpec {
    /// Spec with the default part order and formatters
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts_order: default_parts_order(),
            parts_exclude: HashSet::new(),
            part_formatters: HashMap::new(),
            field_formatters: HashMap::new(),
            field_name: None,
            field_value: None,
            error_field_name: None,
            error_field_value: None,
        }
    }

    /// Replace the part order. Repeated names keep only their first position.
    #[must_use]
    pub fn with_parts_order<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.parts_order = parts
            .into_iter()
            .map(Into::into)
            .filter(|part: &String| seen.insert(part.clone()))
            .collect();
        self
    }

    /// Never render `part`
    #[must_use]
    pub fn exclude(mut self, part: impl Into<String>) -> Self {
        self.parts_exclude.insert(part.into());
        self
    }

    /// Override the formatter of a leading part
    #[must_use]
    pub fn with_part_formatter(mut self, part: impl Into<String>, f: PartFormatter) -> Self {
        self.part_formatters.insert(part.into(), f);
        self
    }

    /// Override how the value of one trailing field is rendered
    #[must_use]
    pub fn with_field_formatter(mut self, field: impl Into<String>, f: PartFormatter) -> Self {
        self.field_formatters.insert(field.into(), f);
        self
    }

    /// Override how trailing field names are rendered (`key=` by default)
    #[must_use]
    pub fn with_field_name_formatter(mut self, f: TextFormatter) -> Self {
        self.field_name = Some(f);
        self
    }

    /// Override how trailing field values are rendered
    #[must_use]
    pub fn with_field_value_formatter(mut self, f: TextFormatter) -> Self {
        self.field_value = Some(f);
        self
    }

    /// Override how the error field name and value are rendered
    #[must_use]
    pub fn with_error_field_formatters(mut self, name: TextFormatter, value: TextFormatter) -> Self {
        self.error_field_name = Some(name);
        self.error_field_value = Some(value);
        self
    }

    /// Leading parts, in order
    #[must_use]
    pub fn parts_order(&self) -> &[String] {
        &self.parts_order
    }

    /// Whether `part` is excluded from rendering
    #[must_use]
    pub fn is_excluded(&self, part: &str) -> bool {
        self.parts_exclude.contains(part)
    }

    pub(crate) fn part_formatter(&self, part: &str) -> Option<&PartFormatter> {
        self.part_formatters.get(part)
    }

    pub(crate) fn field_formatter(&self, field: &str) -> Option<&PartFormatter> {
        self.field_formatters.get(field)
    }

    pub(crate) fn field_name(&self, name: &str, is_error: bool, no_color: bool) -> String {
        let custom = if is_error {
            self.error_field_name.as_ref()
        } else {
            self.field_name.as_ref()
        };
        match custom {
            Some(f) => f(name),
            None => {
                let color = if is_error { Color::Red } else { Color::Cyan };
                paint(&format!("{name}="), &fg(color, false), no_color)
            }
        }
    }

    pub(crate) fn field_value(&self, text: &str, is_error: bool, no_color: bool) -> String {
        let custom = if is_error {
            self.error_field_value.as_ref()
        } else {
            self.field_value.as_ref()
        };
        match custom {
            Some(f) => f(text),
            None if is_error => paint(text, &fg(Color::Red, false), no_color),
            None => text.to_string(),
        }
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain text of a value: strings unquoted, everything else as JSON
pub(crate) fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of a trailing field value: strings quoted when they would be
/// ambiguous, everything else as JSON
pub(crate) fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quote(s) => Value::String(s.clone()).to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One top-level field of a record: its source text and its decoded value.
///
/// Numbers are printed from the source text, since decoding normalizes
/// exponents (`1e3` becomes `1e+3`).
pub(crate) struct Field<'a> {
    raw: &'a RawValue,
    value: Value,
}

impl<'a> Field<'a> {
    pub(crate) fn decode(raw: &'a RawValue) -> serde_json::Result<Self> {
        Ok(Self {
            raw,
            value: serde_json::from_str(raw.get())?,
        })
    }

    pub(crate) const fn value(&self) -> &Value {
        &self.value
    }

    fn number(&self) -> Option<&str> {
        self.value.is_number().then(|| self.raw.get())
    }

    /// Like [`plain_text`], numbers verbatim
    pub(crate) fn text(&self) -> String {
        self.number()
            .map_or_else(|| plain_text(&self.value), str::to_string)
    }

    /// Like [`field_text`], numbers verbatim
    pub(crate) fn quoted_text(&self) -> String {
        self.number()
            .map_or_else(|| field_text(&self.value), str::to_string)
    }
}

/// Whether `s` must be quoted to stay one unambiguous token
pub(crate) fn needs_quote(s: &str) -> bool {
    s.bytes()
        .any(|b| b < 0x20 || b > 0x7e || b == b' ' || b == b'\\' || b == b'"')
}

pub(crate) fn format_timestamp(
    value: Option<&Value>,
    mode: &TimeFieldFormat,
    display: &str,
    no_color: bool,
) -> String {
    let text = match value {
        None | Some(Value::Null) => "<nil>".to_string(),
        Some(Value::String(s)) => match mode {
            TimeFieldFormat::Text(layout) => DateTime::parse_from_str(s, layout)
                .map(|t| t.format(display).to_string())
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(s, layout).map(|t| t.format(display).to_string())
                })
                .unwrap_or_else(|_| s.clone()),
            _ => s.clone(),
        },
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|i| match mode {
                TimeFieldFormat::UnixMillis => DateTime::from_timestamp_millis(i),
                TimeFieldFormat::UnixMicros => DateTime::from_timestamp_micros(i),
                TimeFieldFormat::UnixSeconds | TimeFieldFormat::Text(_) => {
                    DateTime::from_timestamp(i, 0)
                }
            })
            .map_or_else(|| n.to_string(), |t| t.format(display).to_string()),
        Some(other) => other.to_string(),
    };
    paint(&text, &dark_gray(), no_color)
}

pub(crate) fn format_level(value: Option<&Value>, no_color: bool) -> String {
    let Some(value) = value else {
        return paint("???", &bold(), no_color);
    };

    let name = plain_text(value);
    let (tag, spec) = match name.as_str() {
        "trace" => ("TRC", fg(Color::Magenta, false)),
        "debug" => ("DBG", fg(Color::Yellow, false)),
        "info" => ("INF", fg(Color::Green, false)),
        "warn" => ("WRN", fg(Color::Red, false)),
        "error" => ("ERR", fg(Color::Red, true)),
        "fatal" => ("FTL", fg(Color::Red, true)),
        "panic" => ("PNC", fg(Color::Red, true)),
        other => {
            let tag: String = other.to_uppercase().chars().take(3).collect();
            return paint(&tag, &bold(), no_color);
        }
    };
    paint(tag, &spec, no_color)
}

pub(crate) fn format_label(value: Option<&Value>, no_color: bool) -> String {
    value.map_or_else(String::new, |v| {
        paint(&plain_text(v), &fg(Color::Blue, false), no_color)
    })
}

pub(crate) fn format_caller(value: Option<&Value>, cwd: Option<&Path>, no_color: bool) -> String {
    let caller = match value {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        _ => return String::new(),
    };

    let shown = cwd
        .and_then(|cwd| {
            let rel = pathdiff::diff_paths(caller, cwd)?;
            Some(match cwd.file_name() {
                Some(dir) => format!("{}/{}", dir.to_string_lossy(), rel.display()),
                None => rel.display().to_string(),
            })
        })
        .unwrap_or_else(|| caller.to_string());

    paint(&shown, &bold(), no_color) + &paint(" >", &fg(Color::Cyan, false), no_color)
}

pub(crate) fn format_message(field: Option<&Field<'_>>) -> String {
    field.map_or_else(String::new, Field::text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parts_order_is_deduplicated() {
        let spec = FormatSpec::new().with_parts_order(["level", "message", "level"]);
        assert_eq!(spec.parts_order(), ["level", "message"]);
    }

    #[test]
    fn test_needs_quote() {
        assert!(!needs_quote("plain"));
        assert!(needs_quote("two words"));
        assert!(needs_quote("tab\there"));
        assert!(needs_quote("back\\slash"));
        assert!(needs_quote("say \"hi\""));
        assert!(needs_quote("caf\u{e9}"));
    }

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&Value::String("ok".into())), "ok");
        assert_eq!(field_text(&Value::String("a b".into())), "\"a b\"");
        assert_eq!(field_text(&serde_json::json!([1, 2])), "[1,2]");
        assert_eq!(field_text(&serde_json::json!(true)), "true");
        assert_eq!(field_text(&Value::Null), "null");
    }

    #[test]
    fn test_field_numbers_are_verbatim() {
        for text in ["1e3", "1E3", "2.5e-3", "-0.0", "1.50", "12345678901234567890123"] {
            let raw: Box<RawValue> = serde_json::from_str(text).unwrap();
            let field = Field::decode(&raw).unwrap();
            assert!(field.value().is_number());
            assert_eq!(field.text(), text);
            assert_eq!(field.quoted_text(), text);
        }

        let raw: Box<RawValue> = serde_json::from_str(r#""a b""#).unwrap();
        let field = Field::decode(&raw).unwrap();
        assert_eq!(field.text(), "a b");
        assert_eq!(field.quoted_text(), "\"a b\"");
    }

    #[test]
    fn test_level_tags() {
        let info = Value::String("info".into());
        let odd = Value::String("notice".into());
        let short = Value::String("ok".into());
        assert_eq!(format_level(Some(&info), true), "INF");
        assert_eq!(format_level(Some(&odd), true), "NOT");
        assert_eq!(format_level(Some(&short), true), "OK");
        assert_eq!(format_level(None, true), "???");
    }

    #[test]
    fn test_timestamp_text_reformat() {
        let mode = TimeFieldFormat::Text("%Y-%m-%d %H:%M:%S%.3f".into());
        let value = Value::String("2022-02-11 16:05:09.042".into());
        assert_eq!(
            format_timestamp(Some(&value), &mode, "%H:%M:%S", true),
            "16:05:09"
        );
    }

    #[test]
    fn test_timestamp_unparseable_passes_through() {
        let value = Value::String("T".into());
        assert_eq!(
            format_timestamp(Some(&value), &TimeFieldFormat::DEFAULT, "%H:%M", true),
            "T"
        );
        assert_eq!(
            format_timestamp(None, &TimeFieldFormat::DEFAULT, "%H:%M", true),
            "<nil>"
        );
    }

    #[test]
    fn test_timestamp_epochs() {
        let display = "%Y-%m-%d %H:%M:%S%.3f";
        let secs: Value = serde_json::from_str("1644595200").unwrap();
        let millis: Value = serde_json::from_str("1644595200123").unwrap();
        let micros: Value = serde_json::from_str("1644595200123456").unwrap();

        assert_eq!(
            format_timestamp(Some(&secs), &TimeFieldFormat::UnixSeconds, display, true),
            "2022-02-11 16:00:00.000"
        );
        assert_eq!(
            format_timestamp(Some(&millis), &TimeFieldFormat::UnixMillis, display, true),
            "2022-02-11 16:00:00.123"
        );
        assert_eq!(
            format_timestamp(Some(&micros), &TimeFieldFormat::UnixMicros, display, true),
            "2022-02-11 16:00:00.123"
        );
    }

    #[test]
    fn test_caller_relative_to_cwd() {
        let cwd = PathBuf::from("/home/dev/project");
        let caller = Value::String("/home/dev/project/src/main.rs:42".into());
        assert_eq!(
            format_caller(Some(&caller), Some(&cwd), true),
            "project/src/main.rs:42 >"
        );
    }

    #[test]
    fn test_caller_relative_input_is_kept() {
        let cwd = PathBuf::from("/home/dev/project");
        let caller = Value::String("src/main.rs:42".into());
        assert_eq!(
            format_caller(Some(&caller), Some(&cwd), true),
            "src/main.rs:42 >"
        );
        assert_eq!(format_caller(None, Some(&cwd), true), "");
    }
}
