//! Time patterns embedded in segment file names
//!
//! A base file name such as `app-yyyyMMdd.log` is re-resolved against the
//! current time; time rotation happens whenever the result changes.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Tokens in substitution order. Longer tokens sharing a prefix come first.
const TOKENS: [(&str, &str); 7] = [
    ("yyyy", "%Y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("sss", ""),
    ("ss", "%S"),
];

/// Placeholder written for `sss`
const MILLIS_PLACEHOLDER: &str = "000";

/// Resolve the time tokens in the file-name part of `pattern`.
///
/// Everything up to and including the last path separator is returned
/// untouched.
pub fn resolve<Tz>(pattern: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let split = pattern
        .rfind(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        .map_or(0, |i| i + 1);
    let (dir, file) = pattern.split_at(split);

    let mut name = file.to_string();
    for (token, spec) in TOKENS {
        if !name.contains(token) {
            continue;
        }
        let value = if spec.is_empty() {
            MILLIS_PLACEHOLDER.to_string()
        } else {
            now.format(spec).to_string()
        };
        name = name.replace(token, &value);
    }

    format!("{dir}{name}")
}

/// Whether `pattern` contains any time token
#[must_use]
pub fn has_tokens(pattern: &str) -> bool {
    TOKENS.iter().any(|(token, _)| pattern.contains(token))
}
