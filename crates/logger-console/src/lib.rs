//! Human-readable console sink for fanlog
//!
//! Records arrive as serialized JSON objects. The [`ConsoleFormatter`]
//! decodes each one and lays it out as a single line: the configured parts
//! first (time, level, label, caller, message by default), then every other
//! field as `key=value` sorted by name with the error field in front.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod color;
mod console;
mod format;
mod formatter;

pub use console::ConsoleSink;
pub use format::{FormatSpec, PartFormatter, TextFormatter, default_parts_order};
pub use formatter::ConsoleFormatter;
