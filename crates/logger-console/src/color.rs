//! ANSI coloring of rendered fragments

use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Foreground color, optionally bold
pub(crate) fn fg(color: Color, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(bold);
    spec
}

/// Bold text in the default color
pub(crate) fn bold() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    spec
}

/// Bright black, used for timestamps
pub(crate) fn dark_gray() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Black)).set_intense(true);
    spec
}

/// Wrap `text` in the escape codes of `spec`, unless coloring is off
pub(crate) fn paint(text: &str, spec: &ColorSpec, no_color: bool) -> String {
    if no_color || text.is_empty() {
        return text.to_string();
    }

    let mut buf = Buffer::ansi();
    // Writes into an in-memory buffer cannot fail
    let _ = buf.set_color(spec);
    let _ = buf.write_all(text.as_bytes());
    let _ = buf.reset();
    String::from_utf8_lossy(buf.as_slice()).into_owned()
}
