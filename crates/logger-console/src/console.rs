//! Console sink writing rendered lines to a terminal stream

use std::io::{self, Write};

use fanlog_logger::{Result, Sink};
use parking_lot::Mutex;

use crate::formatter::ConsoleFormatter;

/// A sink that renders every record with a [`ConsoleFormatter`] and writes
/// the line to its output stream.
///
/// A disabled sink drops records but still reports them as fully written,
/// so it never breaks a fan-out.
pub struct ConsoleSink {
    enabled: bool,
    formatter: ConsoleFormatter,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Sink writing to standard output
    #[must_use]
    pub fn stdout(formatter: ConsoleFormatter) -> Self {
        Self::new(formatter, Box::new(io::stdout()))
    }

    /// Sink writing to an arbitrary stream
    #[must_use]
    pub fn new(formatter: ConsoleFormatter, out: Box<dyn Write + Send>) -> Self {
        Self {
            enabled: true,
            formatter,
            out: Mutex::new(out),
        }
    }

    /// Turn the sink on or off
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether records reach the stream
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The formatter used for rendering
    #[must_use]
    pub const fn formatter(&self) -> &ConsoleFormatter {
        &self.formatter
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &[u8]) -> Result<usize> {
        if !self.enabled {
            return Ok(record.len());
        }

        let line = self.formatter.render(record)?;
        self.out.lock().write_all(&line)?;

        Ok(record.len())
    }

    fn flush(&self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
