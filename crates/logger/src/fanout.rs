//! Fan-out of one record to several sinks

use std::sync::Arc;

use tracing::debug;

use crate::{Result, Sink};

/// Forwards every record to each of its sinks in insertion order.
///
/// Every sink is attempted even when an earlier one fails; the first error
/// is returned once all of them have seen the record.
#[derive(Clone, Default)]
pub struct FanoutWriter {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanoutWriter {
    /// Create an empty fan-out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Append a sink in place
    pub fn push(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Number of sinks
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no sinks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutWriter")
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Sink for FanoutWriter {
    fn write(&self, record: &[u8]) -> Result<usize> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.write(record) {
                debug!("{} sink rejected record: {}", sink.name(), e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(record.len()), Err)
    }

    fn flush(&self) -> Result<()> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &'static str {
        "fanout"
    }
}
