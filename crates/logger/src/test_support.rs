//! Test support utilities
//!
//! Sinks that capture or reject records, for exercising loggers and
//! fan-outs in tests. Only available with the `test-support` feature.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Error, Result, Sink};

/// A sink that keeps every record in memory
#[derive(Clone, Default)]
pub struct CaptureSink {
    records: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    /// Create an empty capture sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    /// Captured records decoded as JSON
    ///
    /// # Panics
    ///
    /// Panics if a captured record is not valid JSON.
    #[must_use]
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.records
            .lock()
            .iter()
            .map(|r| serde_json::from_str(r).expect("captured record is not JSON"))
            .collect()
    }

    /// Clear captured records
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Check if any record contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.records.lock().iter().any(|r| r.contains(text))
    }
}

impl Sink for CaptureSink {
    fn write(&self, record: &[u8]) -> Result<usize> {
        self.records
            .lock()
            .push(String::from_utf8_lossy(record).into_owned());
        Ok(record.len())
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

/// A sink whose every write fails
#[derive(Clone, Debug)]
pub struct FailingSink {
    reason: String,
}

impl FailingSink {
    /// Create a sink failing with `reason`
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Sink for FailingSink {
    fn write(&self, _record: &[u8]) -> Result<usize> {
        Err(Error::Sink {
            sink: "failing",
            source: Box::new(io::Error::other(self.reason.clone())),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
