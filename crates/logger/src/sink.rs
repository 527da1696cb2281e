//! Core sink trait

use crate::Result;

/// A destination for serialized log records.
///
/// Each call to [`Sink::write`] carries exactly one finished record (one JSON
/// object). Implementations must write it as a single unit: concurrent callers
/// may never observe interleaved or partial records.
pub trait Sink: Send + Sync + 'static {
    /// Write one record, returning how many bytes of `record` were accepted
    fn write(&self, record: &[u8]) -> Result<usize>;

    /// Flush any buffered output
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Short name used in error reports
    fn name(&self) -> &'static str;
}
