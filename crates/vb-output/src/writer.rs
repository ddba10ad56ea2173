//! The `OutputWriter` trait implemented by backend writers.

use crate::{EventRow, OutputResult, TransitRow};

/// Destination for telemetry rows.
///
/// [`TelemetryOutput`][crate::TelemetryOutput] calls these from infallible
/// telemetry callbacks, so it keeps the first error for the caller to
/// collect.
pub trait OutputWriter {
    /// Write a batch of telemetry event rows.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write a batch of completed transits.
    fn write_transits(&mut self, rows: &[TransitRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
