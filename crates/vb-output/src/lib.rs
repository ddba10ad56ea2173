//! `vb-output`: telemetry output writers for the rsu_beacon protocol.
//!
//! | Backend | Files created                              |
//! |---------|--------------------------------------------|
//! | CSV     | `telemetry_events.csv`, `transits.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`TelemetryOutput`], which implements `vb_behavior::Telemetry` and can be
//! handed to `Sim::run` directly or fanned out next to another sink.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vb_output::{CsvWriter, TelemetryOutput};
//!
//! let mut out = TelemetryOutput::new(CsvWriter::new(Path::new("./output"))?);
//! sim.run(&mut out, &mut NoopObserver)?;
//! out.finish()?;
//! ```

pub mod bridge;
pub mod csv;
pub mod error;
pub mod row;
pub mod writer;


pub use bridge::TelemetryOutput;
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{EventRow, TransitRow};
pub use writer::OutputWriter;
