//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `telemetry_events.csv`
//! - `transits.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, TransitRow};

pub const EVENTS_FILE: &str = "telemetry_events.csv";
pub const TRANSITS_FILE: &str = "transits.csv";

/// Writes telemetry output to two CSV files.
pub struct CsvWriter {
    events:   Writer<File>,
    transits: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join(EVENTS_FILE))?;
        events.write_record(EventRow::HEADERS)?;

        let mut transits = Writer::from_path(dir.join(TRANSITS_FILE))?;
        transits.write_record(TransitRow::HEADERS)?;

        Ok(Self { events, transits, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(row.record())?;
        }
        Ok(())
    }

    fn write_transits(&mut self, rows: &[TransitRow]) -> OutputResult<()> {
        for row in rows {
            self.transits.write_record(row.record())?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.transits.flush()?;
        Ok(())
    }
}
