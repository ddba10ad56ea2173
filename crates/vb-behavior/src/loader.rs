//! CSV direction loader.
//!
//! # CSV format
//!
//! One row per monitored direction, in beacon order.
//!
//! ```csv
//! angle,approaching,leaving,approaching_time_ms,leaving_time_ms
//! 0,true,false,1000,0
//! 90,true,true,500,500
//! -90,false,true,0,250
//! ```
//!
//! A budget of `0` is replaced by the RSU's `time_beacon_min_ms` when the
//! RSU is built.  Rows with both flags false are kept here and skipped (with
//! a warning) by the RSU, so the file can switch directions off without
//! deleting them.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use vb_core::{Direction, normalize_direction};

use crate::{BehaviorError, BehaviorResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DirectionRecord {
    angle:               f64,
    approaching:         bool,
    leaving:             bool,
    approaching_time_ms: u32,
    leaving_time_ms:     u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load an RSU direction list from a CSV file.
pub fn load_directions_csv(path: &Path) -> BehaviorResult<Vec<Direction>> {
    let file = std::fs::File::open(path).map_err(BehaviorError::Io)?;
    load_directions_reader(file)
}

/// Like [`load_directions_csv`] but accepts any `Read` source.
pub fn load_directions_reader<R: Read>(reader: R) -> BehaviorResult<Vec<Direction>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();

    for result in csv_reader.deserialize::<DirectionRecord>() {
        let r = result.map_err(|e| BehaviorError::Parse(e.to_string()))?;
        let mut d = Direction {
            angle:               r.angle,
            approaching:         r.approaching,
            leaving:             r.leaving,
            approaching_time_ms: r.approaching_time_ms,
            leaving_time_ms:     r.leaving_time_ms,
        };
        d.validate()?;
        d.angle = normalize_direction(d.angle);
        out.push(d);
    }

    Ok(out)
}
