//! Monitored directions: RSU configuration and the per-mode key derived
//! from it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{VbError, VbResult};

/// Whether a vehicle is travelling towards or away from an RSU.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    Approaching,
    Leaving,
}

impl Movement {
    /// Wire code.
    pub fn code(self) -> u8 {
        match self {
            Movement::Approaching => 0x01,
            Movement::Leaving     => 0x02,
        }
    }

    pub fn from_code(code: u8) -> Option<Movement> {
        match code {
            0x01 => Some(Movement::Approaching),
            0x02 => Some(Movement::Leaving),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Movement::Approaching => "approaching",
            Movement::Leaving     => "leaving",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── VehicleDirection ──────────────────────────────────────────────────────────

/// A monitored (angle, movement) pair plus its beacon/response time budget.
///
/// Identity is `(angle, movement)` only: `time_ms` is carried along but is
/// ignored by `Eq`, `Ord` and `Hash`, so the value can key a map whether or
/// not the budget is known (a `BeaconResponse` does not carry it).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleDirection {
    /// Heading in degrees.
    pub angle: f64,
    pub movement: Movement,
    /// Beacon period and max response time for this direction, ms.
    pub time_ms: u32,
}

impl VehicleDirection {
    pub fn new(angle: f64, movement: Movement) -> Self {
        Self { angle, movement, time_ms: 0 }
    }

    pub fn with_time(angle: f64, movement: Movement, time_ms: u32) -> Self {
        Self { angle, movement, time_ms }
    }

    /// Short textual key, e.g. `"90:a"`.
    pub fn id(&self) -> String {
        let m = match self.movement {
            Movement::Approaching => 'a',
            Movement::Leaving     => 'l',
        };
        format!("{}:{}", self.angle, m)
    }

    /// `-0.0` and `0.0` must compare and hash identically.
    #[inline]
    fn angle_key(&self) -> f64 {
        if self.angle == 0.0 { 0.0 } else { self.angle }
    }
}

impl PartialEq for VehicleDirection {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VehicleDirection {}

impl PartialOrd for VehicleDirection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VehicleDirection {
    fn cmp(&self, other: &Self) -> Ordering {
        self.angle_key()
            .total_cmp(&other.angle_key())
            .then(self.movement.cmp(&other.movement))
    }
}

impl Hash for VehicleDirection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.angle_key().to_bits().hash(state);
        self.movement.hash(state);
    }
}

impl fmt::Display for VehicleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.angle, self.movement)
    }
}

// ── Direction (RSU configuration) ─────────────────────────────────────────────

/// One configured direction of an RSU.  Expands into up to two
/// [`VehicleDirection`]s, one per enabled movement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub angle: f64,
    pub approaching: bool,
    pub leaving: bool,
    /// Budget for the approaching mode, ms.  `0` means "use the RSU minimum".
    pub approaching_time_ms: u32,
    /// Budget for the leaving mode, ms.  `0` means "use the RSU minimum".
    pub leaving_time_ms: u32,
}

impl Direction {
    /// `true` if at least one movement is monitored.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.approaching || self.leaving
    }

    /// Reject angles no heading can ever match.
    pub fn validate(&self) -> VbResult<()> {
        if !self.angle.is_finite() {
            return Err(VbError::NonFiniteAngle(self.angle));
        }
        Ok(())
    }
}

/// Expand configured directions into the ordered beacon list.
///
/// Unusable entries are skipped; within a direction the approaching mode
/// precedes the leaving mode.  The result may be empty and callers decide
/// whether that is fatal.
pub fn expand_directions(directions: &[Direction]) -> Vec<VehicleDirection> {
    let mut out = Vec::with_capacity(directions.len() * 2);
    for d in directions {
        if d.approaching {
            out.push(VehicleDirection::with_time(d.angle, Movement::Approaching, d.approaching_time_ms));
        }
        if d.leaving {
            out.push(VehicleDirection::with_time(d.angle, Movement::Leaving, d.leaving_time_ms));
        }
    }
    out
}
