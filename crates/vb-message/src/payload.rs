//! The three payload shapes and the closed variant over them.

use std::fmt;

use vb_core::{Movement, VehicleDirection};

use crate::MessageType;

/// RSU → vehicles: "respond if you travel along this direction".
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beacon {
    pub direction:           f64,
    pub movement:            Movement,
    /// Upper bound of the response window, ms.
    pub max_response_time:   u32,
}

impl Beacon {
    /// max response time (2) + movement (1) + direction (8).
    pub const SERIALIZED_SIZE: u32 = 2 + 1 + 8;

    pub fn for_direction(direction: &VehicleDirection) -> Self {
        Self {
            direction:         direction.angle,
            movement:          direction.movement,
            max_response_time: direction.time_ms,
        }
    }

    /// The advertised direction, carrying the response window as its budget.
    pub fn vehicle_direction(&self) -> VehicleDirection {
        VehicleDirection::with_time(self.direction, self.movement, self.max_response_time)
    }
}

/// Vehicle → RSU: heading and speed samples for a conformant direction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeaconResponse {
    /// The vehicle's own heading; `None` when the vehicle has no valid heading.
    pub source_direction:      Option<f64>,
    pub conformant_direction:  f64,
    pub current_speed:         f64,
    pub avg_speed_low:         f64,
    pub avg_speed_high:        f64,
    pub movement:              Movement,
    /// Set on the final response of a sink-variant vehicle.
    pub last_message:          bool,
}

impl BeaconResponse {
    /// last message + movement (2) + five doubles.
    pub const SERIALIZED_SIZE: u32 = 2 + 5 * 8;

    pub fn conformant(&self) -> VehicleDirection {
        VehicleDirection::new(self.conformant_direction, self.movement)
    }
}

/// Vehicle → RSU: a previously conformant direction no longer applies.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoLongerConformant {
    pub source_direction:     Option<f64>,
    pub conformant_direction: f64,
    pub movement:             Movement,
}

impl NoLongerConformant {
    /// movement (1) + two doubles.
    pub const SERIALIZED_SIZE: u32 = 1 + 2 * 8;

    pub fn conformant(&self) -> VehicleDirection {
        VehicleDirection::new(self.conformant_direction, self.movement)
    }
}

// ── Payload ───────────────────────────────────────────────────────────────────

/// Closed set of message bodies, dispatched by `match`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    Beacon(Beacon),
    BeaconResponse(BeaconResponse),
    NoLongerConformant(NoLongerConformant),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::Beacon(_)             => MessageType::Beacon,
            Payload::BeaconResponse(_)     => MessageType::BeaconResponse,
            Payload::NoLongerConformant(_) => MessageType::NoLongerConformant,
        }
    }

    pub fn serialized_size(&self) -> u32 {
        match self {
            Payload::Beacon(_)             => Beacon::SERIALIZED_SIZE,
            Payload::BeaconResponse(_)     => BeaconResponse::SERIALIZED_SIZE,
            Payload::NoLongerConformant(_) => NoLongerConformant::SERIALIZED_SIZE,
        }
    }
}

impl From<Beacon> for Payload {
    fn from(b: Beacon) -> Self {
        Payload::Beacon(b)
    }
}

impl From<BeaconResponse> for Payload {
    fn from(r: BeaconResponse) -> Self {
        Payload::BeaconResponse(r)
    }
}

impl From<NoLongerConformant> for Payload {
    fn from(n: NoLongerConformant) -> Self {
        Payload::NoLongerConformant(n)
    }
}

fn fmt_dir(dir: Option<f64>) -> String {
    dir.map_or_else(|| "invalid".to_string(), |d| d.to_string())
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Beacon(b) => write!(
                f,
                "Beacon dir={} {} maxResp={}",
                b.direction, b.movement, b.max_response_time
            ),
            Payload::BeaconResponse(r) => write!(
                f,
                "dir={} curSPD={} avgSPDS={} avgSPDH={} cDir={} {} last={}",
                fmt_dir(r.source_direction),
                r.current_speed,
                r.avg_speed_low,
                r.avg_speed_high,
                r.conformant_direction,
                r.movement,
                r.last_message
            ),
            Payload::NoLongerConformant(n) => write!(
                f,
                "dir={} cDir={} {}",
                fmt_dir(n.source_direction),
                n.conformant_direction,
                n.movement
            ),
        }
    }
}
