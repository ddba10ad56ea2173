//! `NodeInfo`: one peer observation handed to telemetry.

use std::fmt;

use vb_core::{NodeId, SimTime, Vector2D, VehicleDirection};

/// Speed samples reported in a `BeaconResponse`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedSample {
    pub current:  f64,
    pub avg_low:  f64,
    pub avg_high: f64,
}

/// Snapshot of a vehicle as seen by an RSU (or as reported by the vehicle
/// itself when it sends).
///
/// Built per event, passed by reference to [`Telemetry`][crate::Telemetry]
/// and then dropped.  Fields the event cannot know are `None`: a timeout has
/// no position, a no-longer-conformant signal carries no speeds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeInfo {
    /// The vehicle this observation is about.
    pub node_id:      NodeId,
    pub position:     Option<Vector2D>,
    /// The vehicle's own heading.
    pub direction:    Option<f64>,
    /// The monitored direction the vehicle conforms to.
    pub conformant:   VehicleDirection,
    pub speeds:       Option<SpeedSample>,
    pub last_seen:    SimTime,
    pub last_message: bool,
    /// Distance between the vehicle and the RSU.
    pub distance:     Option<f64>,
}

impl NodeInfo {
    /// Observation with only identity, direction and timestamp known.
    pub fn bare(node_id: NodeId, conformant: VehicleDirection, last_seen: SimTime) -> Self {
        Self {
            node_id,
            position: None,
            direction: None,
            conformant,
            speeds: None,
            last_seen,
            last_message: false,
            distance: None,
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} [{}] seen={}", self.node_id.0, self.conformant, self.last_seen)?;
        if let Some(p) = self.position {
            write!(f, " pos={p}")?;
        }
        if let Some(d) = self.distance {
            write!(f, " dist={d:.1}")?;
        }
        if let Some(s) = self.speeds {
            write!(f, " spd={:.2}/{:.2}/{:.2}", s.current, s.avg_low, s.avg_high)?;
        }
        if self.last_message {
            f.write_str(" last")?;
        }
        Ok(())
    }
}
