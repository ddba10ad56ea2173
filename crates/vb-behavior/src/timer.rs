//! Timer events behaviors schedule for themselves.

use vb_core::{NodeId, Vector2D, VehicleDirection};

/// Snapshot of the RSU a pending response is addressed to, taken when the
/// beacon arrived.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RsuTarget {
    pub rsu:       NodeId,
    pub position:  Vector2D,
    pub direction: VehicleDirection,
}

/// A one-shot timer owned by a behavior.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Timer {
    /// RSU: emit the beacon for `directions[position]`.
    Beacon { position: usize },
    /// RSU: run the peer-timeout sweep.
    Check,
    /// Vehicle: send the randomized response to a beacon.
    Response(RsuTarget),
}
