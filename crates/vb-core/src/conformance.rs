//! Directional conformance: is a vehicle heading the right way, and on the
//! right side of the RSU, for a monitored direction?
//!
//! Two tests are combined:
//!
//! 1. **Heading**: the vehicle heading must be within `tolerance` degrees of
//!    the monitored angle ([`check_directions`]).
//! 2. **Half-plane**: the bearing from the vehicle to the RSU must lie in
//!    `[angle − 90, angle + 90]`, i.e. the RSU is ahead.  For a `Leaving`
//!    direction the result is inverted: the RSU must be behind.
//!
//! Every invalid input (missing heading, non-finite angle, vehicle exactly on
//! the RSU) yields `false`.  Nothing in this module panics.

use crate::{Movement, Vector2D, VehicleDirection, normalize_direction};

/// Default heading tolerance in degrees.
pub const DEFAULT_DIRECTION_TOLERANCE: f64 = 8.0;

#[inline]
fn valid(angle: Option<f64>) -> Option<f64> {
    angle.filter(|a| a.is_finite())
}

/// `true` iff both headings are valid and differ by at most `tolerance`.
///
/// Symmetric in `d1` and `d2`.
pub fn check_directions(d1: Option<f64>, d2: Option<f64>, tolerance: f64) -> bool {
    let (Some(a), Some(b)) = (valid(d1), valid(d2)) else {
        return false;
    };
    normalize_direction(b - a).abs() <= tolerance
}

/// Heading test plus the half-plane test described in the module docs.
pub fn check_direction_and_movement(
    node_direction: Option<f64>,
    from_rsu:       &VehicleDirection,
    tolerance:      f64,
    node_position:  Vector2D,
    rsu_position:   Vector2D,
) -> bool {
    if !check_directions(node_direction, Some(from_rsu.angle), tolerance) {
        return false;
    }
    let Some(bearing) = node_position.to(rsu_position).bearing() else {
        return false;
    };

    let min = normalize_direction(from_rsu.angle - 90.0);
    let max = normalize_direction(from_rsu.angle + 90.0);
    let ahead = if max > min {
        bearing >= min && bearing <= max
    } else {
        bearing >= min || bearing <= max
    };

    match from_rsu.movement {
        Movement::Approaching => ahead,
        Movement::Leaving     => !ahead,
    }
}

/// Conformance checker bound to one heading tolerance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConformanceChecker {
    pub tolerance: f64,
}

impl Default for ConformanceChecker {
    fn default() -> Self {
        Self { tolerance: DEFAULT_DIRECTION_TOLERANCE }
    }
}

impl ConformanceChecker {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    #[inline]
    pub fn is_conformant_direction(&self, node_direction: Option<f64>, direction: f64) -> bool {
        check_directions(node_direction, Some(direction), self.tolerance)
    }

    #[inline]
    pub fn is_conformant(
        &self,
        node_direction: Option<f64>,
        from_rsu:       &VehicleDirection,
        node_position:  Vector2D,
        rsu_position:   Vector2D,
    ) -> bool {
        check_direction_and_movement(node_direction, from_rsu, self.tolerance, node_position, rsu_position)
    }
}
