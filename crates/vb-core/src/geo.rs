//! Planar coordinate type and angle utilities.
//!
//! Positions are simulator metres in a flat x/y frame.  Angles are degrees
//! measured counter-clockwise from the +x axis, the convention used by
//! `atan2`, and are canonically kept in `(-180, 180]`.

use std::fmt;

/// An immutable 2-D position or displacement.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle_deg`.
    #[inline]
    pub fn from_angle(angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    /// Euclidean distance between `self` and `other`.
    #[inline]
    pub fn distance(self, other: Vector2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Displacement from `self` to `other`.
    #[inline]
    pub fn to(self, other: Vector2D) -> Vector2D {
        Vector2D::new(other.x - self.x, other.y - self.y)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Vector2D {
        Vector2D::new(self.x * k, self.y * k)
    }

    /// Bearing of this displacement in degrees, normalised.
    ///
    /// Returns `None` for the zero vector, whose bearing is undefined.
    pub fn bearing(self) -> Option<f64> {
        if self.x == 0.0 && self.y == 0.0 {
            return None;
        }
        Some(normalize_direction(self.y.atan2(self.x).to_degrees()))
    }
}

impl std::ops::Add for Vector2D {
    type Output = Vector2D;
    #[inline]
    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Map any finite angle into `(-180, 180]`.
///
/// Idempotent: `normalize_direction(normalize_direction(a)) == normalize_direction(a)`.
/// Non-finite input is returned unchanged.
pub fn normalize_direction(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -180.0 && angle <= 180.0) {
        return angle;
    }
    let mut r = angle.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 {
        r -= 360.0;
    }
    if r > 180.0 { r - 360.0 } else { r }
}

/// Signed difference `angle2 - angle1`, normalised.
#[inline]
pub fn angle_difference(angle1: f64, angle2: f64) -> f64 {
    normalize_direction(angle2 - angle1)
}
