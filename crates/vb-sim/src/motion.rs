//! Analytic node motion and the `Kinematics` view behaviors see.
//!
//! Motion is a closed-form function of time, so any instant can be evaluated
//! without stepping.  Speed averages are taken over whole sample periods of
//! the path odometer, which is what a per-step speed sampler would report
//! for the same trajectory.

use vb_behavior::Kinematics;
use vb_core::{SimTime, Vector2D};

/// How a node moves over time.  Speeds are m/s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Motion {
    /// Never moves and has no heading.
    Fixed(Vector2D),

    /// Waits at `origin` until `depart`, then moves with constant `velocity`.
    Linear {
        origin:   Vector2D,
        velocity: Vector2D,
        depart:   SimTime,
    },

    /// Waits at the first waypoint until `depart`, then follows the
    /// polyline at constant `speed` and stops at the last waypoint.
    Route {
        waypoints: Vec<Vector2D>,
        speed:     f64,
        depart:    SimTime,
    },
}

#[inline]
fn elapsed_secs(now: SimTime, depart: SimTime) -> f64 {
    now.since(depart) as f64 / 1_000.0
}

impl Motion {
    /// Total path length covered by time `t`, metres.
    pub fn odometer(&self, t: SimTime) -> f64 {
        match self {
            Motion::Fixed(_) => 0.0,
            Motion::Linear { velocity, depart, .. } => velocity.length() * elapsed_secs(t, *depart),
            Motion::Route { waypoints, speed, depart } => {
                (speed.max(0.0) * elapsed_secs(t, *depart)).min(route_length(waypoints))
            }
        }
    }

    pub fn position_at(&self, t: SimTime) -> Vector2D {
        match self {
            Motion::Fixed(p) => *p,
            Motion::Linear { origin, velocity, depart } => *origin + velocity.scale(elapsed_secs(t, *depart)),
            Motion::Route { waypoints, .. } => walk(waypoints, self.odometer(t)).0,
        }
    }

    /// Whether the node is under way at `t`.
    pub fn is_moving(&self, t: SimTime) -> bool {
        match self {
            Motion::Fixed(_) => false,
            Motion::Linear { velocity, depart, .. } => t >= *depart && velocity.length() > 0.0,
            Motion::Route { waypoints, speed, depart } => {
                t >= *depart && *speed > 0.0 && self.odometer(t) < route_length(waypoints)
            }
        }
    }

    /// Heading in degrees while moving, `None` otherwise.
    pub fn heading_at(&self, t: SimTime) -> Option<f64> {
        if !self.is_moving(t) {
            return None;
        }
        match self {
            Motion::Fixed(_) => None,
            Motion::Linear { velocity, .. } => velocity.bearing(),
            Motion::Route { waypoints, .. } => walk(waypoints, self.odometer(t)).1,
        }
    }

    /// Speed at exactly `t`.
    pub fn speed_at(&self, t: SimTime) -> f64 {
        if !self.is_moving(t) {
            return 0.0;
        }
        match self {
            Motion::Fixed(_) => 0.0,
            Motion::Linear { velocity, .. } => velocity.length(),
            Motion::Route { speed, .. } => *speed,
        }
    }

    /// Mean speed over the `window_ms` before `now`.  Falls back to the
    /// instantaneous speed for an empty window.
    pub fn average_speed(&self, now: SimTime, window_ms: u64) -> f64 {
        let from = SimTime(now.0.saturating_sub(window_ms));
        let dt = now.since(from);
        if dt == 0 {
            return self.speed_at(now);
        }
        (self.odometer(now) - self.odometer(from)) / (dt as f64 / 1_000.0)
    }
}

fn route_length(waypoints: &[Vector2D]) -> f64 {
    waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Point at path distance `d` and the heading of the segment it lies on.
fn walk(waypoints: &[Vector2D], mut d: f64) -> (Vector2D, Option<f64>) {
    let Some(&first) = waypoints.first() else {
        return (Vector2D::ZERO, None);
    };
    let mut heading = None;
    for w in waypoints.windows(2) {
        let seg = w[0].to(w[1]);
        let len = seg.length();
        if len == 0.0 {
            continue;
        }
        heading = seg.bearing();
        if d <= len {
            return (w[0] + seg.scale(d / len), heading);
        }
        d -= len;
    }
    (waypoints.last().copied().unwrap_or(first), heading)
}

// ── Kinematics view ───────────────────────────────────────────────────────────

/// [`Kinematics`] of one node frozen at one instant.
pub struct MotionKinematics<'m> {
    pub motion:    &'m Motion,
    pub now:       SimTime,
    pub sample_ms: u64,
}

impl Kinematics for MotionKinematics<'_> {
    fn position(&self) -> Vector2D {
        self.motion.position_at(self.now)
    }

    fn direction(&self) -> Option<f64> {
        self.motion.heading_at(self.now)
    }

    fn speed(&self, samples: u16) -> f64 {
        self.motion.average_speed(self.now, samples as u64 * self.sample_ms)
    }
}
