//! Immutable per-instance configuration.
//!
//! Each behavior receives its own configuration value at construction time;
//! nothing is read from process-wide state.  The `Default` impls carry the
//! protocol's reference values.

use vb_core::{DEFAULT_DIRECTION_TOLERANCE, Direction};

use crate::{BehaviorError, BehaviorResult};

/// Configuration of one [`RsuBehavior`][crate::RsuBehavior].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsuConfig {
    /// A disabled RSU ignores `start` and every received message.
    pub enabled: bool,

    /// Monitored directions, in beacon order.
    pub directions: Vec<Direction>,

    /// Budget substituted for a direction whose own budget is zero, ms.
    pub time_beacon_min_ms: u32,

    /// Period of the peer-timeout sweep, ms.
    pub check_interval_ms: u64,

    /// A peer direction not refreshed for longer than this is evicted, ms.
    pub timeout_ms: u64,
}

impl Default for RsuConfig {
    fn default() -> Self {
        Self {
            enabled:            true,
            directions:         Vec::new(),
            time_beacon_min_ms: 250,
            check_interval_ms:  1_000,
            timeout_ms:         3_000,
        }
    }
}

impl RsuConfig {
    pub fn with_directions(directions: Vec<Direction>) -> Self {
        Self { directions, ..Self::default() }
    }

    /// Reject values the RSU cannot run with.  The direction list itself is
    /// checked by [`RsuBehavior::new`][crate::RsuBehavior::new].
    pub fn validate(&self) -> BehaviorResult<()> {
        if self.check_interval_ms == 0 {
            return Err(BehaviorError::Config("check_interval_ms must be > 0".into()));
        }
        if self.time_beacon_min_ms == 0 {
            return Err(BehaviorError::Config("time_beacon_min_ms must be > 0".into()));
        }
        for d in &self.directions {
            d.validate()?;
        }
        Ok(())
    }
}

/// Configuration shared by both vehicle variants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleConfig {
    /// A disabled vehicle ignores `start` and every received message.
    pub enabled: bool,

    /// Minimum gap kept at both ends of the response window, ms.
    pub response_spacing_ms: u32,

    /// Sink variant only: distance to the RSU below which an approaching
    /// vehicle sends its final response and mutes.
    pub sink_threshold: f64,

    /// Heading tolerance of the conformance test, degrees.
    pub direction_tolerance: f64,

    /// Samples averaged for `avg_speed_low`.
    pub avg_speed_samples_low: u16,

    /// Samples averaged for `avg_speed_high`.
    pub avg_speed_samples_high: u16,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            enabled:                true,
            response_spacing_ms:    10,
            sink_threshold:         20.0,
            direction_tolerance:    DEFAULT_DIRECTION_TOLERANCE,
            avg_speed_samples_low:  5,
            avg_speed_samples_high: 15,
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> BehaviorResult<()> {
        if !(self.sink_threshold >= 0.0) {
            return Err(BehaviorError::Config(format!(
                "sink_threshold must be a non-negative number, got {}",
                self.sink_threshold
            )));
        }
        if !(self.direction_tolerance >= 0.0) {
            return Err(BehaviorError::Config(format!(
                "direction_tolerance must be a non-negative number, got {}",
                self.direction_tolerance
            )));
        }
        Ok(())
    }
}
