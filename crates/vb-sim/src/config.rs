//! Run-level configuration of the harness.

use vb_core::SimTime;

use crate::{SimError, SimResult};

/// Global parameters of one simulation run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// `run` stops once the clock reaches this time.
    pub end_time: SimTime,

    /// Delay between a send and the delivery to each receiver, ms.
    pub link_delay_ms: u64,

    /// Receivers farther than this from the sender (at send time) miss the
    /// message, metres.
    pub radio_range_m: f64,

    /// Period of one speed sample.  `Kinematics::speed(n)` averages over the
    /// last `n` periods, ms.
    pub speed_sample_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:            42,
            end_time:        SimTime::from_secs(60),
            link_delay_ms:   1,
            radio_range_m:   500.0,
            speed_sample_ms: 1_000,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.radio_range_m > 0.0) {
            return Err(SimError::Config(format!(
                "radio_range_m must be positive, got {}",
                self.radio_range_m
            )));
        }
        if self.speed_sample_ms == 0 {
            return Err(SimError::Config("speed_sample_ms must be > 0".into()));
        }
        Ok(())
    }
}
