//! Vehicle variant that mutes itself once it reaches the RSU.
//!
//! An approaching vehicle responds to every beacon of a conformant direction
//! until it comes within `sink_threshold` of the RSU.  Its response at that
//! point carries `last_message = true` and further beacons for the same
//! (RSU, direction) are ignored.
//!
//! Only one mute record is kept.  A beacon from a different RSU or for a
//! different direction replaces it, which un-mutes the previous pair.  This
//! assumes a vehicle interacts with one RSU direction at a time.

use log::{info, trace, warn};

use vb_core::{Movement, NodeId, VehicleDirection};
use vb_message::{Message, ProtocolId};

use crate::vehicle::Responder;
use crate::{Behavior, BehaviorResult, NodeContext, RsuTarget, Timer, VehicleConfig};

/// The single (RSU, direction) pair a sink vehicle tracks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MuteRecord {
    pub rsu:       NodeId,
    pub direction: VehicleDirection,
    pub muted:     bool,
}

impl MuteRecord {
    #[inline]
    fn is_for(&self, rsu: NodeId, direction: &VehicleDirection) -> bool {
        self.rsu == rsu && self.direction == *direction
    }
}

/// Threshold-muting vehicle behavior.
pub struct SinkVehicle {
    core: Responder,
    mute: Option<MuteRecord>,
}

impl SinkVehicle {
    pub fn new(config: VehicleConfig) -> BehaviorResult<Self> {
        Ok(Self { core: Responder::new(config)?, mute: None })
    }

    pub fn mute_record(&self) -> Option<MuteRecord> {
        self.mute
    }

    /// `true` if responses to `(rsu, direction)` are currently muted.
    pub fn is_muted(&self, rsu: NodeId, direction: &VehicleDirection) -> bool {
        self.mute.is_some_and(|m| m.muted && m.is_for(rsu, direction))
    }

    /// Number of responses waiting to fire.
    pub fn pending_responses(&self) -> usize {
        self.core.pending_count()
    }

    fn on_response(&mut self, target: RsuTarget, ctx: &mut NodeContext<'_>) {
        self.core.response_fired();

        if !self.core.is_conformant(&target, ctx) {
            warn!(
                "Vehicle {}: direction no longer conformant. current={:?} rsu direction={}",
                ctx.node.0,
                ctx.kinematics.direction(),
                target.direction
            );
            return;
        }

        let distance = ctx.position().distance(target.position);
        let last = distance < self.core.config.sink_threshold
            && target.direction.movement == Movement::Approaching;
        if last {
            info!(
                "Vehicle {}: crossed the sink threshold. distance={distance:.1} sink={}. Last message sent.",
                ctx.node.0, self.core.config.sink_threshold
            );
            self.mute = Some(MuteRecord { rsu: target.rsu, direction: target.direction, muted: true });
        }
        self.core.send_response(&target, last, ctx);
    }
}

impl Behavior for SinkVehicle {
    fn name(&self) -> &'static str {
        "vehicle_sink"
    }

    fn start(&mut self, ctx: &mut NodeContext<'_>) {
        self.core.start(ctx);
    }

    fn stop(&mut self, ctx: &mut NodeContext<'_>) {
        self.core.stop(ctx);
    }

    fn is_running(&self) -> bool {
        self.core.is_running()
    }

    fn is_subscribed_to(&self, protocol: ProtocolId) -> bool {
        protocol == ProtocolId::Speed
    }

    fn receive(&mut self, message: &Message, ctx: &mut NodeContext<'_>) {
        let Some(target) = self.core.beacon_target(message, ctx) else {
            return;
        };

        if self.is_muted(target.rsu, &target.direction) {
            info!(
                "Vehicle {}: sink threshold of {} reached for RSU {} direction {}",
                ctx.node.0, self.core.config.sink_threshold, target.rsu.0, target.direction
            );
            return;
        }

        if !self.core.is_conformant(&target, ctx) {
            info!(
                "Vehicle {}: beacon direction {} is not conformant with current direction {:?}",
                ctx.node.0,
                target.direction,
                ctx.kinematics.direction()
            );
            return;
        }

        if !self.mute.is_some_and(|m| m.is_for(target.rsu, &target.direction)) {
            self.mute = Some(MuteRecord { rsu: target.rsu, direction: target.direction, muted: false });
        }
        self.core.schedule_response(target, ctx);
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut NodeContext<'_>) {
        match timer {
            Timer::Response(target) if self.core.is_running() => self.on_response(target, ctx),
            other => trace!("Vehicle {}: ignoring timer {:?}", ctx.node.0, other),
        }
    }
}
