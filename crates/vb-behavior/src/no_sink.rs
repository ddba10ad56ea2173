//! Vehicle variant that signals loss of conformance explicitly.
//!
//! Each monitored direction the vehicle has heard of is tracked as active or
//! inactive.  A direction becomes active when a response is sent for it;
//! when the vehicle stops conforming to an active direction the next
//! response slot carries a `NoLongerConformant` instead, and the direction
//! goes back to inactive.

use std::collections::BTreeMap;

use log::{info, trace};

use vb_core::VehicleDirection;
use vb_message::{Message, ProtocolId};

use crate::vehicle::Responder;
use crate::{Behavior, BehaviorResult, NodeContext, RsuTarget, Timer, VehicleConfig};

/// Vehicle behavior with explicit no-longer-conformant signalling.
pub struct NoSinkVehicle {
    core:              Responder,
    active_directions: BTreeMap<VehicleDirection, bool>,
}

impl NoSinkVehicle {
    pub fn new(config: VehicleConfig) -> BehaviorResult<Self> {
        Ok(Self { core: Responder::new(config)?, active_directions: BTreeMap::new() })
    }

    /// `Some(active)` once a beacon for `direction` has been received.
    pub fn is_active(&self, direction: &VehicleDirection) -> Option<bool> {
        self.active_directions.get(direction).copied()
    }

    pub fn active_directions(&self) -> &BTreeMap<VehicleDirection, bool> {
        &self.active_directions
    }

    /// Number of responses waiting to fire.
    pub fn pending_responses(&self) -> usize {
        self.core.pending_count()
    }

    fn on_response(&mut self, target: RsuTarget, ctx: &mut NodeContext<'_>) {
        self.core.response_fired();

        if self.core.is_conformant(&target, ctx) {
            self.active_directions.insert(target.direction, true);
            self.core.send_response(&target, false, ctx);
        } else if self.active_directions.get(&target.direction).copied().unwrap_or(false) {
            self.active_directions.insert(target.direction, false);
            self.core.send_no_longer_conformant(&target, ctx);
        } else {
            trace!(
                "Vehicle {}: direction {} neither conformant nor active, response dropped",
                ctx.node.0, target.direction
            );
        }
    }
}

impl Behavior for NoSinkVehicle {
    fn name(&self) -> &'static str {
        "vehicle_no_sink"
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

        let active = *self.active_directions.entry(target.direction).or_insert(false);
        if active || self.core.is_conformant(&target, ctx) {
            self.core.schedule_response(target, ctx);
        } else {
            info!("Vehicle {}: direction {} not active", ctx.node.0, target.direction);
        }
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut NodeContext<'_>) {
        match timer {
            Timer::Response(target) if self.core.is_running() => self.on_response(target, ctx),
            other => trace!("Vehicle {}: ignoring timer {:?}", ctx.node.0, other),
        }
    }
}
