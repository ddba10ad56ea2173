//! State and helpers shared by the two vehicle variants.

use log::{debug, error, info, warn};

use vb_core::ConformanceChecker;
use vb_message::{
    BeaconResponse, Message, MessageCategory, MessageType, NoLongerConformant, Payload, ProtocolId,
};
use vb_schedule::EventHandle;

use crate::{BehaviorResult, NodeContext, NodeInfo, RsuTarget, SpeedSample, Timer, VehicleConfig};

/// Lifecycle, conformance and response scheduling common to
/// [`SinkVehicle`][crate::SinkVehicle] and
/// [`NoSinkVehicle`][crate::NoSinkVehicle].
///
/// At most one response is pending per vehicle: a new beacon cancels the
/// previous response, whichever RSU or direction it was for.
pub(crate) struct Responder {
    pub(crate) config: VehicleConfig,
    checker:           ConformanceChecker,
    running:           bool,
    pending:           Option<EventHandle>,
}

impl Responder {
    pub(crate) fn new(config: VehicleConfig) -> BehaviorResult<Self> {
        config.validate()?;
        Ok(Self {
            checker: ConformanceChecker::new(config.direction_tolerance),
            config,
            running: false,
            pending: None,
        })
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.is_some() as usize
    }

    pub(crate) fn start(&mut self, ctx: &mut NodeContext<'_>) {
        if !self.config.enabled {
            debug!("Vehicle {}: disabled, not starting", ctx.node.0);
            return;
        }
        if self.running {
            error!("Vehicle {}: start called while already running", ctx.node.0);
            return;
        }
        self.running = true;
        ctx.telemetry.on_start_toggle(ctx.node, ctx.now(), true);
    }

    pub(crate) fn stop(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(handle) = self.pending.take() {
            ctx.scheduler.cancel(handle);
        }
        if self.running {
            self.running = false;
            ctx.telemetry.on_start_toggle(ctx.node, ctx.now(), false);
        }
    }

    /// Extract the beacon target from a received message, or log why the
    /// message is dropped.
    pub(crate) fn beacon_target(&self, message: &Message, ctx: &NodeContext<'_>) -> Option<RsuTarget> {
        if !self.running {
            return None;
        }
        if let Err(e) = message.validate() {
            warn!("Vehicle {}: dropping malformed message: {e}", ctx.node.0);
            return None;
        }
        match &message.payload {
            Payload::Beacon(b) => Some(RsuTarget {
                rsu:       message.header.source_id,
                position:  message.header.source_position,
                direction: b.vehicle_direction(),
            }),
            _ => {
                warn!(
                    "Vehicle {}: received an unknown message {}",
                    ctx.node.0, message.header.message_type
                );
                None
            }
        }
    }

    /// Heading and half-plane test against `target` at the current time.
    pub(crate) fn is_conformant(&self, target: &RsuTarget, ctx: &NodeContext<'_>) -> bool {
        self.checker.is_conformant(
            ctx.kinematics.direction(),
            &target.direction,
            ctx.position(),
            target.position,
        )
    }

    /// Cancel the pending response, if any, and schedule a new one for
    /// `target` after a uniform delay in `[spacing, max_response_time - spacing]`.
    pub(crate) fn schedule_response(&mut self, target: RsuTarget, ctx: &mut NodeContext<'_>) {
        if let Some(old) = self.pending.take() {
            ctx.scheduler.cancel(old);
        }

        let spacing = self.config.response_spacing_ms as u64;
        let max = target.direction.time_ms as u64;
        let delay = ctx.rng.uniform_inclusive(spacing, max.saturating_sub(spacing));

        self.pending = Some(ctx.scheduler.schedule(delay, Timer::Response(target)));
        info!(
            "Vehicle {}: scheduled a beacon response to RSU {} in {delay}ms for direction {}",
            ctx.node.0, target.rsu.0, target.direction
        );
    }

    /// Forget the handle of the response timer that just fired.  Cancelled
    /// timers never fire, so the firing one is always the pending one.
    pub(crate) fn response_fired(&mut self) {
        self.pending = None;
    }

    /// Send a `BeaconResponse` to the target RSU and report it.
    pub(crate) fn send_response(&self, target: &RsuTarget, last_message: bool, ctx: &mut NodeContext<'_>) {
        let k = ctx.kinematics;
        let speeds = SpeedSample {
            current:  k.speed(1),
            avg_low:  k.speed(self.config.avg_speed_samples_low),
            avg_high: k.speed(self.config.avg_speed_samples_high),
        };
        let info = self.self_info(target, Some(speeds), last_message, ctx);

        let response = BeaconResponse {
            source_direction:     info.direction,
            conformant_direction: target.direction.angle,
            current_speed:        speeds.current,
            avg_speed_low:        speeds.avg_low,
            avg_speed_high:       speeds.avg_high,
            movement:             target.direction.movement,
            last_message,
        };
        ctx.transport.send_to(
            target.rsu,
            Payload::BeaconResponse(response),
            ProtocolId::Speed,
            MessageCategory::PROTOCOL,
        );
        ctx.telemetry.on_response_sent(ctx.node, ctx.now(), target.rsu, MessageType::BeaconResponse, &info);
        debug!(
            "Vehicle {}: sent beacon response to RSU {} for direction={} distance={:.1} last={}",
            ctx.node.0,
            target.rsu.0,
            target.direction,
            info.distance.unwrap_or_default(),
            last_message
        );
    }

    /// Send a `NoLongerConformant` to the target RSU and report it.
    pub(crate) fn send_no_longer_conformant(&self, target: &RsuTarget, ctx: &mut NodeContext<'_>) {
        let info = self.self_info(target, None, false, ctx);
        let nlc = NoLongerConformant {
            source_direction:     info.direction,
            conformant_direction: target.direction.angle,
            movement:             target.direction.movement,
        };
        ctx.transport.send_to(
            target.rsu,
            Payload::NoLongerConformant(nlc),
            ProtocolId::Speed,
            MessageCategory::PROTOCOL,
        );
        ctx.telemetry.on_response_sent(ctx.node, ctx.now(), target.rsu, MessageType::NoLongerConformant, &info);
        debug!(
            "Vehicle {}: sent no-longer-conformant to RSU {}. dir={:?} expected={} dist={:.1}",
            ctx.node.0,
            target.rsu.0,
            info.direction,
            target.direction,
            info.distance.unwrap_or_default()
        );
    }

    fn self_info(
        &self,
        target:       &RsuTarget,
        speeds:       Option<SpeedSample>,
        last_message: bool,
        ctx:          &NodeContext<'_>,
    ) -> NodeInfo {
        let position = ctx.position();
        NodeInfo {
            node_id: ctx.node,
            position: Some(position),
            direction: ctx.kinematics.direction(),
            conformant: target.direction,
            speeds,
            last_seen: ctx.now(),
            last_message,
            distance: Some(position.distance(target.position)),
        }
    }
}
