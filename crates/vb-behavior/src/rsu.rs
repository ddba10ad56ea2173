//! RSU behavior: per-direction beacon scheduler and peer-timeout tracker.
//!
//! # Timelines
//!
//! Two independent periodic timers run while the RSU is up:
//!
//! - **Beacon**: fires at `start`, broadcasts the beacon for
//!   `directions[position]` and re-arms after *that direction's* budget with
//!   `position + 1` (round-robin).  The beacon cycle length is therefore the
//!   sum of all budgets.
//! - **Check**: fires every `check_interval_ms` and evicts every peer
//!   direction not refreshed for more than `timeout_ms`.
//!
//! # Peer map
//!
//! `peers: NodeId → (VehicleDirection → last_seen)`.  A node entry exists only
//! while its inner map is non-empty.  A response from a peer that was just
//! evicted simply re-inserts it.

use std::collections::BTreeMap;

use log::{debug, error, info, trace, warn};

use vb_core::{Direction, NodeId, NodeType, SimTime, VehicleDirection, expand_directions};
use vb_message::{Beacon, BeaconResponse, Message, MessageCategory, NoLongerConformant, Payload, ProtocolId};
use vb_schedule::EventHandle;

use crate::{
    Behavior, BehaviorError, BehaviorResult, NodeContext, NodeInfo, RsuConfig, SpeedSample, Timer,
};

/// Beacon scheduler and peer tracker running on one RSU.
pub struct RsuBehavior {
    config:       RsuConfig,
    directions:   Vec<VehicleDirection>,
    running:      bool,
    beacon_event: Option<EventHandle>,
    check_event:  Option<EventHandle>,
    peers:        BTreeMap<NodeId, BTreeMap<VehicleDirection, SimTime>>,
}

impl RsuBehavior {
    /// Build an RSU from its configuration.
    ///
    /// Fails if the configuration is invalid or if no configured direction
    /// monitors at least one movement.
    pub fn new(config: RsuConfig) -> BehaviorResult<Self> {
        config.validate()?;
        let directions = beacon_list(&config.directions, config.time_beacon_min_ms)?;
        Ok(Self {
            config,
            directions,
            running: false,
            beacon_event: None,
            check_event: None,
            peers: BTreeMap::new(),
        })
    }

    /// Replace the monitored directions.
    ///
    /// A running RSU is stopped, reconfigured and started again, so the new
    /// beacon cycle begins at position 0.  On error nothing changes.
    pub fn set_directions(
        &mut self,
        directions: Vec<Direction>,
        ctx:        &mut NodeContext<'_>,
    ) -> BehaviorResult<()> {
        let list = beacon_list(&directions, self.config.time_beacon_min_ms)?;
        let was_running = self.running;
        if was_running {
            self.stop(ctx);
        }
        info!("RSU {}: reconfigured with {} beacon directions", ctx.node.0, list.len());
        self.config.directions = directions;
        self.directions = list;
        if was_running {
            self.start(ctx);
        }
        Ok(())
    }

    /// Expanded beacon list, in beacon order, with budgets resolved.
    pub fn directions(&self) -> &[VehicleDirection] {
        &self.directions
    }

    pub fn config(&self) -> &RsuConfig {
        &self.config
    }

    /// Last refresh time of `(node, direction)`, if tracked.
    pub fn last_seen(&self, node: NodeId, direction: &VehicleDirection) -> Option<SimTime> {
        self.peers.get(&node)?.get(direction).copied()
    }

    /// Whether any direction of `node` is tracked.
    pub fn is_tracking(&self, node: NodeId) -> bool {
        self.peers.contains_key(&node)
    }

    /// Number of tracked `(node, direction)` pairs.
    pub fn tracked_count(&self) -> usize {
        self.peers.values().map(BTreeMap::len).sum()
    }

    // ── Timer handlers ────────────────────────────────────────────────────

    fn on_beacon(&mut self, position: usize, ctx: &mut NodeContext<'_>) {
        let position = if position < self.directions.len() { position } else { 0 };
        let Some(direction) = self.directions.get(position).copied() else {
            return;
        };
        trace!("RSU {}: beacon event direction={}", ctx.node.0, direction);

        ctx.transport.send(
            NodeType::Vehicle,
            Payload::Beacon(Beacon::for_direction(&direction)),
            ProtocolId::Speed,
            MessageCategory::PROTOCOL,
        );
        debug!("RSU {}: sent beacon for direction {}", ctx.node.0, direction);

        let next = (position + 1) % self.directions.len();
        self.beacon_event =
            Some(ctx.scheduler.schedule(direction.time_ms as u64, Timer::Beacon { position: next }));
    }

    fn on_check(&mut self, ctx: &mut NodeContext<'_>) {
        trace!("RSU {}: check event", ctx.node.0);
        self.check_event = Some(ctx.scheduler.schedule(self.config.check_interval_ms, Timer::Check));
        self.sweep(ctx);
    }

    /// Evict every peer direction idle for longer than the timeout.
    fn sweep(&mut self, ctx: &mut NodeContext<'_>) {
        let now = ctx.now();
        let timeout = self.config.timeout_ms;
        let rsu = ctx.node;

        self.peers.retain(|&node, dirs| {
            dirs.retain(|direction, &mut last_seen| {
                if now.since(last_seen) <= timeout {
                    return true;
                }
                info!(
                    "RSU {}: node {} timeout in direction {}. Was last seen {}",
                    rsu.0,
                    node.0,
                    direction.id(),
                    last_seen
                );
                let info = NodeInfo::bare(node, *direction, last_seen);
                ctx.telemetry.on_timeout(rsu, now, &info);
                false
            });
            !dirs.is_empty()
        });
    }

    // ── Message handlers ──────────────────────────────────────────────────

    fn on_beacon_response(&mut self, message: &Message, response: &BeaconResponse, ctx: &mut NodeContext<'_>) {
        let now = ctx.now();
        let position = message.header.source_position;
        let info = NodeInfo {
            node_id:      message.header.source_id,
            position:     Some(position),
            direction:    response.source_direction,
            conformant:   response.conformant(),
            speeds:       Some(SpeedSample {
                current:  response.current_speed,
                avg_low:  response.avg_speed_low,
                avg_high: response.avg_speed_high,
            }),
            last_seen:    now,
            last_message: response.last_message,
            distance:     Some(ctx.position().distance(position)),
        };
        info!("RSU {}: received info for {}", ctx.node.0, info);

        if info.last_message {
            self.remove_peer(info.node_id, &info.conformant);
            ctx.telemetry.on_last_message(ctx.node, now, &info);
        } else {
            self.peers
                .entry(info.node_id)
                .or_default()
                .insert(info.conformant, now);
            ctx.telemetry.on_beacon_response(ctx.node, now, &info);
        }
    }

    fn on_no_longer_conformant(&mut self, message: &Message, nlc: &NoLongerConformant, ctx: &mut NodeContext<'_>) {
        let now = ctx.now();
        let position = message.header.source_position;
        let info = NodeInfo {
            node_id:      message.header.source_id,
            position:     Some(position),
            direction:    nlc.source_direction,
            conformant:   nlc.conformant(),
            speeds:       None,
            last_seen:    now,
            last_message: false,
            distance:     Some(ctx.position().distance(position)),
        };
        info!("RSU {}: node {} no longer conformant", ctx.node.0, info.node_id.0);
        self.remove_peer(info.node_id, &info.conformant);
        ctx.telemetry.on_no_longer_conformant(ctx.node, now, &info);
    }

    fn remove_peer(&mut self, node: NodeId, direction: &VehicleDirection) {
        if let Some(dirs) = self.peers.get_mut(&node) {
            dirs.remove(direction);
            if dirs.is_empty() {
                self.peers.remove(&node);
            }
        }
    }
}

impl Behavior for RsuBehavior {
    fn name(&self) -> &'static str {
        "rsu"
    }

    fn start(&mut self, ctx: &mut NodeContext<'_>) {
        if !self.config.enabled {
            debug!("RSU {}: disabled, not starting", ctx.node.0);
            return;
        }
        if self.running {
            error!("RSU {}: start called while already running", ctx.node.0);
            return;
        }
        self.running = true;
        self.beacon_event = Some(ctx.scheduler.schedule(0, Timer::Beacon { position: 0 }));
        self.check_event = Some(ctx.scheduler.schedule(self.config.check_interval_ms, Timer::Check));
        info!("RSU {}: started with {} beacon directions", ctx.node.0, self.directions.len());
        ctx.telemetry.on_start_toggle(ctx.node, ctx.now(), true);
    }

    fn stop(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(h) = self.beacon_event.take() {
            ctx.scheduler.cancel(h);
        }
        if let Some(h) = self.check_event.take() {
            ctx.scheduler.cancel(h);
        }
        if self.running {
            self.running = false;
            info!("RSU {}: stopped", ctx.node.0);
            ctx.telemetry.on_start_toggle(ctx.node, ctx.now(), false);
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn is_subscribed_to(&self, protocol: ProtocolId) -> bool {
        protocol == ProtocolId::Speed
    }

    fn receive(&mut self, message: &Message, ctx: &mut NodeContext<'_>) {
        if !self.running {
            trace!("RSU {}: not running, dropping {}", ctx.node.0, message.header.message_type);
            return;
        }
        if let Err(e) = message.validate() {
            warn!("RSU {}: dropping malformed message: {e}", ctx.node.0);
            return;
        }
        match &message.payload {
            Payload::BeaconResponse(r)     => self.on_beacon_response(message, r, ctx),
            Payload::NoLongerConformant(n) => self.on_no_longer_conformant(message, n, ctx),
            Payload::Beacon(_) => {
                warn!("RSU {}: received unexpected message type {}", ctx.node.0, message.header.message_type)
            }
        }
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut NodeContext<'_>) {
        if !self.running {
            return;
        }
        match timer {
            Timer::Beacon { position } => self.on_beacon(position, ctx),
            Timer::Check => self.on_check(ctx),
            Timer::Response(_) => warn!("RSU {}: ignoring vehicle response timer", ctx.node.0),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Expand configured directions into the beacon list, skipping unusable
/// entries and resolving zero budgets to `min_ms`.
fn beacon_list(directions: &[Direction], min_ms: u32) -> BehaviorResult<Vec<VehicleDirection>> {
    for d in directions.iter().filter(|d| !d.is_usable()) {
        warn!("direction {} has approaching=false and leaving=false, skipped", d.angle);
    }

    let mut list = expand_directions(directions);
    if list.is_empty() {
        return Err(BehaviorError::NoDirections);
    }

    let mut total: u64 = 0;
    for d in &mut list {
        if d.time_ms == 0 {
            d.time_ms = min_ms;
            info!("direction {d} beacon time was zero, set to {min_ms}");
        } else {
            info!("direction {d} beacon time is {}", d.time_ms);
        }
        total += d.time_ms as u64;
    }
    info!("total beacon time will be {total}");

    Ok(list)
}
