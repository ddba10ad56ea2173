//! Unit tests for vb-behavior.

use vb_core::{Direction, Movement, NodeId, NodeRng, NodeType, SimTime, Vector2D, VehicleDirection};
use vb_message::{
    Beacon, BeaconResponse, CommonHeader, Message, MessageCategory, MessageType, NoLongerConformant,
    Payload, ProtocolId,
};
use vb_schedule::EventQueue;

use crate::{
    Behavior, EventLog, Kinematics, NodeContext, NodeInfo, Telemetry, TelemetryKind, Timer,
    TransitCollector, Transport,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const RSU: NodeId = NodeId(1);
const VEHICLE: NodeId = NodeId(7);

#[derive(Clone, Debug, PartialEq)]
enum Dest {
    Broadcast(NodeType),
    Unicast(NodeId),
}

#[derive(Default)]
struct RecordingTransport {
    sent: Vec<(Dest, Payload)>,
}

impl Transport for RecordingTransport {
    fn send(&mut self, target: NodeType, payload: Payload, _p: ProtocolId, _c: MessageCategory) {
        self.sent.push((Dest::Broadcast(target), payload));
    }

    fn send_to(&mut self, destination: NodeId, payload: Payload, _p: ProtocolId, _c: MessageCategory) {
        self.sent.push((Dest::Unicast(destination), payload));
    }
}

/// Kinematics frozen at one state.  `speed(n)` returns `base + n` so tests can
/// tell which sample count was requested.
struct StaticKinematics {
    position:  Vector2D,
    direction: Option<f64>,
    base:      f64,
}

impl Kinematics for StaticKinematics {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn direction(&self) -> Option<f64> {
        self.direction
    }
    fn speed(&self, samples: u16) -> f64 {
        self.base + samples as f64
    }
}

/// One node's surroundings: its own event queue, a recording transport and
/// telemetry fanned out to an `EventLog` and a `TransitCollector`.
struct Harness {
    node:      NodeId,
    queue:     EventQueue<Timer>,
    transport: RecordingTransport,
    kin:       StaticKinematics,
    telemetry: (EventLog, TransitCollector),
    rng:       NodeRng,
}

impl Harness {
    fn new(node: NodeId, position: Vector2D, direction: Option<f64>) -> Self {
        Self {
            node,
            queue: EventQueue::new(),
            transport: RecordingTransport::default(),
            kin: StaticKinematics { position, direction, base: 10.0 },
            telemetry: (EventLog::new(), TransitCollector::new()),
            rng: NodeRng::new(42, node),
        }
    }

    fn rsu() -> Self {
        Self::new(RSU, Vector2D::ZERO, None)
    }

    fn vehicle(position: Vector2D, direction: Option<f64>) -> Self {
        Self::new(VEHICLE, position, direction)
    }

    fn ctx(&mut self) -> NodeContext<'_> {
        NodeContext::new(
            self.node,
            &mut self.queue,
            &mut self.transport,
            &self.kin,
            &mut self.telemetry,
            &mut self.rng,
        )
    }

    fn log(&self) -> &EventLog {
        &self.telemetry.0
    }

    fn start(&mut self, b: &mut dyn Behavior) {
        b.start(&mut self.ctx());
    }

    fn deliver(&mut self, b: &mut dyn Behavior, message: Message) {
        b.receive(&message, &mut self.ctx());
    }

    /// Fire the next timer; returns its time.
    fn fire_next(&mut self, b: &mut dyn Behavior) -> Option<SimTime> {
        let (at, timer) = self.queue.pop()?;
        b.on_timer(timer, &mut self.ctx());
        Some(at)
    }

    fn run_until(&mut self, b: &mut dyn Behavior, until: SimTime) {
        while let Some((_, timer)) = self.queue.pop_until(until) {
            b.on_timer(timer, &mut self.ctx());
        }
        self.queue.advance_to(until);
    }

    fn responses(&self) -> Vec<(NodeId, BeaconResponse)> {
        self.transport
            .sent
            .iter()
            .filter_map(|(d, p)| match (d, p) {
                (Dest::Unicast(to), Payload::BeaconResponse(r)) => Some((*to, *r)),
                _ => None,
            })
            .collect()
    }

    fn no_longer_conformant(&self) -> Vec<(NodeId, NoLongerConformant)> {
        self.transport
            .sent
            .iter()
            .filter_map(|(d, p)| match (d, p) {
                (Dest::Unicast(to), Payload::NoLongerConformant(n)) => Some((*to, *n)),
                _ => None,
            })
            .collect()
    }

    fn beacons(&self) -> Vec<Beacon> {
        self.transport
            .sent
            .iter()
            .filter_map(|(d, p)| match (d, p) {
                (Dest::Broadcast(NodeType::Vehicle), Payload::Beacon(b)) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

fn header(source: NodeId, source_type: NodeType, position: Vector2D, dest_type: NodeType, dest: NodeId) -> CommonHeader {
    CommonHeader {
        protocol_id:      ProtocolId::Speed,
        message_type:     MessageType::Beacon,
        source_type,
        source_id:        source,
        source_position:  position,
        destination_type: dest_type,
        destination_id:   dest,
    }
}

fn beacon_from(rsu: NodeId, position: Vector2D, direction: VehicleDirection) -> Message {
    Message::new(
        header(rsu, NodeType::Rsu, position, NodeType::Vehicle, NodeId::ALL),
        Payload::Beacon(Beacon::for_direction(&direction)),
    )
}

fn response_from(vehicle: NodeId, position: Vector2D, direction: VehicleDirection, last: bool) -> Message {
    Message::new(
        header(vehicle, NodeType::Vehicle, position, NodeType::Rsu, RSU),
        Payload::BeaconResponse(BeaconResponse {
            source_direction:     Some(direction.angle),
            conformant_direction: direction.angle,
            current_speed:        12.0,
            avg_speed_low:        11.0,
            avg_speed_high:       10.0,
            movement:             direction.movement,
            last_message:         last,
        }),
    )
}

fn nlc_from(vehicle: NodeId, position: Vector2D, direction: VehicleDirection) -> Message {
    Message::new(
        header(vehicle, NodeType::Vehicle, position, NodeType::Rsu, RSU),
        Payload::NoLongerConformant(NoLongerConformant {
            source_direction:     Some(direction.angle + 90.0),
            conformant_direction: direction.angle,
            movement:             direction.movement,
        }),
    )
}

fn east_approaching() -> VehicleDirection {
    VehicleDirection::with_time(0.0, Movement::Approaching, 1_000)
}

fn one_direction(angle: f64, approaching_ms: u32) -> Vec<Direction> {
    vec![Direction {
        angle,
        approaching: true,
        leaving: false,
        approaching_time_ms: approaching_ms,
        leaving_time_ms: 0,
    }]
}

// ── Config / loader ───────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use std::io::Cursor;

    use vb_core::VbError;

    use crate::{BehaviorError, RsuConfig, VehicleConfig, load_directions_reader};

    use super::*;

    #[test]
    fn defaults() {
        let r = RsuConfig::default();
        assert!(r.enabled);
        assert_eq!(r.time_beacon_min_ms, 250);
        assert_eq!(r.check_interval_ms, 1_000);
        assert_eq!(r.timeout_ms, 3_000);

        let v = VehicleConfig::default();
        assert_eq!(v.response_spacing_ms, 10);
        assert_eq!(v.sink_threshold, 20.0);
        assert_eq!(v.direction_tolerance, 8.0);
        assert_eq!((v.avg_speed_samples_low, v.avg_speed_samples_high), (5, 15));
    }

    #[test]
    fn invalid_values_rejected() {
        let r = RsuConfig { check_interval_ms: 0, ..RsuConfig::with_directions(one_direction(0.0, 100)) };
        assert!(matches!(r.validate(), Err(BehaviorError::Config(_))));

        let v = VehicleConfig { sink_threshold: -1.0, ..VehicleConfig::default() };
        assert!(v.validate().is_err());
        let v = VehicleConfig { direction_tolerance: f64::NAN, ..VehicleConfig::default() };
        assert!(v.validate().is_err());
    }

    #[test]
    fn load_csv_directions() {
        let csv = "angle,approaching,leaving,approaching_time_ms,leaving_time_ms\n\
                   0,true,false,1000,0\n\
                   270, true, true, 500, 250\n\
                   45,false,false,0,0\n";
        let dirs = load_directions_reader(Cursor::new(csv)).unwrap();
        assert_eq!(dirs.len(), 3);
        assert_eq!(dirs[0].approaching_time_ms, 1_000);
        assert_eq!(dirs[1].angle, -90.0);
        assert!(dirs[1].leaving);
        assert!(!dirs[2].is_usable());
    }

    #[test]
    fn load_csv_rejects_bad_rows() {
        let csv = "angle,approaching,leaving,approaching_time_ms,leaving_time_ms\n0,yes,false,1000,0\n";
        assert!(matches!(load_directions_reader(Cursor::new(csv)), Err(BehaviorError::Parse(_))));

        let csv = "angle,approaching,leaving,approaching_time_ms,leaving_time_ms\ninf,true,false,1000,0\n";
        assert!(matches!(
            load_directions_reader(Cursor::new(csv)),
            Err(BehaviorError::Core(VbError::NonFiniteAngle(a))) if a.is_infinite()
        ));
    }

    #[test]
    fn non_finite_direction_rejected_by_rsu_config() {
        let mut dirs = one_direction(0.0, 100);
        dirs[0].angle = f64::NAN;
        let r = RsuConfig::with_directions(dirs);
        assert!(matches!(r.validate(), Err(BehaviorError::Core(VbError::NonFiniteAngle(_)))));
    }
}

// ── RSU ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rsu_tests {
    use crate::{BehaviorError, RsuBehavior, RsuConfig};

    use super::*;

    fn rsu_with(directions: Vec<Direction>) -> RsuBehavior {
        RsuBehavior::new(RsuConfig::with_directions(directions)).unwrap()
    }

    #[test]
    fn empty_direction_set_is_fatal() {
        assert!(matches!(
            RsuBehavior::new(RsuConfig::with_directions(vec![])),
            Err(BehaviorError::NoDirections)
        ));
        let unusable = vec![Direction {
            angle: 0.0,
            approaching: false,
            leaving: false,
            approaching_time_ms: 100,
            leaving_time_ms: 100,
        }];
        assert!(matches!(
            RsuBehavior::new(RsuConfig::with_directions(unusable)),
            Err(BehaviorError::NoDirections)
        ));
    }

    #[test]
    fn unusable_directions_skipped_and_zero_budget_defaulted() {
        let dirs = vec![
            Direction { angle: 45.0, approaching: false, leaving: false, approaching_time_ms: 9, leaving_time_ms: 9 },
            Direction { angle: 90.0, approaching: true, leaving: true, approaching_time_ms: 0, leaving_time_ms: 400 },
        ];
        let rsu = rsu_with(dirs);
        let list = rsu.directions();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], VehicleDirection::new(90.0, Movement::Approaching));
        assert_eq!(list[0].time_ms, 250);
        assert_eq!(list[1], VehicleDirection::new(90.0, Movement::Leaving));
        assert_eq!(list[1].time_ms, 400);
    }

    #[test]
    fn start_arms_beacon_and_check() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        assert!(rsu.is_running());
        let armed: Vec<_> = h.queue.iter().map(|(at, t)| (at, *t)).collect();
        assert_eq!(armed, vec![
            (SimTime(0), Timer::Beacon { position: 0 }),
            (SimTime(1_000), Timer::Check),
        ]);
        assert_eq!(h.log().count(TelemetryKind::StartToggle), 1);
    }

    #[test]
    fn double_start_changes_nothing() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        h.start(&mut rsu);
        assert_eq!(h.queue.len(), 2);
        assert_eq!(h.log().count(TelemetryKind::StartToggle), 1);
    }

    #[test]
    fn disabled_rsu_never_runs() {
        let mut h = Harness::rsu();
        let config = RsuConfig { enabled: false, ..RsuConfig::with_directions(one_direction(0.0, 1_000)) };
        let mut rsu = RsuBehavior::new(config).unwrap();
        h.start(&mut rsu);
        assert!(!rsu.is_running());
        assert!(h.queue.is_empty());

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), east_approaching(), false));
        assert!(!rsu.is_tracking(VEHICLE));
        assert!(h.log().events.is_empty());
    }

    #[test]
    fn stop_cancels_timers() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        rsu.stop(&mut h.ctx());
        assert!(!rsu.is_running());
        assert!(h.queue.is_empty());
        let toggles: Vec<_> = h
            .log()
            .events
            .iter()
            .filter_map(|e| match e {
                crate::TelemetryEvent::StartToggle { running, .. } => Some(*running),
                _ => None,
            })
            .collect();
        assert_eq!(toggles, vec![true, false]);
    }

    #[test]
    fn beacons_round_robin_on_own_budgets() {
        let dirs = vec![
            Direction { angle: 0.0, approaching: true, leaving: false, approaching_time_ms: 100, leaving_time_ms: 0 },
            Direction { angle: 90.0, approaching: true, leaving: false, approaching_time_ms: 300, leaving_time_ms: 0 },
        ];
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(dirs);
        h.start(&mut rsu);
        // Beacons at 0 (0°), 100 (90°), 400 (0°), 500 (90°), 800 (0°).
        h.run_until(&mut rsu, SimTime(800));

        let beacons = h.beacons();
        let angles: Vec<f64> = beacons.iter().map(|b| b.direction).collect();
        assert_eq!(angles, vec![0.0, 90.0, 0.0, 90.0, 0.0]);
        assert_eq!(beacons[0].max_response_time, 100);
        assert_eq!(beacons[1].max_response_time, 300);

        let next_beacon = h
            .queue
            .iter()
            .find(|(_, t)| matches!(t, Timer::Beacon { .. }))
            .map(|(at, t)| (at, *t));
        assert_eq!(next_beacon, Some((SimTime(900), Timer::Beacon { position: 1 })));
    }

    #[test]
    fn response_upserts_peer() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-30.0, 40.0), dir, false));
        assert_eq!(rsu.last_seen(VEHICLE, &dir), Some(SimTime(0)));

        h.run_until(&mut rsu, SimTime(500));
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-20.0, 0.0), dir, false));
        assert_eq!(rsu.last_seen(VEHICLE, &dir), Some(SimTime(500)));
        assert_eq!(rsu.tracked_count(), 1);

        let infos: Vec<&NodeInfo> = h.log().of_kind(TelemetryKind::BeaconResponse).filter_map(|e| e.info()).collect();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].distance, Some(50.0));
        assert_eq!(infos[0].speeds.map(|s| s.current), Some(12.0));
    }

    #[test]
    fn last_message_removes_peer() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), dir, false));
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-10.0, 0.0), dir, true));
        assert!(!rsu.is_tracking(VEHICLE));
        assert_eq!(h.log().count(TelemetryKind::LastMessage), 1);
        assert_eq!(h.log().count(TelemetryKind::BeaconResponse), 1);
    }

    #[test]
    fn no_longer_conformant_removes_peer() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), dir, false));
        h.deliver(&mut rsu, nlc_from(VEHICLE, Vector2D::new(-40.0, 5.0), dir));
        assert!(!rsu.is_tracking(VEHICLE));

        let nlc: Vec<_> = h.log().of_kind(TelemetryKind::NoLongerConformant).collect();
        assert_eq!(nlc.len(), 1);
        let info = nlc[0].info().unwrap();
        assert_eq!(info.speeds, None);
        assert_eq!(info.direction, Some(90.0));
    }

    #[test]
    fn no_longer_conformant_for_unknown_peer_is_harmless() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        h.deliver(&mut rsu, nlc_from(NodeId(99), Vector2D::new(-40.0, 5.0), east_approaching()));
        assert_eq!(rsu.tracked_count(), 0);
        assert_eq!(h.log().count(TelemetryKind::NoLongerConformant), 1);
    }

    #[test]
    fn timeout_sweep_evicts_at_4000() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), dir, false));

        // Sweeps at 1000, 2000, 3000: 3000 - 0 is not > 3000.
        h.run_until(&mut rsu, SimTime(3_999));
        assert_eq!(h.log().count(TelemetryKind::Timeout), 0);
        assert!(rsu.is_tracking(VEHICLE));

        h.run_until(&mut rsu, SimTime(4_000));
        assert_eq!(h.log().count(TelemetryKind::Timeout), 1);
        assert!(!rsu.is_tracking(VEHICLE));

        let ev = h.log().of_kind(TelemetryKind::Timeout).next().unwrap();
        assert_eq!(ev.at(), SimTime(4_000));
        let info = ev.info().unwrap();
        assert_eq!(info.node_id, VEHICLE);
        assert_eq!(info.last_seen, SimTime(0));
        assert_eq!(info.position, None);
    }

    #[test]
    fn timeout_keeps_node_with_fresh_direction() {
        let dirs = vec![Direction {
            angle: 0.0,
            approaching: true,
            leaving: true,
            approaching_time_ms: 500,
            leaving_time_ms: 500,
        }];
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(dirs);
        h.start(&mut rsu);
        let app = VehicleDirection::new(0.0, Movement::Approaching);
        let lea = VehicleDirection::new(0.0, Movement::Leaving);

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), app, false));
        h.run_until(&mut rsu, SimTime(2_000));
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(50.0, 0.0), lea, false));

        h.run_until(&mut rsu, SimTime(4_000));
        assert_eq!(h.log().count(TelemetryKind::Timeout), 1);
        assert!(rsu.is_tracking(VEHICLE));
        assert_eq!(rsu.last_seen(VEHICLE, &app), None);
        assert_eq!(rsu.last_seen(VEHICLE, &lea), Some(SimTime(2_000)));
    }

    #[test]
    fn evicted_peer_is_reinserted() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), dir, false));
        h.run_until(&mut rsu, SimTime(4_000));
        assert!(!rsu.is_tracking(VEHICLE));

        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-40.0, 0.0), dir, false));
        assert_eq!(rsu.last_seen(VEHICLE, &dir), Some(SimTime(4_000)));
    }

    #[test]
    fn unexpected_and_malformed_messages_dropped() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        let before = h.log().events.len();

        h.deliver(&mut rsu, beacon_from(NodeId(2), Vector2D::new(100.0, 0.0), east_approaching()));

        let mut bad = response_from(VEHICLE, Vector2D::new(-50.0, 0.0), east_approaching(), false);
        bad.header.message_type = MessageType::Beacon;
        h.deliver(&mut rsu, bad);

        assert_eq!(h.log().events.len(), before);
        assert_eq!(rsu.tracked_count(), 0);
        assert!(rsu.is_running());
    }

    #[test]
    fn reconfigure_restarts_running_rsu() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        h.run_until(&mut rsu, SimTime(100));

        rsu.set_directions(one_direction(90.0, 0), &mut h.ctx()).unwrap();
        assert!(rsu.is_running());
        assert_eq!(rsu.directions(), &[VehicleDirection::new(90.0, Movement::Approaching)]);
        assert_eq!(rsu.directions()[0].time_ms, 250);
        assert_eq!(h.log().count(TelemetryKind::StartToggle), 3);

        h.run_until(&mut rsu, SimTime(100));
        assert_eq!(h.beacons().last().map(|b| b.direction), Some(90.0));
    }

    #[test]
    fn reconfigure_with_nothing_usable_keeps_old_set() {
        let mut h = Harness::rsu();
        let mut rsu = rsu_with(one_direction(0.0, 1_000));
        h.start(&mut rsu);
        assert!(rsu.set_directions(vec![], &mut h.ctx()).is_err());
        assert!(rsu.is_running());
        assert_eq!(rsu.directions().len(), 1);
        assert_eq!(h.queue.len(), 2);
    }

    #[test]
    fn subscribed_to_speed_protocol() {
        let rsu = rsu_with(one_direction(0.0, 1_000));
        assert!(rsu.is_subscribed_to(ProtocolId::Speed));
        assert_eq!(rsu.name(), "rsu");
    }
}

// ── Sink vehicle ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod sink_tests {
    use crate::{SinkVehicle, VehicleConfig};

    use super::*;

    fn started(h: &mut Harness) -> SinkVehicle {
        let mut v = SinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        v
    }

    #[test]
    fn sink_scenario() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(2.0));
        let mut v = started(&mut h);
        let dir = east_approaching();

        // First beacon at distance 50: one response, not last, inside [10, 990].
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert_eq!(h.queue.len(), 1);
        let at = h.fire_next(&mut v).unwrap();
        assert!((10..=990).contains(&at.as_millis()), "fired at {at}");
        let sent = h.responses();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, RSU);
        assert!(!sent[0].1.last_message);
        assert!(!v.is_muted(RSU, &dir));

        // Second beacon at distance 10: final response, muted.
        h.kin.position = Vector2D::new(-10.0, 0.0);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        h.fire_next(&mut v).unwrap();
        let sent = h.responses();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].1.last_message);
        assert!(v.is_muted(RSU, &dir));

        // Third beacon while muted: nothing scheduled.
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert!(h.queue.is_empty());
        assert_eq!(v.pending_responses(), 0);
    }

    #[test]
    fn response_carries_speed_samples() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.fire_next(&mut v);

        let (_, r) = h.responses()[0];
        assert_eq!(r.current_speed, 11.0);
        assert_eq!(r.avg_speed_low, 15.0);
        assert_eq!(r.avg_speed_high, 25.0);
        assert_eq!(r.source_direction, Some(0.0));
        assert_eq!(r.conformant_direction, 0.0);
        assert_eq!(r.movement, Movement::Approaching);

        let sent: Vec<_> = h.log().of_kind(TelemetryKind::ResponseSent).collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].node(), VEHICLE);
        assert_eq!(sent[0].info().and_then(|i| i.distance), Some(50.0));
    }

    #[test]
    fn duplicate_beacon_leaves_one_pending() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        assert_eq!(h.queue.len(), 1);
        assert_eq!(v.pending_responses(), 1);

        h.run_until(&mut v, SimTime(2_000));
        assert_eq!(h.responses().len(), 1);
    }

    #[test]
    fn newer_beacon_supersedes_pending_response() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.deliver(&mut v, beacon_from(NodeId(2), Vector2D::new(100.0, 0.0), east_approaching()));
        assert_eq!(h.queue.len(), 1);
        assert_eq!(v.pending_responses(), 1);

        h.run_until(&mut v, SimTime(5_000));
        let sent = h.responses();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NodeId(2));
        assert_eq!(v.pending_responses(), 0);
    }

    #[test]
    fn non_conformant_beacon_ignored() {
        // Heading north while the direction is east.
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(90.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        assert!(h.queue.is_empty());
        assert_eq!(v.mute_record(), None);
    }

    #[test]
    fn stale_response_dropped_at_fire_time() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        // Drove past the RSU before the response fired.
        h.kin.position = Vector2D::new(30.0, 0.0);
        h.fire_next(&mut v);
        assert!(h.transport.sent.is_empty());
        assert!(!v.is_muted(RSU, &east_approaching()));
        assert_eq!(v.pending_responses(), 0);
    }

    #[test]
    fn leaving_inside_threshold_sends_normal_response() {
        let mut h = Harness::vehicle(Vector2D::new(5.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        let leaving = VehicleDirection::with_time(0.0, Movement::Leaving, 500);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, leaving));
        h.fire_next(&mut v);
        let sent = h.responses();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].1.last_message);
        assert!(!v.is_muted(RSU, &leaving));
    }

    #[test]
    fn mute_slot_replaced_by_other_rsu() {
        let mut h = Harness::vehicle(Vector2D::new(-10.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        let dir = east_approaching();
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        h.fire_next(&mut v);
        assert!(v.is_muted(RSU, &dir));

        // A second RSU further east takes over the single slot.
        let other = NodeId(2);
        h.deliver(&mut v, beacon_from(other, Vector2D::new(200.0, 0.0), dir));
        let record = v.mute_record().unwrap();
        assert_eq!((record.rsu, record.muted), (other, false));
        assert!(!v.is_muted(RSU, &dir));
    }

    #[test]
    fn short_window_collapses_to_spacing() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        let tight = VehicleDirection::with_time(0.0, Movement::Approaching, 15);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, tight));
        assert_eq!(h.queue.next_time(), Some(SimTime(10)));
    }

    #[test]
    fn stop_cancels_pending_and_ignores_beacons() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        v.stop(&mut h.ctx());
        assert!(h.queue.is_empty());

        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        assert!(h.queue.is_empty());
    }

    #[test]
    fn disabled_vehicle_does_not_start() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let config = VehicleConfig { enabled: false, ..VehicleConfig::default() };
        let mut v = SinkVehicle::new(config).unwrap();
        h.start(&mut v);
        assert!(!v.is_running());
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        assert!(h.queue.is_empty());
    }

    #[test]
    fn non_beacon_messages_dropped() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = started(&mut h);
        h.deliver(&mut v, response_from(NodeId(8), Vector2D::new(-60.0, 0.0), east_approaching(), false));
        assert!(h.queue.is_empty());
    }
}

// ── Non-sink vehicle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod no_sink_tests {
    use crate::{NoSinkVehicle, VehicleConfig};

    use super::*;

    #[test]
    fn no_sink_scenario() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(90.0));
        let mut v = NoSinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        let dir = east_approaching();

        // Neither active nor conformant: ignored, but the direction is known.
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert!(h.queue.is_empty());
        assert_eq!(v.is_active(&dir), Some(false));

        // Conformant: response sent, direction active.
        h.kin.direction = Some(0.0);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert_eq!(h.queue.len(), 1);
        h.fire_next(&mut v);
        assert_eq!(h.responses().len(), 1);
        assert!(!h.responses()[0].1.last_message);
        assert_eq!(v.is_active(&dir), Some(true));

        // Active but no longer conformant: explicit signal, inactive.
        h.kin.direction = Some(90.0);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert_eq!(h.queue.len(), 1);
        h.fire_next(&mut v);
        let nlc = h.no_longer_conformant();
        assert_eq!(nlc.len(), 1);
        assert_eq!(nlc[0].0, RSU);
        assert_eq!(nlc[0].1.conformant_direction, 0.0);
        assert_eq!(nlc[0].1.source_direction, Some(90.0));
        assert_eq!(v.is_active(&dir), Some(false));

        // Inactive and non-conformant again: ignored.
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, dir));
        assert!(h.queue.is_empty());
        assert_eq!(h.responses().len(), 1);
    }

    #[test]
    fn never_sends_last_message() {
        let mut h = Harness::vehicle(Vector2D::new(-5.0, 0.0), Some(0.0));
        let mut v = NoSinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.fire_next(&mut v);
        assert_eq!(h.responses().len(), 1);
        assert!(!h.responses()[0].1.last_message);
    }

    #[test]
    fn inactive_and_stale_at_fire_time_drops() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = NoSinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.kin.direction = Some(180.0);
        h.fire_next(&mut v);
        assert!(h.transport.sent.is_empty());
        assert_eq!(v.is_active(&east_approaching()), Some(false));
    }

    #[test]
    fn existing_entry_not_overwritten() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = NoSinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.fire_next(&mut v);
        assert_eq!(v.is_active(&east_approaching()), Some(true));

        // Another beacon for the same direction keeps it active.
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        assert_eq!(v.is_active(&east_approaching()), Some(true));
        assert_eq!(v.pending_responses(), 1);
    }

    #[test]
    fn beacon_from_other_rsu_replaces_pending_response() {
        let mut h = Harness::vehicle(Vector2D::new(-50.0, 0.0), Some(0.0));
        let mut v = NoSinkVehicle::new(VehicleConfig::default()).unwrap();
        h.start(&mut v);
        h.deliver(&mut v, beacon_from(RSU, Vector2D::ZERO, east_approaching()));
        h.deliver(&mut v, beacon_from(NodeId(2), Vector2D::new(100.0, 0.0), east_approaching()));
        assert_eq!(v.pending_responses(), 1);

        h.run_until(&mut v, SimTime(5_000));
        let targets: Vec<_> = h.responses().iter().map(|(to, _)| *to).collect();
        assert_eq!(targets, [NodeId(2)]);
    }
}

// ── Telemetry / collector ─────────────────────────────────────────────────────

#[cfg(test)]
mod telemetry_tests {
    use crate::{NoopTelemetry, TransitEnd};

    use super::*;

    fn info(node: NodeId, at: u64, speed: f64) -> NodeInfo {
        let mut i = NodeInfo::bare(node, VehicleDirection::new(0.0, Movement::Approaching), SimTime(at));
        i.speeds = Some(crate::SpeedSample { current: speed, avg_low: speed, avg_high: speed });
        i
    }

    #[test]
    fn fan_out_reaches_both() {
        let mut pair = (EventLog::new(), EventLog::new());
        pair.on_start_toggle(RSU, SimTime(5), true);
        pair.on_timeout(RSU, SimTime(6), &info(VEHICLE, 1, 0.0));
        assert_eq!(pair.0.events.len(), 2);
        assert_eq!(pair.0.events, pair.1.events);
        assert_eq!(pair.0.events[1].kind(), TelemetryKind::Timeout);
    }

    #[test]
    fn noop_accepts_everything() {
        let mut t = NoopTelemetry;
        t.on_last_message(RSU, SimTime(1), &info(VEHICLE, 1, 1.0));
        t.on_response_sent(VEHICLE, SimTime(1), RSU, MessageType::BeaconResponse, &info(VEHICLE, 1, 1.0));
    }

    #[test]
    fn transit_completed_by_last_message() {
        let mut c = TransitCollector::new();
        c.on_beacon_response(RSU, SimTime(0), &info(VEHICLE, 0, 10.0));
        c.on_beacon_response(RSU, SimTime(1_000), &info(VEHICLE, 1_000, 12.0));
        let mut last = info(VEHICLE, 2_500, 14.0);
        last.last_message = true;
        c.on_last_message(RSU, SimTime(2_500), &last);

        assert_eq!(c.open_count(), 0);
        let t = &c.completed()[0];
        assert_eq!(t.total_time_ms, 2_500);
        assert_eq!(t.samples, 3);
        assert_eq!(t.mean_speed, Some(12.0));
        assert_eq!(t.ended_by, TransitEnd::LastMessage);
    }

    #[test]
    fn last_message_without_history_has_zero_time() {
        let mut c = TransitCollector::new();
        c.on_last_message(RSU, SimTime(700), &info(VEHICLE, 700, 9.0));
        assert_eq!(c.completed()[0].total_time_ms, 0);
    }

    #[test]
    fn transit_completed_by_no_longer_conformant() {
        let mut c = TransitCollector::new();
        c.on_beacon_response(RSU, SimTime(100), &info(VEHICLE, 100, 8.0));
        c.on_beacon_response(RSU, SimTime(900), &info(VEHICLE, 900, 10.0));
        c.on_no_longer_conformant(RSU, SimTime(1_500), &NodeInfo::bare(VEHICLE, east_approaching(), SimTime(1_500)));

        let t = &c.completed()[0];
        assert_eq!(t.total_time_ms, 800);
        assert_eq!(t.samples, 2);
        assert_eq!(t.ended_by, TransitEnd::NoLongerConformant);

        // Unknown peer: nothing to complete.
        c.on_no_longer_conformant(RSU, SimTime(1_600), &NodeInfo::bare(NodeId(3), east_approaching(), SimTime(1_600)));
        assert_eq!(c.completed().len(), 1);
    }

    #[test]
    fn timeout_discards_history() {
        let mut c = TransitCollector::new();
        c.on_beacon_response(RSU, SimTime(0), &info(VEHICLE, 0, 8.0));
        c.on_timeout(RSU, SimTime(4_000), &info(VEHICLE, 0, 0.0));
        assert_eq!(c.open_count(), 0);
        assert!(c.completed().is_empty());
    }

    #[test]
    fn summary_per_rsu_direction() {
        let mut c = TransitCollector::new();
        for (node, speed) in [(NodeId(10), 10.0), (NodeId(11), 20.0)] {
            c.on_beacon_response(RSU, SimTime(0), &info(node, 0, speed));
            c.on_last_message(RSU, SimTime(100), &info(node, 100, speed));
        }
        let summary = c.summary();
        let s = summary[&(RSU, VehicleDirection::new(0.0, Movement::Approaching))];
        assert_eq!(s.transits, 2);
        assert_eq!(s.mean_speed, Some(15.0));
        assert_eq!(c.drain_completed().len(), 2);
        assert!(c.completed().is_empty());
    }

    #[test]
    fn rsu_telemetry_feeds_collector() {
        let mut h = Harness::rsu();
        let mut rsu = crate::RsuBehavior::new(crate::RsuConfig::with_directions(one_direction(0.0, 1_000))).unwrap();
        h.start(&mut rsu);
        let dir = VehicleDirection::new(0.0, Movement::Approaching);
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-50.0, 0.0), dir, false));
        h.run_until(&mut rsu, SimTime(600));
        h.deliver(&mut rsu, response_from(VEHICLE, Vector2D::new(-10.0, 0.0), dir, true));

        let transits = h.telemetry.1.completed();
        assert_eq!(transits.len(), 1);
        assert_eq!(transits[0].total_time_ms, 600);
        assert_eq!(transits[0].rsu, RSU);
    }
}
