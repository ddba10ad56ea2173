//! Telemetry hooks: the only channel by which protocol results leave a
//! behavior.

use std::fmt;

use vb_core::{NodeId, SimTime};
use vb_message::MessageType;

use crate::NodeInfo;

/// Callbacks raised by behaviors.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  `node` is always the node raising the
/// event.
///
/// # Example: counting final responses
///
/// ```rust,ignore
/// struct LastCounter(usize);
///
/// impl Telemetry for LastCounter {
///     fn on_last_message(&mut self, _rsu: NodeId, _now: SimTime, _info: &NodeInfo) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait Telemetry {
    /// A behavior started (`running == true`) or stopped.
    fn on_start_toggle(&mut self, _node: NodeId, _now: SimTime, _running: bool) {}

    /// RSU: a regular `BeaconResponse` refreshed a peer.
    fn on_beacon_response(&mut self, _rsu: NodeId, _now: SimTime, _info: &NodeInfo) {}

    /// RSU: the sweep evicted a peer direction.  `info.last_seen` is the last
    /// refresh, not the eviction time.
    fn on_timeout(&mut self, _rsu: NodeId, _now: SimTime, _info: &NodeInfo) {}

    /// RSU: a vehicle sent its final response.
    fn on_last_message(&mut self, _rsu: NodeId, _now: SimTime, _info: &NodeInfo) {}

    /// RSU: a vehicle signalled it left a direction.
    fn on_no_longer_conformant(&mut self, _rsu: NodeId, _now: SimTime, _info: &NodeInfo) {}

    /// Vehicle: a response or no-longer-conformant message went out to `to`.
    fn on_response_sent(
        &mut self,
        _vehicle: NodeId,
        _now:     SimTime,
        _to:      NodeId,
        _kind:    MessageType,
        _info:    &NodeInfo,
    ) {}
}

/// A [`Telemetry`] sink that discards everything.
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {}

impl<T: Telemetry + ?Sized> Telemetry for &mut T {
    fn on_start_toggle(&mut self, node: NodeId, now: SimTime, running: bool) {
        (**self).on_start_toggle(node, now, running)
    }
    fn on_beacon_response(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        (**self).on_beacon_response(rsu, now, info)
    }
    fn on_timeout(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        (**self).on_timeout(rsu, now, info)
    }
    fn on_last_message(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        (**self).on_last_message(rsu, now, info)
    }
    fn on_no_longer_conformant(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        (**self).on_no_longer_conformant(rsu, now, info)
    }
    fn on_response_sent(&mut self, vehicle: NodeId, now: SimTime, to: NodeId, kind: MessageType, info: &NodeInfo) {
        (**self).on_response_sent(vehicle, now, to, kind, info)
    }
}

/// Fan-out: every event goes to `A` then `B`.
impl<A: Telemetry, B: Telemetry> Telemetry for (A, B) {
    fn on_start_toggle(&mut self, node: NodeId, now: SimTime, running: bool) {
        self.0.on_start_toggle(node, now, running);
        self.1.on_start_toggle(node, now, running);
    }
    fn on_beacon_response(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.0.on_beacon_response(rsu, now, info);
        self.1.on_beacon_response(rsu, now, info);
    }
    fn on_timeout(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.0.on_timeout(rsu, now, info);
        self.1.on_timeout(rsu, now, info);
    }
    fn on_last_message(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.0.on_last_message(rsu, now, info);
        self.1.on_last_message(rsu, now, info);
    }
    fn on_no_longer_conformant(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.0.on_no_longer_conformant(rsu, now, info);
        self.1.on_no_longer_conformant(rsu, now, info);
    }
    fn on_response_sent(&mut self, vehicle: NodeId, now: SimTime, to: NodeId, kind: MessageType, info: &NodeInfo) {
        self.0.on_response_sent(vehicle, now, to, kind, info);
        self.1.on_response_sent(vehicle, now, to, kind, info);
    }
}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// Discriminant of a [`TelemetryEvent`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TelemetryKind {
    StartToggle,
    BeaconResponse,
    Timeout,
    LastMessage,
    NoLongerConformant,
    ResponseSent,
}

impl TelemetryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TelemetryKind::StartToggle        => "start_toggle",
            TelemetryKind::BeaconResponse     => "beacon_response",
            TelemetryKind::Timeout            => "timeout",
            TelemetryKind::LastMessage        => "last_message",
            TelemetryKind::NoLongerConformant => "no_longer_conformant",
            TelemetryKind::ResponseSent       => "response_sent",
        }
    }
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded telemetry callback.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryEvent {
    StartToggle        { node: NodeId, at: SimTime, running: bool },
    BeaconResponse     { rsu: NodeId, at: SimTime, info: NodeInfo },
    Timeout            { rsu: NodeId, at: SimTime, info: NodeInfo },
    LastMessage        { rsu: NodeId, at: SimTime, info: NodeInfo },
    NoLongerConformant { rsu: NodeId, at: SimTime, info: NodeInfo },
    ResponseSent       { vehicle: NodeId, at: SimTime, to: NodeId, message: MessageType, info: NodeInfo },
}

impl TelemetryEvent {
    pub fn kind(&self) -> TelemetryKind {
        match self {
            TelemetryEvent::StartToggle { .. }        => TelemetryKind::StartToggle,
            TelemetryEvent::BeaconResponse { .. }     => TelemetryKind::BeaconResponse,
            TelemetryEvent::Timeout { .. }            => TelemetryKind::Timeout,
            TelemetryEvent::LastMessage { .. }        => TelemetryKind::LastMessage,
            TelemetryEvent::NoLongerConformant { .. } => TelemetryKind::NoLongerConformant,
            TelemetryEvent::ResponseSent { .. }       => TelemetryKind::ResponseSent,
        }
    }

    /// The node that raised the event.
    pub fn node(&self) -> NodeId {
        match self {
            TelemetryEvent::StartToggle { node, .. } => *node,
            TelemetryEvent::BeaconResponse { rsu, .. }
            | TelemetryEvent::Timeout { rsu, .. }
            | TelemetryEvent::LastMessage { rsu, .. }
            | TelemetryEvent::NoLongerConformant { rsu, .. } => *rsu,
            TelemetryEvent::ResponseSent { vehicle, .. } => *vehicle,
        }
    }

    pub fn at(&self) -> SimTime {
        match self {
            TelemetryEvent::StartToggle { at, .. }
            | TelemetryEvent::BeaconResponse { at, .. }
            | TelemetryEvent::Timeout { at, .. }
            | TelemetryEvent::LastMessage { at, .. }
            | TelemetryEvent::NoLongerConformant { at, .. }
            | TelemetryEvent::ResponseSent { at, .. } => *at,
        }
    }

    pub fn info(&self) -> Option<&NodeInfo> {
        match self {
            TelemetryEvent::StartToggle { .. } => None,
            TelemetryEvent::BeaconResponse { info, .. }
            | TelemetryEvent::Timeout { info, .. }
            | TelemetryEvent::LastMessage { info, .. }
            | TelemetryEvent::NoLongerConformant { info, .. }
            | TelemetryEvent::ResponseSent { info, .. } => Some(info),
        }
    }
}

/// In-memory [`Telemetry`] recorder.
#[derive(Default, Debug)]
pub struct EventLog {
    pub events: Vec<TelemetryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: TelemetryKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn of_kind(&self, kind: TelemetryKind) -> impl Iterator<Item = &TelemetryEvent> + '_ {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Telemetry for EventLog {
    fn on_start_toggle(&mut self, node: NodeId, now: SimTime, running: bool) {
        self.events.push(TelemetryEvent::StartToggle { node, at: now, running });
    }
    fn on_beacon_response(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.events.push(TelemetryEvent::BeaconResponse { rsu, at: now, info: info.clone() });
    }
    fn on_timeout(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.events.push(TelemetryEvent::Timeout { rsu, at: now, info: info.clone() });
    }
    fn on_last_message(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.events.push(TelemetryEvent::LastMessage { rsu, at: now, info: info.clone() });
    }
    fn on_no_longer_conformant(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.events.push(TelemetryEvent::NoLongerConformant { rsu, at: now, info: info.clone() });
    }
    fn on_response_sent(&mut self, vehicle: NodeId, now: SimTime, to: NodeId, kind: MessageType, info: &NodeInfo) {
        self.events.push(TelemetryEvent::ResponseSent {
            vehicle,
            at: now,
            to,
            message: kind,
            info: info.clone(),
        });
    }
}
