//! Plain data row types written by output backends.

use vb_behavior::{NodeInfo, TelemetryKind, Transit, TransitEnd};
use vb_core::{Movement, NodeId, SimTime};
use vb_message::MessageType;

/// One telemetry callback, flattened.
///
/// Columns an event cannot fill are `None` and written as empty cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRow {
    pub at_ms:        u64,
    pub event:        TelemetryKind,
    /// The RSU or vehicle that raised the event.
    pub node:         u32,
    /// The vehicle the event is about, or the RSU a response was sent to.
    pub peer:         Option<u32>,
    pub direction:    Option<f64>,
    pub movement:     Option<Movement>,
    /// New state of a start/stop toggle.
    pub running:      Option<bool>,
    pub last_message: bool,
    pub pos_x:        Option<f64>,
    pub pos_y:        Option<f64>,
    pub heading:      Option<f64>,
    pub speed:        Option<f64>,
    pub avg_speed_low:  Option<f64>,
    pub avg_speed_high: Option<f64>,
    pub distance:     Option<f64>,
    /// Message a vehicle sent.
    pub message:      Option<MessageType>,
}

impl EventRow {
    pub const HEADERS: [&'static str; 16] = [
        "at_ms",
        "event",
        "node",
        "peer",
        "direction",
        "movement",
        "running",
        "last_message",
        "pos_x",
        "pos_y",
        "heading",
        "speed",
        "avg_speed_low",
        "avg_speed_high",
        "distance",
        "message",
    ];

    pub fn toggle(node: NodeId, at: SimTime, running: bool) -> Self {
        Self {
            at_ms: at.as_millis(),
            event: TelemetryKind::StartToggle,
            node: node.0,
            peer: None,
            direction: None,
            movement: None,
            running: Some(running),
            last_message: false,
            pos_x: None,
            pos_y: None,
            heading: None,
            speed: None,
            avg_speed_low: None,
            avg_speed_high: None,
            distance: None,
            message: None,
        }
    }

    /// Row for an RSU-side observation of `info.node_id`.
    pub fn observation(event: TelemetryKind, rsu: NodeId, at: SimTime, info: &NodeInfo) -> Self {
        Self {
            at_ms: at.as_millis(),
            event,
            node: rsu.0,
            peer: Some(info.node_id.0),
            direction: Some(info.conformant.angle),
            movement: Some(info.conformant.movement),
            running: None,
            last_message: info.last_message,
            pos_x: info.position.map(|p| p.x),
            pos_y: info.position.map(|p| p.y),
            heading: info.direction,
            speed: info.speeds.map(|s| s.current),
            avg_speed_low: info.speeds.map(|s| s.avg_low),
            avg_speed_high: info.speeds.map(|s| s.avg_high),
            distance: info.distance,
            message: None,
        }
    }

    /// Row for a message sent by `vehicle` to `to`.
    pub fn sent(vehicle: NodeId, at: SimTime, to: NodeId, message: MessageType, info: &NodeInfo) -> Self {
        Self {
            node: vehicle.0,
            peer: Some(to.0),
            message: Some(message),
            ..Self::observation(TelemetryKind::ResponseSent, vehicle, at, info)
        }
    }

    pub(crate) fn record(&self) -> [String; 16] {
        [
            self.at_ms.to_string(),
            self.event.as_str().to_owned(),
            self.node.to_string(),
            opt(self.peer),
            opt(self.direction),
            self.movement.map(|m| m.as_str().to_owned()).unwrap_or_default(),
            self.running.map(|r| (r as u8).to_string()).unwrap_or_default(),
            (self.last_message as u8).to_string(),
            opt(self.pos_x),
            opt(self.pos_y),
            opt(self.heading),
            opt(self.speed),
            opt(self.avg_speed_low),
            opt(self.avg_speed_high),
            opt(self.distance),
            self.message.map(|m| m.as_str().to_owned()).unwrap_or_default(),
        ]
    }
}

/// One completed transit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitRow {
    pub rsu:           u32,
    pub node:          u32,
    pub direction:     f64,
    pub movement:      Movement,
    pub first_seen_ms: u64,
    pub last_seen_ms:  u64,
    pub total_time_ms: u64,
    pub samples:       u64,
    pub mean_speed:    Option<f64>,
    pub ended_by:      TransitEnd,
}

impl TransitRow {
    pub const HEADERS: [&'static str; 10] = [
        "rsu",
        "node",
        "direction",
        "movement",
        "first_seen_ms",
        "last_seen_ms",
        "total_time_ms",
        "samples",
        "mean_speed",
        "ended_by",
    ];

    pub(crate) fn record(&self) -> [String; 10] {
        [
            self.rsu.to_string(),
            self.node.to_string(),
            self.direction.to_string(),
            self.movement.as_str().to_owned(),
            self.first_seen_ms.to_string(),
            self.last_seen_ms.to_string(),
            self.total_time_ms.to_string(),
            self.samples.to_string(),
            opt(self.mean_speed),
            self.ended_by.as_str().to_owned(),
        ]
    }
}

impl From<&Transit> for TransitRow {
    fn from(t: &Transit) -> Self {
        Self {
            rsu:           t.rsu.0,
            node:          t.node.0,
            direction:     t.direction.angle,
            movement:      t.direction.movement,
            first_seen_ms: t.first_seen.as_millis(),
            last_seen_ms:  t.last_seen.as_millis(),
            total_time_ms: t.total_time_ms,
            samples:       t.samples as u64,
            mean_speed:    t.mean_speed,
            ended_by:      t.ended_by,
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
