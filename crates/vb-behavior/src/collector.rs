//! `TransitCollector`: assembles RSU telemetry into completed transits.
//!
//! For every (RSU, direction, vehicle) the collector keeps the history of
//! regular responses.  A transit completes when the vehicle sends its final
//! response or signals it left the direction; a timeout discards the
//! history without producing a transit.

use std::collections::BTreeMap;

use log::debug;

use vb_core::{NodeId, SimTime, VehicleDirection};

use crate::{NodeInfo, Telemetry};

/// How a transit ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitEnd {
    LastMessage,
    NoLongerConformant,
}

impl TransitEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitEnd::LastMessage        => "last_message",
            TransitEnd::NoLongerConformant => "no_longer_conformant",
        }
    }
}

/// One vehicle's completed pass through a monitored direction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transit {
    pub rsu:           NodeId,
    pub node:          NodeId,
    pub direction:     VehicleDirection,
    pub first_seen:    SimTime,
    pub last_seen:     SimTime,
    /// `last_seen - first_seen`, ms.
    pub total_time_ms: u64,
    /// Number of responses with speed samples.
    pub samples:       usize,
    /// Mean of the reported current speeds; `None` without samples.
    pub mean_speed:    Option<f64>,
    pub ended_by:      TransitEnd,
}

/// Aggregate over the completed transits of one (RSU, direction).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DirectionSummary {
    pub transits:   usize,
    pub mean_speed: Option<f64>,
}

#[derive(Copy, Clone, Debug)]
struct Sample {
    at:    SimTime,
    speed: Option<f64>,
}

type HistoryKey = (NodeId, VehicleDirection, NodeId);

/// [`Telemetry`] sink that turns RSU events into [`Transit`] records.
#[derive(Default)]
pub struct TransitCollector {
    history:   BTreeMap<HistoryKey, Vec<Sample>>,
    completed: Vec<Transit>,
}

impl TransitCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transits completed so far, in completion order.
    pub fn completed(&self) -> &[Transit] {
        &self.completed
    }

    /// Take the completed transits, leaving the list empty.
    pub fn drain_completed(&mut self) -> Vec<Transit> {
        std::mem::take(&mut self.completed)
    }

    /// Number of (RSU, direction, vehicle) histories still open.
    pub fn open_count(&self) -> usize {
        self.history.len()
    }

    /// Per (RSU, direction) count of completed transits and mean speed.
    pub fn summary(&self) -> BTreeMap<(NodeId, VehicleDirection), DirectionSummary> {
        let mut sums: BTreeMap<(NodeId, VehicleDirection), (usize, f64, usize)> = BTreeMap::new();
        for t in &self.completed {
            let e = sums.entry((t.rsu, t.direction)).or_default();
            e.0 += 1;
            if let Some(s) = t.mean_speed {
                e.1 += s;
                e.2 += 1;
            }
        }
        sums.into_iter()
            .map(|(k, (transits, total, with_speed))| {
                let mean_speed = (with_speed > 0).then(|| total / with_speed as f64);
                (k, DirectionSummary { transits, mean_speed })
            })
            .collect()
    }

    fn key(rsu: NodeId, info: &NodeInfo) -> HistoryKey {
        (rsu, info.conformant, info.node_id)
    }

    fn complete(&mut self, rsu: NodeId, info: &NodeInfo, samples: Vec<Sample>, ended_by: TransitEnd) {
        let Some(first) = samples.first() else {
            return;
        };
        let first_seen = first.at;
        let last_seen = samples.last().map_or(first_seen, |s| s.at);
        let speeds: Vec<f64> = samples.iter().filter_map(|s| s.speed).collect();
        let mean_speed = (!speeds.is_empty()).then(|| speeds.iter().sum::<f64>() / speeds.len() as f64);

        let transit = Transit {
            rsu,
            node: info.node_id,
            direction: info.conformant,
            first_seen,
            last_seen,
            total_time_ms: last_seen.since(first_seen),
            samples: speeds.len(),
            mean_speed,
            ended_by,
        };
        debug!(
            "RSU {}: transit of node {} in {} completed after {}ms",
            rsu.0, transit.node.0, transit.direction, transit.total_time_ms
        );
        self.completed.push(transit);
    }
}

impl Telemetry for TransitCollector {
    fn on_beacon_response(&mut self, rsu: NodeId, _now: SimTime, info: &NodeInfo) {
        self.history.entry(Self::key(rsu, info)).or_default().push(Sample {
            at:    info.last_seen,
            speed: info.speeds.map(|s| s.current),
        });
    }

    fn on_last_message(&mut self, rsu: NodeId, _now: SimTime, info: &NodeInfo) {
        let mut samples = self.history.remove(&Self::key(rsu, info)).unwrap_or_default();
        samples.push(Sample { at: info.last_seen, speed: info.speeds.map(|s| s.current) });
        self.complete(rsu, info, samples, TransitEnd::LastMessage);
    }

    fn on_no_longer_conformant(&mut self, rsu: NodeId, _now: SimTime, info: &NodeInfo) {
        // Only the history counts: the signal itself carries no speed and is
        // not a sighting inside the direction.
        if let Some(samples) = self.history.remove(&Self::key(rsu, info)) {
            self.complete(rsu, info, samples, TransitEnd::NoLongerConformant);
        }
    }

    fn on_timeout(&mut self, rsu: NodeId, _now: SimTime, info: &NodeInfo) {
        self.history.remove(&Self::key(rsu, info));
    }
}
