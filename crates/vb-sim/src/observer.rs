//! Channel-level observer hooks and run counters.

use vb_core::{NodeId, SimTime};
use vb_message::Message;

/// Why a receiver missed a message.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DropReason {
    /// Receiver farther than the radio range at send time.
    OutOfRange,
    /// Unicast to an id that does not exist.
    UnknownDestination,
}

/// Callbacks invoked by [`Sim`][crate::Sim] as messages cross the channel.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// A node handed a message to the channel.
    fn on_send(&mut self, _now: SimTime, _message: &Message) {}

    /// A message reached `to` and was passed to its behavior.
    fn on_deliver(&mut self, _now: SimTime, _to: NodeId, _message: &Message) {}

    /// A receiver missed a message.
    fn on_drop(&mut self, _now: SimTime, _to: NodeId, _message: &Message, _reason: DropReason) {}

    /// Called once when `run` reaches the end time.
    fn on_sim_end(&mut self, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Message and byte counters kept by the harness.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimStats {
    /// Messages handed to the channel.
    pub sent:            u64,
    /// Per-receiver deliveries.
    pub delivered:       u64,
    /// Per-receiver misses (out of range or unknown destination).
    pub dropped:         u64,
    /// Header + payload bytes of every sent message.
    pub bytes_sent:      u64,
    /// Header + payload bytes of every delivery.
    pub bytes_delivered: u64,
}
