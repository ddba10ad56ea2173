//! Per-callback adapters between one node and the shared event queue.

use vb_behavior::{Timer, Transport};
use vb_core::{NodeId, NodeType, SimTime};
use vb_message::{Message, MessageCategory, Payload, ProtocolId};
use vb_schedule::{EventHandle, EventQueue, Scheduler};

/// Everything the shared queue holds.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// A behavior timer of `node`.
    Timer { node: NodeId, timer: Timer },
    /// A message arriving at `to`.
    Deliver { to: NodeId, message: Message },
}

/// [`Scheduler<Timer>`] view of the shared queue for one node.
pub(crate) struct NodeScheduler<'q> {
    pub(crate) queue: &'q mut EventQueue<SimEvent>,
    pub(crate) node:  NodeId,
}

impl Scheduler<Timer> for NodeScheduler<'_> {
    fn now(&self) -> SimTime {
        self.queue.now()
    }

    fn schedule(&mut self, delay_ms: u64, timer: Timer) -> EventHandle {
        self.queue.schedule(delay_ms, SimEvent::Timer { node: self.node, timer })
    }

    fn cancel(&mut self, handle: EventHandle) {
        self.queue.cancel(handle);
    }

    fn is_pending(&self, handle: EventHandle) -> bool {
        self.queue.is_pending(handle)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Destination {
    Broadcast(NodeType),
    Unicast(NodeId),
}

pub(crate) struct Outgoing {
    pub(crate) destination: Destination,
    pub(crate) payload:     Payload,
    pub(crate) protocol:    ProtocolId,
}

/// [`Transport`] that buffers sends until the callback returns; the harness
/// then stamps headers and schedules deliveries.
#[derive(Default)]
pub(crate) struct Outbox {
    pub(crate) items: Vec<Outgoing>,
}

impl Transport for Outbox {
    fn send(&mut self, target: NodeType, payload: Payload, protocol: ProtocolId, _category: MessageCategory) {
        self.items.push(Outgoing { destination: Destination::Broadcast(target), payload, protocol });
    }

    fn send_to(&mut self, destination: NodeId, payload: Payload, protocol: ProtocolId, _category: MessageCategory) {
        self.items.push(Outgoing { destination: Destination::Unicast(destination), payload, protocol });
    }
}
