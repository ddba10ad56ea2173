//! The `Sim` struct and its event loop.

use log::{debug, trace, warn};

use vb_behavior::{Behavior, NodeContext, Telemetry};
use vb_core::{NodeId, NodeRng, NodeType, SimTime, Vector2D};
use vb_message::{CommonHeader, Message};
use vb_schedule::{EventQueue, Scheduler};

use crate::motion::MotionKinematics;
use crate::transport::{Destination, NodeScheduler, Outbox, SimEvent};
use crate::{DropReason, Motion, SimConfig, SimError, SimObserver, SimResult, SimStats};

// ── SimNode ───────────────────────────────────────────────────────────────────

/// One simulated node: identity, trajectory, behavior and RNG.
pub struct SimNode {
    pub id:        NodeId,
    pub node_type: NodeType,
    pub motion:    Motion,
    pub(crate) behavior: Box<dyn Behavior>,
    pub(crate) rng:      NodeRng,
}

impl SimNode {
    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// Deterministic event loop over a set of nodes sharing one ideal channel.
///
/// One [`EventQueue`] holds both behavior timers and message deliveries, so
/// everything fires in global timestamp order; ties fire in scheduling order.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    /// Channel counters accumulated since the start of the run.
    pub stats: SimStats,

    queue:   EventQueue<SimEvent>,
    nodes:   Vec<SimNode>,
    started: bool,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, nodes: Vec<SimNode>) -> Self {
        Self {
            config,
            stats: SimStats::default(),
            queue: EventQueue::new(),
            nodes,
            started: false,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SimNode> {
        self.nodes.get(id.index())
    }

    /// Current position of `id`.
    pub fn position_of(&self, id: NodeId) -> SimResult<Vector2D> {
        let node = self.node(id).ok_or(SimError::UnknownNode(id))?;
        Ok(node.motion.position_at(self.now()))
    }

    /// Number of pending timers and deliveries.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Start every node's behavior, in id order.  Called implicitly by the
    /// run methods; later calls do nothing.
    pub fn start<O: SimObserver>(&mut self, telemetry: &mut dyn Telemetry, observer: &mut O) {
        if self.started {
            return;
        }
        self.started = true;
        debug!("sim: starting {} nodes at {}", self.nodes.len(), self.now());
        for idx in 0..self.nodes.len() {
            self.with_node(idx, telemetry, observer, |b, ctx| b.start(ctx));
        }
    }

    /// Stop every node's behavior, cancelling their timers.
    pub fn stop<O: SimObserver>(&mut self, telemetry: &mut dyn Telemetry, observer: &mut O) {
        for idx in 0..self.nodes.len() {
            self.with_node(idx, telemetry, observer, |b, ctx| b.stop(ctx));
        }
    }

    /// Fire the next event.  Returns its time, or `None` if the queue is empty.
    pub fn step<O: SimObserver>(&mut self, telemetry: &mut dyn Telemetry, observer: &mut O) -> Option<SimTime> {
        let (at, event) = self.queue.pop()?;
        self.handle(event, telemetry, observer);
        Some(at)
    }

    /// Fire every event due at or before `until`, then move the clock there.
    pub fn run_until<O: SimObserver>(
        &mut self,
        until:     SimTime,
        telemetry: &mut dyn Telemetry,
        observer:  &mut O,
    ) -> SimResult<()> {
        if until < self.now() {
            return Err(SimError::Config(format!(
                "cannot run backwards from {} to {until}",
                self.now()
            )));
        }
        self.start(telemetry, observer);
        while let Some((_, event)) = self.queue.pop_until(until) {
            self.handle(event, telemetry, observer);
        }
        self.queue.advance_to(until);
        Ok(())
    }

    /// Run to `config.end_time`.
    pub fn run<O: SimObserver>(&mut self, telemetry: &mut dyn Telemetry, observer: &mut O) -> SimResult<()> {
        let end = self.config.end_time.max(self.now());
        self.run_until(end, telemetry, observer)?;
        observer.on_sim_end(self.now());
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────────────────

    fn handle<O: SimObserver>(&mut self, event: SimEvent, telemetry: &mut dyn Telemetry, observer: &mut O) {
        match event {
            SimEvent::Timer { node, timer } => {
                if node.index() >= self.nodes.len() {
                    warn!("sim: timer for unknown node {node}");
                    return;
                }
                trace!("sim: {} timer {:?} for node {}", self.now(), timer, node.0);
                self.with_node(node.index(), telemetry, observer, |b, ctx| b.on_timer(timer, ctx));
            }
            SimEvent::Deliver { to, message } => {
                if to.index() >= self.nodes.len() {
                    warn!("sim: delivery to unknown node {to}");
                    return;
                }
                self.stats.delivered += 1;
                self.stats.bytes_delivered += message.serialized_size() as u64;
                observer.on_deliver(self.now(), to, &message);
                self.with_node(to.index(), telemetry, observer, |b, ctx| b.receive(&message, ctx));
            }
        }
    }

    /// Run `f` against node `idx` with a fresh context, then dispatch what it
    /// sent.
    fn with_node<O, F>(&mut self, idx: usize, telemetry: &mut dyn Telemetry, observer: &mut O, f: F)
    where
        O: SimObserver,
        F: FnOnce(&mut dyn Behavior, &mut NodeContext<'_>),
    {
        let now = self.queue.now();
        let mut outbox = Outbox::default();
        {
            let node = &mut self.nodes[idx];
            let kinematics = MotionKinematics {
                motion:    &node.motion,
                now,
                sample_ms: self.config.speed_sample_ms,
            };
            let mut scheduler = NodeScheduler { queue: &mut self.queue, node: node.id };
            let mut ctx = NodeContext::new(
                node.id,
                &mut scheduler,
                &mut outbox,
                &kinematics,
                telemetry,
                &mut node.rng,
            );
            f(node.behavior.as_mut(), &mut ctx);
        }
        self.dispatch(idx, outbox, observer);
    }

    /// Stamp headers on buffered sends and schedule one delivery per receiver
    /// in range.
    fn dispatch<O: SimObserver>(&mut self, from: usize, outbox: Outbox, observer: &mut O) {
        if outbox.items.is_empty() {
            return;
        }
        let now = self.queue.now();
        let (source_id, source_type, source_position) = {
            let src = &self.nodes[from];
            (src.id, src.node_type, src.motion.position_at(now))
        };

        for out in outbox.items {
            let (destination_type, destination_id) = match out.destination {
                Destination::Broadcast(t) => (t, NodeId::ALL),
                Destination::Unicast(id) => match self.nodes.get(id.index()) {
                    Some(n) => (n.node_type, id),
                    None => (NodeType::All, id),
                },
            };
            let header = CommonHeader {
                protocol_id: out.protocol,
                message_type: out.payload.message_type(),
                source_type,
                source_id,
                source_position,
                destination_type,
                destination_id,
            };
            let message = Message::new(header, out.payload);
            self.stats.sent += 1;
            self.stats.bytes_sent += message.serialized_size() as u64;
            observer.on_send(now, &message);

            if let Destination::Unicast(id) = out.destination {
                if id.index() >= self.nodes.len() {
                    self.stats.dropped += 1;
                    observer.on_drop(now, id, &message, DropReason::UnknownDestination);
                    continue;
                }
            }

            for receiver in &self.nodes {
                if receiver.id == source_id {
                    continue;
                }
                let addressed = match out.destination {
                    Destination::Broadcast(t) => receiver.node_type.matches(t),
                    Destination::Unicast(id) => receiver.id == id,
                };
                if !addressed || !receiver.behavior.is_subscribed_to(out.protocol) {
                    continue;
                }
                let distance = source_position.distance(receiver.motion.position_at(now));
                if distance > self.config.radio_range_m {
                    trace!("sim: node {} out of range ({distance:.1} m) for {}", receiver.id.0, message);
                    self.stats.dropped += 1;
                    observer.on_drop(now, receiver.id, &message, DropReason::OutOfRange);
                    continue;
                }
                self.queue.schedule(
                    self.config.link_delay_ms,
                    SimEvent::Deliver { to: receiver.id, message },
                );
            }
        }
    }
}
