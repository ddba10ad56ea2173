//! Per-callback view of the node's surroundings.

use vb_core::{NodeId, NodeRng, SimTime, Vector2D};
use vb_schedule::Scheduler;

use crate::{Kinematics, Telemetry, Timer, Transport};

/// Everything a [`Behavior`][crate::Behavior] callback may touch besides
/// its own state.
///
/// Built by the harness for the duration of one callback and then dropped,
/// so behaviors never hold on to the scheduler or the transport.
pub struct NodeContext<'a> {
    /// The node this behavior runs on.
    pub node: NodeId,

    /// Timers of this node.  Handles returned here are only meaningful to the
    /// same scheduler.
    pub scheduler: &'a mut dyn Scheduler<Timer>,

    pub transport: &'a mut dyn Transport,

    /// Position, heading and speed at `scheduler.now()`.
    pub kinematics: &'a dyn Kinematics,

    pub telemetry: &'a mut dyn Telemetry,

    /// Per-node deterministic RNG for response jitter.
    pub rng: &'a mut NodeRng,
}

impl<'a> NodeContext<'a> {
    #[inline]
    pub fn new(
        node:       NodeId,
        scheduler:  &'a mut dyn Scheduler<Timer>,
        transport:  &'a mut dyn Transport,
        kinematics: &'a dyn Kinematics,
        telemetry:  &'a mut dyn Telemetry,
        rng:        &'a mut NodeRng,
    ) -> Self {
        Self { node, scheduler, transport, kinematics, telemetry, rng }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    #[inline]
    pub fn position(&self) -> Vector2D {
        self.kinematics.position()
    }
}
