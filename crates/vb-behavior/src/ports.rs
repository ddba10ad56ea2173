//! Narrow interfaces to the node's surroundings.
//!
//! Behaviors never see the radio channel or the traffic model directly; they
//! go through these two traits, implemented by the sim harness (or by test
//! doubles).

use vb_core::{NodeId, NodeType, Vector2D};
use vb_message::{MessageCategory, Payload, ProtocolId};

/// Fire-and-forget message sending.
///
/// The implementation builds the common header from the sending node's
/// identity and position.  There is no delivery acknowledgement.
pub trait Transport {
    /// Broadcast to every node whose type matches `target`.
    fn send(
        &mut self,
        target:   NodeType,
        payload:  Payload,
        protocol: ProtocolId,
        category: MessageCategory,
    );

    /// Unicast to `destination`.
    fn send_to(
        &mut self,
        destination: NodeId,
        payload:     Payload,
        protocol:    ProtocolId,
        category:    MessageCategory,
    );
}

/// Position, heading and speed of the node at the current simulation time.
pub trait Kinematics {
    fn position(&self) -> Vector2D;

    /// Heading in degrees, or `None` while the node has no valid heading
    /// (e.g. stationary).
    fn direction(&self) -> Option<f64>;

    /// Speed averaged over the last `samples` samples, m/s.
    fn speed(&self, samples: u16) -> f64;
}

/// Kinematics of a node that never moves.  Used for RSUs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stationary(pub Vector2D);

impl Kinematics for Stationary {
    fn position(&self) -> Vector2D {
        self.0
    }

    fn direction(&self) -> Option<f64> {
        None
    }

    fn speed(&self, _samples: u16) -> f64 {
        0.0
    }
}
