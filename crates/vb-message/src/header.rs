//! The common envelope present on every message.

use std::fmt;

use vb_core::{NodeId, NodeType, Vector2D};

use crate::{MessageType, ProtocolId};

/// Envelope filled in by the transport from the sending node's identity.
///
/// `destination_id == NodeId::ALL` denotes a broadcast to every node whose
/// type matches `destination_type`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommonHeader {
    pub protocol_id:      ProtocolId,
    pub message_type:     MessageType,
    pub source_type:      NodeType,
    pub source_id:        NodeId,
    pub source_position:  Vector2D,
    pub destination_type: NodeType,
    pub destination_id:   NodeId,
}

impl CommonHeader {
    /// protocol + type (4 bytes), two ids, one position.
    pub const SERIALIZED_SIZE: u32 = 4 + 2 * 4 + 16;

    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.destination_id.is_broadcast()
    }

    #[inline]
    pub fn serialized_size(&self) -> u32 {
        Self::SERIALIZED_SIZE
    }
}

impl fmt::Display for CommonHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pid={} type={} src={}:{} pos={} dst={}:{}",
            self.protocol_id,
            self.message_type,
            self.source_type,
            self.source_id.0,
            self.source_position,
            self.destination_type,
            if self.is_broadcast() { "ALL".to_string() } else { self.destination_id.0.to_string() },
        )
    }
}
