//! Strongly typed node identifier.
//!
//! `NodeId` is `Copy + Ord + Hash` so it can key the peer-timeout map and
//! sorted collections without ceremony.  The inner integer is `pub` so the
//! sim harness can index its node `Vec` with `id.index()`.

use std::fmt;

/// Identifier of a simulated node (RSU or vehicle).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Destination id meaning "every node" (`0xffff_ffff` on the wire).
    pub const ALL: NodeId = NodeId(u32::MAX);

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_broadcast(self) -> bool {
        self == Self::ALL
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_broadcast() {
            f.write_str("NodeId(ALL)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl From<NodeId> for usize {
    #[inline(always)]
    fn from(id: NodeId) -> usize {
        id.0 as usize
    }
}

impl TryFrom<usize> for NodeId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<NodeId, Self::Error> {
        u32::try_from(n).map(NodeId)
    }
}
