//! Node type enum shared by the message envelope and the sim harness.
//!
//! Values are bit patterns: every vehicle sub-type carries the `VEHICLE` bit,
//! so a broadcast addressed to [`NodeType::Vehicle`] reaches all of them.

/// The kind of a node, also used as a broadcast target.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    /// Stationary roadside unit.
    Rsu,
    /// Any equipped vehicle.
    Vehicle,
    /// Vehicle with the full communication stack.
    VehicleFull,
    /// Vehicle with the medium communication stack.
    VehicleMedium,
    /// Every node.  Only meaningful as a target.
    #[default]
    All,
}

impl NodeType {
    /// Wire bit pattern.
    pub fn bits(self) -> u8 {
        match self {
            NodeType::Rsu           => 0x01,
            NodeType::Vehicle       => 0x02,
            NodeType::VehicleFull   => 0x06,
            NodeType::VehicleMedium => 0x0A,
            NodeType::All           => 0xFF,
        }
    }

    #[inline]
    pub fn is_vehicle(self) -> bool {
        self != NodeType::All && self.bits() & NodeType::Vehicle.bits() != 0
    }

    /// `true` if a node of type `self` is addressed by `target`.
    ///
    /// `All` matches everything, `Rsu`/`Vehicle` match by bit, any other
    /// target requires an exact match.
    pub fn matches(self, target: NodeType) -> bool {
        match target {
            NodeType::All => true,
            NodeType::Rsu | NodeType::Vehicle => self.bits() & target.bits() != 0 && self != NodeType::All,
            _ => self == target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Rsu           => "rsu",
            NodeType::Vehicle       => "vehicle",
            NodeType::VehicleFull   => "vehicle_full",
            NodeType::VehicleMedium => "vehicle_medium",
            NodeType::All           => "all",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
