//! Protocol and message-type discriminants.

use std::fmt;

use crate::MessageError;

/// Application protocol a message belongs to.  Behaviors subscribe by id.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolId {
    /// The direction-aware speed-monitoring protocol.
    Speed,
}

impl ProtocolId {
    pub fn code(self) -> u8 {
        match self {
            ProtocolId::Speed => 0x01,
        }
    }
}

impl TryFrom<u8> for ProtocolId {
    type Error = MessageError;
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(ProtocolId::Speed),
            other => Err(MessageError::UnknownProtocol(other)),
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolId::Speed => f.write_str("Protocol Speed"),
        }
    }
}

/// Discriminant of the payload carried after the common header.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    Beacon,
    BeaconResponse,
    NoLongerConformant,
}

impl MessageType {
    pub fn code(self) -> u8 {
        match self {
            MessageType::Beacon             => 0x01,
            MessageType::BeaconResponse     => 0x02,
            MessageType::NoLongerConformant => 0x03,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Beacon             => "beacon",
            MessageType::BeaconResponse     => "beacon_response",
            MessageType::NoLongerConformant => "no_longer_conformant",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = MessageError;
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(MessageType::Beacon),
            0x02 => Ok(MessageType::BeaconResponse),
            0x03 => Ok(MessageType::NoLongerConformant),
            other => Err(MessageError::UnknownMessageType(other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery category passed through to the transport unchanged.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageCategory(pub u16);

impl MessageCategory {
    /// Protocol traffic between behaviors.
    pub const PROTOCOL: MessageCategory = MessageCategory(1);
}
