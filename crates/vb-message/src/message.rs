//! `Message`: envelope plus body.

use std::fmt;

use crate::{CommonHeader, MessageError, MessageResult, Payload};

/// A complete application message as handed to a behavior's `receive`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub header:  CommonHeader,
    pub payload: Payload,
}

impl Message {
    /// Pair a header with a payload, forcing `header.message_type` to match.
    pub fn new(mut header: CommonHeader, payload: Payload) -> Self {
        header.message_type = payload.message_type();
        Self { header, payload }
    }

    /// Reject messages whose declared type disagrees with the carried body.
    pub fn validate(&self) -> MessageResult<()> {
        let actual = self.payload.message_type();
        if self.header.message_type != actual {
            return Err(MessageError::PayloadMismatch {
                declared: self.header.message_type,
                actual,
            });
        }
        Ok(())
    }

    /// Envelope + body size used for link-budget accounting.
    #[inline]
    pub fn serialized_size(&self) -> u32 {
        self.header.serialized_size() + self.payload.serialized_size()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.header, self.payload)
    }
}
