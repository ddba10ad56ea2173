use thiserror::Error;

use crate::MessageType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("unknown message type code {0:#04x}")]
    UnknownMessageType(u8),

    #[error("unknown protocol id {0:#04x}")]
    UnknownProtocol(u8),

    #[error("unknown vehicle movement code {0:#04x}")]
    UnknownMovement(u8),

    #[error("header declares {declared} but payload is {actual}")]
    PayloadMismatch {
        declared: MessageType,
        actual:   MessageType,
    },
}

pub type MessageResult<T> = Result<T, MessageError>;
