//! `vb-message`: application-layer messages exchanged by RSUs and vehicles.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`kind`]    | `ProtocolId`, `MessageType`, `MessageCategory`                  |
//! | [`header`]  | `CommonHeader`: the envelope present on every message          |
//! | [`payload`] | `Beacon`, `BeaconResponse`, `NoLongerConformant`, `Payload`     |
//! | [`message`] | `Message` = envelope + payload, size accounting                 |
//! | [`error`]   | `MessageError`, `MessageResult<T>`                              |
//!
//! # Size accounting
//!
//! Every shape reports a fixed `SERIALIZED_SIZE` in bytes.  The sizes feed
//! the link-budget accounting of the transport; they are not a binary
//! encoding and no codec is provided.
//!
//! | Shape                | Bytes |
//! |----------------------|-------|
//! | `CommonHeader`       | 28    |
//! | `Beacon`             | 11    |
//! | `BeaconResponse`     | 42    |
//! | `NoLongerConformant` | 17    |

pub mod error;
pub mod header;
pub mod kind;
pub mod message;
pub mod payload;


pub use error::{MessageError, MessageResult};
pub use header::CommonHeader;
pub use kind::{MessageCategory, MessageType, ProtocolId};
pub use message::Message;
pub use payload::{Beacon, BeaconResponse, NoLongerConformant, Payload};
