//! `vb-core`: foundational types for the `rsu_beacon` protocol.
//!
//! This crate is a dependency of every other `vb-*` crate.  It has no `vb-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module            | Contents                                              |
//! |-------------------|-------------------------------------------------------|
//! | [`ids`]           | `NodeId`                                              |
//! | [`node_type`]     | `NodeType` (RSU / vehicle / broadcast target)         |
//! | [`geo`]           | `Vector2D`, distance, angle normalisation             |
//! | [`direction`]     | `Movement`, `VehicleDirection`, `Direction`           |
//! | [`conformance`]   | `ConformanceChecker`, heading + half-plane tests      |
//! | [`time`]          | `SimTime` (milliseconds)                              |
//! | [`rng`]           | `NodeRng` (per-node deterministic RNG)                |
//! | [`error`]         | `VbError` (invalid directions), `VbResult`           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod conformance;
pub mod direction;
pub mod error;
pub mod geo;
pub mod ids;
pub mod node_type;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use conformance::{
    ConformanceChecker, DEFAULT_DIRECTION_TOLERANCE, check_direction_and_movement, check_directions,
};
pub use direction::{Direction, Movement, VehicleDirection, expand_directions};
pub use error::{VbError, VbResult};
pub use geo::{Vector2D, angle_difference, normalize_direction};
pub use ids::NodeId;
pub use node_type::NodeType;
pub use rng::NodeRng;
pub use time::SimTime;
