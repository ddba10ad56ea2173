//! `vb-behavior`: the RSU and vehicle behaviors of the beacon protocol.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`model`]       | `Behavior` trait                                              |
//! | [`context`]     | `NodeContext<'a>`: scheduler, transport, kinematics, telemetry |
//! | [`ports`]       | `Transport`, `Kinematics`, `Stationary`                       |
//! | [`timer`]       | `Timer`, `RsuTarget`                                          |
//! | [`telemetry`]   | `Telemetry` trait, `NoopTelemetry`, `EventLog`                |
//! | [`node_info`]   | `NodeInfo`, `SpeedSample`                                     |
//! | [`rsu`]         | `RsuBehavior`: beacon scheduler + peer-timeout tracker       |
//! | [`sink`]        | `SinkVehicle`: threshold-muting vehicle                      |
//! | [`no_sink`]     | `NoSinkVehicle`: explicit no-longer-conformant vehicle       |
//! | [`collector`]   | `TransitCollector`: completed transits from RSU telemetry    |
//! | [`config`]      | `RsuConfig`, `VehicleConfig`                                  |
//! | [`loader`]      | CSV direction loader                                          |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                          |
//!
//! # Message flow
//!
//! ```text
//! RSU  ── Beacon(dir, movement, max) ──▶ vehicles          (broadcast)
//! veh  ── schedule Response after U[spacing, max − spacing]
//! veh  ── BeaconResponse / NoLongerConformant ──▶ RSU      (unicast)
//! RSU  ── upsert / remove peer, raise telemetry
//! ```
//!
//! Behaviors own all their state.  Everything else they touch arrives through
//! the [`NodeContext`] of the current callback.

pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod model;
pub mod no_sink;
pub mod node_info;
pub mod ports;
pub mod rsu;
pub mod sink;
pub mod telemetry;
pub mod timer;

mod vehicle;

#[cfg(test)]
mod tests;

pub use collector::{DirectionSummary, Transit, TransitCollector, TransitEnd};
pub use config::{RsuConfig, VehicleConfig};
pub use context::NodeContext;
pub use error::{BehaviorError, BehaviorResult};
pub use loader::{load_directions_csv, load_directions_reader};
pub use model::Behavior;
pub use no_sink::NoSinkVehicle;
pub use node_info::{NodeInfo, SpeedSample};
pub use ports::{Kinematics, Stationary, Transport};
pub use rsu::RsuBehavior;
pub use sink::{MuteRecord, SinkVehicle};
pub use telemetry::{EventLog, NoopTelemetry, Telemetry, TelemetryEvent, TelemetryKind};
pub use timer::{RsuTarget, Timer};
