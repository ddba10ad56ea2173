//! `vb-sim`: deterministic in-process co-simulation harness.
//!
//! # Event loop
//!
//! ```text
//! queue: EventQueue<SimEvent>          // timers and deliveries, one timeline
//! loop:
//!   ① pop the earliest event
//!   ② Timer { node, timer }   → behavior.on_timer(timer, ctx)
//!      Deliver { to, message } → behavior.receive(&message, ctx)
//!   ③ every send buffered in the callback's Outbox is stamped with the
//!      sender's header and scheduled as Deliver to each addressed,
//!      subscribed node within radio range, after link_delay_ms
//! ```
//!
//! Kinematics are evaluated from each node's [`Motion`] at the callback's
//! timestamp, so a response fired after its jitter sees the vehicle where it
//! is *then*, not where it was when the beacon arrived.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .rsu(Vector2D::ZERO, RsuConfig::with_directions(dirs))?
//!     .sink_vehicle(motion, VehicleConfig::default())?
//!     .build()?;
//! let mut log = EventLog::new();
//! sim.run(&mut log, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod motion;
pub mod observer;
pub mod sim;
pub mod transport;


pub use builder::SimBuilder;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use motion::{Motion, MotionKinematics};
pub use observer::{DropReason, NoopObserver, SimObserver, SimStats};
pub use sim::{Sim, SimNode};
pub use transport::SimEvent;
