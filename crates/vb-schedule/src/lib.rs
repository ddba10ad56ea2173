//! `vb-schedule`: the discrete-event scheduler behaviors run on.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`scheduler`]   | `Scheduler<E>` trait, `EventHandle`                       |
//! | [`event_queue`] | `EventQueue<E>` (`BTreeMap<(SimTime, seq), slot>` + arena) |
//!
//! # Model
//!
//! All protocol logic runs as callbacks fired in timestamp order by a single
//! thread.  "Waiting" is always schedule-then-fire:
//!
//! ```text
//! handle = scheduler.schedule(delay, event)   // returns immediately
//! ...                                         // other callbacks run
//! scheduler.cancel(handle)                    // optional, always safe
//! ```
//!
//! Events scheduled for the same instant fire in scheduling order.

pub mod event_queue;
pub mod scheduler;


pub use event_queue::EventQueue;
pub use scheduler::{EventHandle, Scheduler};
