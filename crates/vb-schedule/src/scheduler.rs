//! The `Scheduler` trait consumed by behaviors.

use std::fmt;

use vb_core::SimTime;

/// Cancellation token for a scheduled event.
///
/// A handle is an arena slot index paired with the slot's generation at
/// scheduling time.  Once the event fires or is cancelled the slot's
/// generation moves on, so a stale handle can never cancel a newer event
/// that happens to reuse the slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EventHandle {
    pub(crate) index:      u32,
    pub(crate) generation: u32,
}

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ev#{}.{}", self.index, self.generation)
    }
}

/// Time source plus one-shot timers.
///
/// Implemented by [`EventQueue`][crate::EventQueue] directly and by the sim
/// harness through a per-node adapter.
pub trait Scheduler<E> {
    /// Current simulation time.
    fn now(&self) -> SimTime;

    /// Fire `event` after `delay_ms` milliseconds.
    fn schedule(&mut self, delay_ms: u64, event: E) -> EventHandle;

    /// Cancel a pending event.
    ///
    /// Idempotent: cancelling an event that already fired, was already
    /// cancelled, or never existed is a no-op.
    fn cancel(&mut self, handle: EventHandle);

    /// `true` while the event behind `handle` has neither fired nor been
    /// cancelled.
    fn is_pending(&self, handle: EventHandle) -> bool;
}
