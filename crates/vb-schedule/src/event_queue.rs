//! `EventQueue`: single-threaded discrete-event queue.
//!
//! # Layout
//!
//! Event payloads live in an arena of slots (`Vec<Slot<E>>`) recycled through
//! a free list.  Firing order is kept in a `BTreeMap<(SimTime, seq), slot>`;
//! the monotonically increasing `seq` breaks ties so events scheduled for the
//! same instant fire in scheduling order.
//!
//! Insert, cancel and pop are all O(log P) where P = pending events.  For a
//! vehicle fleet each node has at most a handful of pending timers, so the
//! constant is small.

use std::collections::BTreeMap;

use vb_core::SimTime;

use crate::{EventHandle, Scheduler};

struct Pending<E> {
    at:    SimTime,
    seq:   u64,
    event: E,
}

struct Slot<E> {
    generation: u32,
    pending:    Option<Pending<E>>,
}

/// A priority queue of timestamped events with cancellable handles.
pub struct EventQueue<E> {
    now:      SimTime,
    slots:    Vec<Slot<E>>,
    free:     Vec<u32>,
    order:    BTreeMap<(SimTime, u64), u32>,
    next_seq: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            now:      SimTime::ZERO,
            slots:    Vec::new(),
            free:     Vec::new(),
            order:    BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at the absolute time `at`.
    ///
    /// Times in the past are clamped to `now`.
    pub fn schedule_at(&mut self, at: SimTime, event: E) -> EventHandle {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq += 1;

        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot { generation: 0, pending: None });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.pending = Some(Pending { at, seq, event });
        self.order.insert((at, seq), index);

        EventHandle { index, generation: slot.generation }
    }

    /// Remove and return the earliest pending event, advancing `now` to its
    /// timestamp.  Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let (_, index) = self.order.pop_first()?;
        let pending = self.release(index)?;
        self.now = pending.at;
        Some((pending.at, pending.event))
    }

    /// Like [`pop`][Self::pop] but only if the next event is due at or before
    /// `until`.
    pub fn pop_until(&mut self, until: SimTime) -> Option<(SimTime, E)> {
        match self.next_time() {
            Some(t) if t <= until => self.pop(),
            _ => None,
        }
    }

    /// Advance the clock without firing anything.  Never moves backwards.
    pub fn advance_to(&mut self, t: SimTime) {
        self.now = self.now.max(t);
    }

    /// Timestamp of the earliest pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.order.keys().next().map(|&(t, _)| t)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Borrow the payload of a pending event.
    pub fn get(&self, handle: EventHandle) -> Option<&E> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.pending.as_ref().map(|p| &p.event)
    }

    /// Iterate pending events in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (SimTime, &E)> + '_ {
        self.order.iter().filter_map(move |(&(at, _), &index)| {
            self.slots[index as usize].pending.as_ref().map(|p| (at, &p.event))
        })
    }

    /// Empty the slot, bump its generation and recycle it.
    fn release(&mut self, index: u32) -> Option<Pending<E>> {
        let slot = self.slots.get_mut(index as usize)?;
        let pending = slot.pending.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(pending)
    }
}

impl<E> Scheduler<E> for EventQueue<E> {
    #[inline]
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, delay_ms: u64, event: E) -> EventHandle {
        let at = self.now.offset(delay_ms);
        self.schedule_at(at, event)
    }

    fn cancel(&mut self, handle: EventHandle) {
        if !self.is_pending(handle) {
            return;
        }
        if let Some(pending) = self.release(handle.index) {
            self.order.remove(&(pending.at, pending.seq));
        }
    }

    fn is_pending(&self, handle: EventHandle) -> bool {
        self.get(handle).is_some()
    }
}
