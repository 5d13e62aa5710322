//! Event queue with deterministic ordering.

use crate::event::Event;
use crate::Time;
use std::collections::BTreeMap;

/// Key for ordering events in the queue.
///
/// Events are ordered by their time, and events at the same time are processed in the order in
/// which they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventKey {
    /// When this event should be processed.
    pub time: Time,
    /// Sequence number for FIFO ordering at the same time.
    pub sequence: u64,
}

/// Scheduler owning all pending events and the simulated clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BTreeMap<EventKey, Event>,
    sequence: u64,
    now: Time,
}

impl Scheduler {
    /// Create an empty scheduler at time 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> Time {
        self.now
    }

    /// Schedule an event `delay` time units from now.
    pub fn schedule(&mut self, event: Event, delay: Time) -> EventKey {
        self.schedule_at(event, self.now + delay)
    }

    /// Schedule an event at an absolute time. Times in the past are moved to the current time.
    pub fn schedule_at(&mut self, event: Event, time: Time) -> EventKey {
        self.sequence += 1;
        let key = EventKey {
            time: time.max(self.now),
            sequence: self.sequence,
        };
        self.queue.insert(key, event);
        key
    }

    /// Remove the earliest event and advance the clock to its time.
    pub fn pop(&mut self) -> Option<(Time, Event)> {
        let (key, event) = self.queue.pop_first()?;
        self.now = key.time;
        Some((key.time, event))
    }

    /// Time of the next event, without removing it
    pub fn peek_time(&self) -> Option<Time> {
        self.queue.keys().next().map(|k| k.time)
    }

    /// Returns true if there are pending events
    pub fn has_events(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if no event is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop all events and move the clock back to 0.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.sequence = 0;
        self.now = 0;
    }
}
