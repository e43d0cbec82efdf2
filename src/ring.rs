use crate::event::EventRecord;
use std::collections::VecDeque;

/// Bounded FIFO queue of `EventRecord`s, capacity `MAX_EVENTS` (see
/// `Config::max_events`).
///
/// The teacher's `Ring<T>` is lock-free because its producer and consumer
/// are genuinely concurrent threads. Here the single producer (playback
/// thread or broadcast path) and single consumer (the owning host thread in
/// `wait_event`) never run at the same time without coordination - both
/// always hold the owning `Client`'s lock first - so a plain bounded
/// `VecDeque` is the right tool: the locking discipline, not the ring
/// itself, is what enforces single-producer/single-consumer.
///
/// Writes are non-blocking: `write` either fully succeeds or does nothing,
/// returning `false`. A partial write is impossible by construction.
#[derive(Debug)]
pub struct EventRing {
    records: VecDeque<EventRecord>,
    capacity: usize,
}

impl EventRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Number of buffered records.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.records.len()
    }

    /// Number of free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.records.len())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attempts to enqueue a record. Returns `true` on success, `false` if
    /// the ring is at capacity (the record is handed back via `Result`-free
    /// `bool` to match spec: a write either fully succeeds or does nothing).
    #[must_use]
    pub fn write(&mut self, record: EventRecord) -> bool {
        if self.records.len() >= self.capacity {
            return false;
        }
        self.records.push_back(record);
        true
    }

    /// Dequeues the oldest record, if any.
    pub fn read(&mut self) -> Option<EventRecord> {
        self.records.pop_front()
    }

    /// Drops every buffered record, freeing their payloads. Used by
    /// `Client::destroy` to drain a ring whose consumer is going away.
    pub fn drain(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use proptest::prelude::*;

    #[test]
    fn write_respects_capacity() {
        let mut ring = EventRing::new(2);
        assert!(ring.write(EventRecord::none()));
        assert!(ring.write(EventRecord::none()));
        assert!(!ring.write(EventRecord::none()));
        assert_eq!(ring.buffered(), 2);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn read_preserves_fifo_order() {
        let mut ring = EventRing::new(4);
        ring.write(EventRecord::unsolicited(EventKind::Ok));
        ring.write(EventRecord::unsolicited(EventKind::Tick));
        assert_eq!(ring.read().unwrap().event_id, EventKind::Ok);
        assert_eq!(ring.read().unwrap().event_id, EventKind::Tick);
        assert!(ring.read().is_none());
    }

    #[test]
    fn drain_empties_without_reading() {
        let mut ring = EventRing::new(4);
        ring.write(EventRecord::none());
        ring.write(EventRecord::none());
        ring.drain();
        assert_eq!(ring.buffered(), 0);
        assert_eq!(ring.available(), 4);
    }

    proptest! {
        #[test]
        fn buffered_plus_available_always_equals_capacity(
            capacity in 1usize..32,
            writes in 0usize..64,
        ) {
            let mut ring = EventRing::new(capacity);
            for _ in 0..writes {
                ring.write(EventRecord::none());
            }
            prop_assert_eq!(ring.buffered() + ring.available(), ring.capacity());
            prop_assert!(ring.buffered() <= capacity);
        }
    }
}
