//! Session event sink: append-only record of committed commands.
//!
//! The sink stamps each event with the next [`LogicalTime`] and a
//! wall-clock time, then retains it for external observers. Memory stays
//! bounded: once `capacity` records are held, the oldest is evicted.
//! Sequence numbers are never reused, even after eviction or drain.

use std::collections::VecDeque;

use chrono::Utc;
use triescrow_types::{EventRecord, LogicalTime, SessionEvent};

/// Bounded, append-only event log.
#[derive(Debug, Clone)]
pub struct SessionEventSink {
    /// Retained records, oldest first.
    records: VecDeque<EventRecord>,
    /// Sequence of the most recently emitted record.
    last: LogicalTime,
    /// Maximum number of retained records.
    capacity: usize,
}

impl SessionEventSink {
    /// Create a sink retaining at most `capacity` records.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "SessionEventSink capacity must be > 0");
        Self {
            records: VecDeque::new(),
            last: LogicalTime::default(),
            capacity,
        }
    }

    /// Stamp and append an event, returning the stored record.
    pub fn emit(&mut self, event: SessionEvent) -> EventRecord {
        self.last = self.last.next();
        let record = EventRecord {
            sequence: self.last,
            recorded_at: Utc::now(),
            event,
        };

        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record.clone());
        record
    }

    /// All retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Retained records with a sequence strictly after `after`.
    #[must_use]
    pub fn since(&self, after: LogicalTime) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| r.sequence > after)
            .cloned()
            .collect()
    }

    /// Remove and return every retained record.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        self.records.drain(..).collect()
    }

    /// Sequence of the most recent record (zero before the first emit).
    #[must_use]
    pub fn last_sequence(&self) -> LogicalTime {
        self.last
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use triescrow_types::PartyId;

    use super::*;

    fn funded(n: i64) -> SessionEvent {
        SessionEvent::Funded {
            buyer: PartyId::from_bytes([9; 20]),
            amount: Decimal::new(n, 0),
        }
    }

    #[test]
    fn sequences_start_at_one_and_increase() {
        let mut sink = SessionEventSink::new(10);
        assert_eq!(sink.last_sequence(), LogicalTime(0));
        let a = sink.emit(funded(1));
        let b = sink.emit(funded(2));
        assert_eq!(a.sequence, LogicalTime(1));
        assert_eq!(b.sequence, LogicalTime(2));
        assert!(a.recorded_at <= b.recorded_at);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut sink = SessionEventSink::new(2);
        sink.emit(funded(1));
        sink.emit(funded(2));
        sink.emit(funded(3));
        let kept: Vec<_> = sink.records().map(|r| r.sequence).collect();
        assert_eq!(kept, vec![LogicalTime(2), LogicalTime(3)]);
    }

    #[test]
    fn since_filters_by_sequence() {
        let mut sink = SessionEventSink::new(10);
        for n in 1..=4 {
            sink.emit(funded(n));
        }
        let tail = sink.since(LogicalTime(2));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, LogicalTime(3));
        assert!(sink.since(LogicalTime(4)).is_empty());
    }

    #[test]
    fn drain_empties_but_keeps_sequence() {
        let mut sink = SessionEventSink::new(10);
        sink.emit(funded(1));
        sink.emit(funded(2));
        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
        let next = sink.emit(funded(3));
        assert_eq!(next.sequence, LogicalTime(3));
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = SessionEventSink::new(0);
    }
}
