use std::collections::VecDeque;

use bevy::prelude::*;

use crate::wheel::SpinOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryKind {
    SpinStarted { target_index: usize },
    SpinCompleted(SpinOutcome),
    Acknowledged { index: usize },
    Removed { label: String, remaining: usize },
    RemovalSkipped { remaining: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// `Time` elapsed at the frame the entry was recorded.
    pub at_ms: f64,
    pub kind: HistoryKind,
}

/// Bounded journal of what the wheel did, oldest first.
#[derive(Resource, Debug, Clone)]
pub struct WheelHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for WheelHistory {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl WheelHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn push(&mut self, at_ms: f64, kind: HistoryKind) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry { at_ms, kind });
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Completed spins, oldest first.
    pub fn winners(&self) -> impl Iterator<Item = &SpinOutcome> {
        self.entries.iter().filter_map(|e| match &e.kind {
            HistoryKind::SpinCompleted(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_drop_first() {
        let mut h = WheelHistory::with_capacity(2);
        for i in 0..3 {
            h.push(i as f64, HistoryKind::SpinStarted { target_index: i });
        }
        let targets: Vec<_> = h
            .entries()
            .map(|e| match e.kind {
                HistoryKind::SpinStarted { target_index } => target_index,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(targets, vec![1, 2]);
        h.set_capacity(1);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut h = WheelHistory::with_capacity(0);
        h.push(0.0, HistoryKind::RemovalSkipped { remaining: 2 });
        assert!(h.is_empty());
    }
}
