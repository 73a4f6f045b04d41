use crate::client::types::FlaggedTransaction;

pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded, newest-first list of alerts accumulated across overlapping
/// snapshots. Invariant: no two entries share the same
/// `(account_id, timestamp)` pair.
#[derive(Debug)]
pub struct RollingAlertHistory {
    entries: Vec<FlaggedTransaction>,
    capacity: usize,
}

impl RollingAlertHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Merge a snapshot's alerts into the history. Alerts already present
    /// (by dedup key) are skipped; the rest are prepended in their
    /// in-snapshot order, then the history is truncated to capacity.
    /// Returns how many alerts were actually added.
    pub fn merge(&mut self, incoming: &[FlaggedTransaction]) -> usize {
        let mut fresh: Vec<FlaggedTransaction> = Vec::new();
        for alert in incoming {
            let key = alert.dedup_key();
            if self.entries.iter().any(|e| e.dedup_key() == key) {
                continue;
            }
            if fresh.iter().any(|e| e.dedup_key() == key) {
                continue;
            }
            fresh.push(alert.clone());
        }

        let added = fresh.len();
        if added > 0 {
            fresh.extend(self.entries.drain(..));
            self.entries = fresh;
            self.entries.truncate(self.capacity);
        }
        added
    }

    pub fn entries(&self) -> &[FlaggedTransaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
