use crate::snapshot::Snapshot;
use std::collections::VecDeque;

/// Default number of snapshots kept before the oldest is evicted
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Bounded undo log of surface snapshots with a cursor.
///
/// The cursor points at the snapshot that matches what is currently on the
/// surface. There is no redo: the only way forward is a fresh `push`, which
/// drops anything after the cursor.
#[derive(Debug)]
pub struct SnapshotHistory {
    /// Oldest first
    entries: VecDeque<Snapshot>,
    /// Index of the current snapshot, meaningless while `entries` is empty
    cursor: usize,
    max_len: usize,
}

impl SnapshotHistory {
    /// Creates an empty history holding at most `max_len` snapshots (at least one)
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            entries: VecDeque::with_capacity(max_len.min(DEFAULT_MAX_HISTORY) + 1),
            cursor: 0,
            max_len,
        }
    }

    /// Record a new current snapshot
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            let dropped = self.entries.len() - (self.cursor + 1);
            self.entries.truncate(self.cursor + 1);
            log::debug!("Discarded {} snapshot(s) after cursor", dropped);
        }

        self.entries.push_back(snapshot);

        if self.entries.len() > self.max_len {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("History full, evicted snapshot {}", evicted.id());
            }
        }

        self.cursor = self.entries.len() - 1;
    }

    /// Step back one snapshot and return it for repainting.
    ///
    /// Returns `None` without touching the cursor when there is nothing
    /// earlier to go back to.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Returns true if there is an earlier snapshot to restore
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    /// The snapshot under the cursor
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
