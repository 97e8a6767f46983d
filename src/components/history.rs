use std::collections::VecDeque;
use std::sync::Arc;

use crate::canvas::RasterBuffer;

/// Hard cap on the number of snapshots kept, including the initial image.
pub const HISTORY_CAPACITY: usize = 20;

// ============================================================================
// HISTORY ENTRY
// ============================================================================

/// An immutable buffer snapshot and its position in the session's edit sequence.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Monotonic per session; the initial buffer is 0. Not reset by eviction.
    pub sequence: u64,
    pub description: String,
    pub buffer: Arc<RasterBuffer>,
}

impl HistoryEntry {
    /// Pixel bytes held by this snapshot.
    pub fn memory_size(&self) -> usize {
        self.buffer.memory_bytes()
    }
}

// ============================================================================
// HISTORY MANAGER - bounded linear undo/redo log
// ============================================================================

/// Linear undo/redo log of full buffer snapshots.
///
/// Invariant: `0 <= cursor < entries.len() <= capacity`. The entry at the
/// cursor is the current buffer; entries after it are the redo tail.
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
    next_sequence: u64,
    /// Running memory total across all entries.
    total_memory: usize,
}

impl HistoryManager {
    pub fn new(initial: RasterBuffer) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    /// Start from a buffer that is already shared elsewhere.
    pub fn from_shared(initial: Arc<RasterBuffer>) -> Self {
        Self::with_shared(initial, HISTORY_CAPACITY)
    }

    /// Capacity below 1 is raised to 1.
    pub fn with_capacity(initial: RasterBuffer, capacity: usize) -> Self {
        Self::with_shared(Arc::new(initial), capacity)
    }

    fn with_shared(initial: Arc<RasterBuffer>, capacity: usize) -> Self {
        let mut manager = Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            cursor: 0,
            capacity: capacity.max(1),
            next_sequence: 0,
            total_memory: 0,
        };
        manager.reset(initial);
        manager
    }

    /// Append `buffer` as the new current entry.
    ///
    /// Returns `false` without touching the log when `buffer` equals the
    /// current entry. Otherwise the redo tail is discarded, and when the log
    /// is full the oldest entry is evicted.
    pub fn commit(&mut self, buffer: RasterBuffer, description: impl Into<String>) -> bool {
        if *self.current() == buffer {
            return false;
        }

        // New action invalidates everything after the cursor
        for dropped in self.entries.drain(self.cursor + 1..) {
            self.total_memory = self.total_memory.saturating_sub(dropped.memory_size());
        }

        let entry = HistoryEntry {
            sequence: self.next_sequence,
            description: description.into(),
            buffer: Arc::new(buffer),
        };
        self.next_sequence += 1;
        self.total_memory += entry.memory_size();
        self.entries.push_back(entry);
        self.cursor = self.entries.len() - 1;

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(evicted.memory_size());
                self.cursor -= 1;
            }
        }
        true
    }

    /// Step back one entry. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Arc<RasterBuffer>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one entry. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<Arc<RasterBuffer>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Drop all entries and start over from `initial` at cursor 0.
    pub fn reset(&mut self, initial: Arc<RasterBuffer>) {
        self.entries.clear();
        self.cursor = 0;
        self.next_sequence = 0;
        let entry = HistoryEntry {
            sequence: self.next_sequence,
            description: "Original".to_string(),
            buffer: initial,
        };
        self.next_sequence += 1;
        self.total_memory = entry.memory_size();
        self.entries.push_back(entry);
    }

    pub fn current(&self) -> Arc<RasterBuffer> {
        Arc::clone(&self.current_entry().buffer)
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len() - 1 - self.cursor
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Description of the edit that `undo()` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.can_undo().then(|| self.current_entry().description.as_str())
    }

    /// Description of the edit that `redo()` would reapply.
    pub fn redo_description(&self) -> Option<&str> {
        self.entries.get(self.cursor + 1).map(|e| e.description.as_str())
    }

    /// All entry descriptions, oldest first.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.description.clone()).collect()
    }

    /// Memory held by all snapshots (O(1) via cached total).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;

    fn marked(n: u32) -> RasterBuffer {
        let mut buf = RasterBuffer::filled(4, 4, Color::rgba(255, 255, 255, 255));
        buf.put(n % 4, (n / 4) % 4, Color::rgba(0, 0, 0, n as u8));
        buf
    }

    #[test]
    fn test_starts_with_initial_entry() {
        let h = HistoryManager::new(marked(0));
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(*h.current(), marked(0));
    }

    #[test]
    fn test_commit_equal_buffer_is_noop() {
        let mut h = HistoryManager::new(marked(0));
        assert!(!h.commit(marked(0), "same"));
        assert_eq!(h.len(), 1);
        assert!(h.commit(marked(1), "edit"));
        assert!(!h.commit(marked(1), "again"));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut h = HistoryManager::new(marked(0));
        h.commit(marked(1), "one");
        h.commit(marked(2), "two");

        assert_eq!(h.undo_description(), Some("two"));
        assert_eq!(*h.undo().unwrap(), marked(1));
        assert_eq!(*h.undo().unwrap(), marked(0));
        assert!(h.undo().is_none());
        assert_eq!(h.redo_description(), Some("one"));
        assert_eq!(*h.redo().unwrap(), marked(1));
        assert_eq!(*h.redo().unwrap(), marked(2));
        assert!(h.redo().is_none());
    }

    #[test]
    fn test_commit_after_undo_truncates_redo_tail() {
        let mut h = HistoryManager::new(marked(0));
        h.commit(marked(1), "one");
        h.commit(marked(2), "two");
        h.undo();
        h.undo();
        assert!(h.commit(marked(3), "three"));
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(h.descriptions(), vec!["Original".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_eviction_keeps_cursor_on_newest() {
        let mut h = HistoryManager::with_capacity(marked(0), 3);
        for n in 1..=5 {
            h.commit(marked(n), format!("edit {n}"));
            assert_eq!(h.cursor(), h.len() - 1);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.current_entry().sequence, 5);
        assert_eq!(*h.undo().unwrap(), marked(4));
        assert_eq!(*h.undo().unwrap(), marked(3));
        assert!(h.undo().is_none());
    }

    #[test]
    fn test_memory_tracking() {
        let mut h = HistoryManager::new(marked(0));
        assert_eq!(h.memory_usage(), 64);
        h.commit(marked(1), "a much longer description than the other one");
        assert_eq!(h.memory_usage(), 2 * 64);
        h.undo();
        h.commit(marked(2), "c");
        assert_eq!(h.memory_usage(), 2 * 64);
    }

    #[test]
    fn test_undo_redo_counts() {
        let mut h = HistoryManager::new(marked(0));
        assert_eq!((h.undo_count(), h.redo_count()), (0, 0));
        h.commit(marked(1), "one");
        h.commit(marked(2), "two");
        assert_eq!((h.undo_count(), h.redo_count()), (2, 0));
        h.undo();
        h.undo();
        assert_eq!((h.undo_count(), h.redo_count()), (0, 2));
        h.redo();
        assert_eq!((h.undo_count(), h.redo_count()), (1, 1));
        assert_eq!(h.undo_count() + h.redo_count() + 1, h.len());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut h = HistoryManager::new(marked(0));
        h.commit(marked(1), "one");
        h.commit(marked(2), "two");
        h.undo();
        h.reset(Arc::new(marked(0)));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current_entry().sequence, 0);
        assert_eq!(*h.current(), marked(0));
    }
}
