//! Bounded history of completed analyses

use crate::result::AnalysisResult;
use std::collections::VecDeque;

/// Number of analyses a session keeps; the oldest is evicted on the 11th
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Most-recent-first history with a fixed capacity
///
/// Owned by a single session; there is no internal locking.
#[derive(Debug, Clone)]
pub struct ResultStore {
    entries: VecDeque<AnalysisResult>,
    capacity: usize,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a store holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry on overflow
    pub fn record(&mut self, result: AnalysisResult) {
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                tracing::debug!(ticker = %evicted.ticker, "evicted oldest analysis from history");
            }
        }
    }

    /// Snapshot of all entries, most recent first
    pub fn list(&self) -> Vec<AnalysisResult> {
        self.entries.iter().cloned().collect()
    }

    /// Up to `n` most recent entries
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter().take(n)
    }

    pub fn get(&self, index: usize) -> Option<&AnalysisResult> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.entries.front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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
