//! BoundedEventLog - fixed-capacity event history (ring buffer)
//!
//! ## Responsibilities
//!
//! - Store recent events in insertion order
//! - Evict the oldest entry once capacity is exceeded
//! - Serve consistent point-in-time snapshots to readers
//!
//! One lock guards both mutation and snapshotting, so a reader can
//! never observe a half-applied append. Two independent instances are
//! used process-wide: one for detections, one for errors.

use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Default history capacity per log instance.
pub const DEFAULT_CAPACITY: usize = 100;

/// Ring buffer holding the most recent `capacity` items.
struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Newest-first, at most `limit` items.
    fn latest(&self, limit: usize) -> Vec<T> {
        self.items.iter().rev().take(limit).cloned().collect()
    }
}

/// Thread-safe, fixed-capacity, insertion-ordered append log.
pub struct BoundedEventLog<T> {
    buffer: RwLock<RingBuffer<T>>,
}

impl<T: Clone> BoundedEventLog<T> {
    /// Create a log holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RwLock::new(RingBuffer::new(capacity)),
        }
    }

    /// Append to the tail, evicting the oldest entry on overflow.
    pub async fn append(&self, item: T) {
        let mut buffer = self.buffer.write().await;
        buffer.push(item);
    }

    /// Independent copy of the whole log, oldest first, taken at a
    /// single point in time.
    pub async fn snapshot(&self) -> Vec<T> {
        let buffer = self.buffer.read().await;
        buffer.items.iter().cloned().collect()
    }

    /// Newest-first view of at most `limit` entries.
    ///
    /// A non-positive `limit` yields an empty vec; a `limit` beyond the
    /// stored count yields everything.
    pub async fn recent(&self, limit: i64) -> Vec<T> {
        if limit <= 0 {
            return Vec::new();
        }
        let buffer = self.buffer.read().await;
        buffer.latest(limit as usize)
    }

    /// Number of entries currently stored.
    pub async fn len(&self) -> usize {
        let buffer = self.buffer.read().await;
        buffer.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove the first (oldest) entry matching `predicate`.
    ///
    /// Returns whether a removal occurred. Linear in log size, which is
    /// fine at the bounded capacity.
    pub async fn remove_first<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut buffer = self.buffer.write().await;
        if let Some(pos) = buffer.items.iter().position(|item| predicate(item)) {
            buffer.items.remove(pos);
            true
        } else {
            false
        }
    }
}

impl<T: Clone> Default for BoundedEventLog<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
