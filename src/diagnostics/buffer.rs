// SPDX-License-Identifier: MPL-2.0
//! Memory-bounded ring buffer that evicts the oldest entries when full.

use std::collections::VecDeque;

use crate::domain::EventCapacity;

/// A generic circular buffer with fixed capacity.
///
/// Elements are stored in chronological order (oldest first).
///
/// # Example
///
/// ```
/// use layer_lens::diagnostics::CircularBuffer;
///
/// let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(2);
/// buffer.push(1);
/// buffer.push(2);
/// buffer.push(3);
///
/// let items: Vec<_> = buffer.iter().copied().collect();
/// assert_eq!(items, vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    #[must_use]
    pub fn new(capacity: EventCapacity) -> Self {
        Self::with_raw_capacity(capacity.value())
    }

    /// Creates a buffer with an unchecked capacity (at least 1).
    ///
    /// Prefer [`CircularBuffer::new`] outside of tests.
    #[must_use]
    pub fn with_raw_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an element, evicting the oldest if at capacity.
    pub fn push(&mut self, item: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(item);
    }

    /// Oldest first; `.rev()` walks from the most recent entry.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.data.iter()
    }

    /// Most recent element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<T> Default for CircularBuffer<T> {
    fn default() -> Self {
        Self::new(EventCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_event_capacity() {
        let buffer: CircularBuffer<u8> = CircularBuffer::new(EventCapacity::new(32));
        assert_eq!(buffer.capacity(), 32);
        assert!(buffer.is_empty());
    }

    #[test]
    fn push_evicts_oldest_when_full() {
        let mut buffer = CircularBuffer::with_raw_capacity(3);
        for i in 0..5 {
            buffer.push(i);
        }
        let items: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4]);
        assert_eq!(buffer.last(), Some(&4));
    }

    #[test]
    fn iter_rev_starts_at_most_recent() {
        let mut buffer = CircularBuffer::with_raw_capacity(3);
        for i in 0..4 {
            buffer.push(i);
        }
        assert_eq!(buffer.iter().rev().nth(1), Some(&2));
        assert_eq!(buffer.iter().len(), 3);
    }

    #[test]
    fn zero_capacity_becomes_one() {
        let mut buffer = CircularBuffer::with_raw_capacity(0);
        buffer.push("a");
        buffer.push("b");
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last(), Some(&"b"));
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = CircularBuffer::with_raw_capacity(4);
        buffer.push(1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
    }
}
