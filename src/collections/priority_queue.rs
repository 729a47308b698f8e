use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry. `sequence` is the insertion counter, so entries with equal
/// priority come back out in the order they went in.
#[derive(Debug)]
struct Entry<T> {
    priority: f32,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we pop the lowest priority.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Single-use ascending priority queue.
///
/// `dequeue` always yields the lowest priority still queued; equal
/// priorities are served first-in first-out. Duplicate items are
/// independent entries, nothing is merged. Maximizing searches enqueue
/// negated scores.
///
/// Built on [`BinaryHeap`], so both operations are `O(log n)`.
#[derive(Debug)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn enqueue(&mut self, item: T, priority: f32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry { priority, sequence, item });
    }

    /// Remove and return the lowest-priority item, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    /// Like [`dequeue`](Self::dequeue) but also returns the priority.
    pub fn dequeue_with_priority(&mut self) -> Option<(T, f32)> {
        self.heap.pop().map(|entry| (entry.item, entry.priority))
    }

    pub fn peek_priority(&self) -> Option<f32> {
        self.heap.peek().map(|entry| entry.priority)
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
