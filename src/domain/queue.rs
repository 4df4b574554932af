/// Min-priority queue used by the route search.
///
/// Backed by a binary heap. Entries with equal priority come out in
/// insertion order, so the search expands equal-cost nodes the same way
/// every time and routes are reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dequeue called on an empty priority queue")]
pub struct EmptyQueueError;

struct Entry<T> {
    priority: i32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
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
        // Reversed: BinaryHeap is a max-heap.
        other.priority.cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> PriorityQueue<T> {
    pub fn with_capacity(cap: usize) -> Self {
        PriorityQueue { heap: BinaryHeap::with_capacity(cap), next_seq: 0 }
    }

    pub fn enqueue(&mut self, item: T, priority: i32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { priority, seq, item });
    }

    /// Remove the item with the smallest priority.
    pub fn dequeue(&mut self) -> Result<T, EmptyQueueError> {
        self.heap.pop().map(|e| e.item).ok_or(EmptyQueueError)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
