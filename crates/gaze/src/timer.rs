//! Cancellable deadline queue
//!
//! Deadlines are plain millisecond timestamps. Nothing here reads a clock;
//! the owner drains due entries by calling [`TimerQueue::pop_due`] with the
//! current time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Handle for cancelling a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Scheduled<E> {
    due_ms: u64,
    seq: u64,
    event: E,
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (earliest deadline first)
        // Then by insertion order
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending deadlines
#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Scheduled<E>>,
    next_seq: u64,
}

impl<E> TimerQueue<E> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to become due at `due_ms`
    pub fn schedule(&mut self, due_ms: u64, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { due_ms, seq, event });
        TimerHandle(seq)
    }

    /// Cancel a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.seq != handle.0);
        self.heap.len() != before
    }

    /// Drop every pending entry
    pub fn cancel_all(&mut self) {
        self.heap.clear();
    }

    /// Pop the earliest entry if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, E)> {
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|entry| (entry.due_ms, entry.event))
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.due_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
