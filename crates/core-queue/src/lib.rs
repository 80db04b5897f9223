//! A rank-ordered event queue: pops the smallest `(rank, seq)` pair first,
//! with insertion order breaking ties among equal ranks.
//!
//! `seq` is assigned internally — callers never see or choose it — so two
//! pushes at the same rank always pop in the order they were pushed, and
//! [`EventQueue::push_first`] can jump an event to the front of its rank
//! without disturbing that ordering for everyone else.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct Key {
    rank: i64,
    seq: i64,
}

#[derive(Serialize, Deserialize)]
struct Entry<E> {
    key: Key,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<E> Eq for Entry<E> {}
impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// A min-heap of `{event, rank, seq}`, ordered lexicographically.
#[derive(Serialize, Deserialize)]
pub struct EventQueue<E> {
    heap: BinaryHeap<Reverse<Entry<E>>>,
    next_pos_seq: i64,
    next_neg_seq: i64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        EventQueue::new()
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        EventQueue { heap: BinaryHeap::new(), next_pos_seq: 1, next_neg_seq: -1 }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pushes `event` at `rank`, ordered after every other entry already at
    /// that rank.
    pub fn push(&mut self, event: E, rank: i64) {
        let seq = self.next_pos_seq;
        self.next_pos_seq += 1;
        self.heap.push(Reverse(Entry { key: Key { rank, seq }, event }));
    }

    /// Pushes `event` at `rank`, ordered before every entry pushed so far at
    /// that rank (via [`EventQueue::push`]), by assigning it a negative seq.
    pub fn push_first(&mut self, event: E, rank: i64) {
        let seq = self.next_neg_seq;
        self.next_neg_seq -= 1;
        self.heap.push(Reverse(Entry { key: Key { rank, seq }, event }));
    }

    /// Removes and returns the entry with the smallest `(rank, seq)`.
    pub fn pop(&mut self) -> Option<E> {
        self.heap.pop().map(|Reverse(e)| e.event)
    }

    pub fn peek(&self) -> Option<&E> {
        self.heap.peek().map(|Reverse(e)| &e.event)
    }

    /// Drains the queue, keeping only entries for which `pred` returns true,
    /// and resets sequence counters so long-lived queues don't overflow.
    pub fn filter<F: FnMut(&E) -> bool>(&mut self, mut pred: F) {
        let mut kept: Vec<Entry<E>> = self.heap.drain().map(|Reverse(e)| e).collect();
        kept.sort_by_key(|e| e.key);
        kept.retain(|e| pred(&e.event));

        self.next_pos_seq = 1;
        self.next_neg_seq = -1;
        for e in kept {
            self.heap.push(Reverse(Entry { key: Key { rank: e.key.rank, seq: self.next_pos_seq }, event: e.event }));
            self.next_pos_seq += 1;
        }
    }
}
