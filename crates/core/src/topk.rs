//! Bounded top-k selection.
//!
//! Candidates are ranked by *badness* (see [`crate::Metric::badness`]): lower
//! is better for every metric. [`TopK`] keeps a max-heap of at most `k`
//! entries so the current worst sits on top, which makes the
//! "is this better than what I kept?" test O(1) and replacement O(log k).

use std::cmp::Ordering;
use std::collections::binary_heap::BinaryHeap;

/// A candidate tagged with its badness.
#[derive(Debug, Clone, Copy)]
pub struct Scored<T> {
    pub badness: f32,
    pub item: T,
}

impl<T> PartialEq for Scored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.badness == other.badness
    }
}

impl<T> Eq for Scored<T> {}

impl<T> PartialOrd for Scored<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scored<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Natural order: the heap top is the worst kept candidate
        self.badness
            .partial_cmp(&other.badness)
            .unwrap_or(Ordering::Equal)
    }
}

/// Online selector retaining the `k` lowest-badness candidates seen so far.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    k: usize,
    heap: BinaryHeap<Scored<T>>,
}

impl<T> TopK<T> {
    /// Create a selector of capacity `k`. A zero capacity rejects everything.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Badness of the worst kept candidate.
    pub fn worst(&self) -> Option<f32> {
        self.heap.peek().map(|s| s.badness)
    }

    /// Offer a candidate.
    ///
    /// Below capacity it is always kept. At capacity it replaces the current
    /// worst only if strictly better. Returns whether it was kept.
    pub fn push(&mut self, badness: f32, item: T) -> bool {
        if self.heap.len() < self.k {
            self.heap.push(Scored { badness, item });
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if badness < worst.badness => {
                // PeekMut restores the heap property on drop.
                *worst = Scored { badness, item };
                true
            }
            _ => false,
        }
    }

    /// Drain into a best-first (ascending badness) vector.
    pub fn into_sorted_vec(self) -> Vec<Scored<T>> {
        self.heap.into_sorted_vec()
    }
}

impl<T> Extend<(f32, T)> for TopK<T> {
    fn extend<I: IntoIterator<Item = (f32, T)>>(&mut self, iter: I) {
        for (badness, item) in iter {
            self.push(badness, item);
        }
    }
}
