//! Greedy best-first search over the proximity graph.

use crate::graph::ProximityGraph;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use vectorcore_core::{FlatStorage, Kernel, Metric, Scored, TopK};

/// Frontier entry (inverted ordering for min-heap behavior).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: u32,
    badness: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.badness == other.badness
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .badness
            .partial_cmp(&self.badness)
            .unwrap_or(Ordering::Equal)
    }
}

/// Frontier plus visited bitmap for one query.
struct Frontier<'a> {
    storage: &'a FlatStorage,
    kernel: Kernel,
    metric: Metric,
    query: &'a [f32],
    visited: Vec<bool>,
    heap: BinaryHeap<Candidate>,
}

impl<'a> Frontier<'a> {
    fn new(storage: &'a FlatStorage, kernel: Kernel, metric: Metric, query: &'a [f32]) -> Self {
        Self {
            storage,
            kernel,
            metric,
            query,
            visited: vec![false; storage.len()],
            heap: BinaryHeap::new(),
        }
    }

    /// Score `idx` and queue it, unless it was queued before.
    fn push(&mut self, idx: u32) {
        let slot = idx as usize;
        if self.visited[slot] {
            return;
        }
        self.visited[slot] = true;

        let score = (self.kernel)(self.query, self.storage.row(slot));
        self.heap.push(Candidate {
            idx,
            badness: self.metric.badness(score),
        });
    }

    fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }
}

/// Explore `graph` from node 0 and return up to `ef` internal indices,
/// best-first, tagged with their badness.
///
/// Each step pops the most promising queued node, admits it into the
/// `ef`-bounded result set and queues its unvisited neighbors. The walk stops
/// once the result set is full or nothing reachable is left.
pub fn search_graph(
    graph: &ProximityGraph,
    storage: &FlatStorage,
    kernel: Kernel,
    metric: Metric,
    query: &[f32],
    ef: usize,
) -> Vec<Scored<u32>> {
    let ef = ef.min(storage.len());
    if ef == 0 {
        return Vec::new();
    }

    let mut frontier = Frontier::new(storage, kernel, metric, query);
    let mut best = TopK::new(ef);
    frontier.push(0);

    while !best.is_full() {
        let Some(current) = frontier.pop() else {
            break;
        };
        best.push(current.badness, current.idx);

        for &neighbor in graph.neighbors(current.idx as usize) {
            frontier.push(neighbor);
        }
    }

    best.into_sorted_vec()
}
