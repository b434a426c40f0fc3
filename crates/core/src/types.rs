//! Search result types.

use crate::Metric;
use serde::{Deserialize, Serialize};

/// Id used for padding slots when fewer than `k` results exist.
pub const SENTINEL_ID: u64 = u64::MAX;

/// One search hit: external id plus the metric's native score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: u64,
    pub score: f32,
}

impl Neighbor {
    pub fn new(id: u64, score: f32) -> Self {
        Self { id, score }
    }

    /// Padding entry: sentinel id and the worst score `metric` can produce.
    pub fn padding(metric: Metric) -> Self {
        Self {
            id: SENTINEL_ID,
            score: metric.worst_score(),
        }
    }

    pub fn is_padding(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

/// Extend `results` with padding entries up to exactly `k`.
pub fn pad_results(results: &mut Vec<Neighbor>, k: usize, metric: Metric) {
    if results.len() < k {
        results.resize(k, Neighbor::padding(metric));
    }
}

/// Fixed-width results for a batch of queries.
///
/// Row `i` holds the `k` best-first entries for query `i` in
/// `ids[i * k..(i + 1) * k]` and `scores[i * k..(i + 1) * k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBatch {
    pub k: usize,
    pub num_queries: usize,
    pub ids: Vec<u64>,
    pub scores: Vec<f32>,
}

impl SearchBatch {
    pub fn with_capacity(num_queries: usize, k: usize) -> Self {
        Self {
            k,
            num_queries: 0,
            ids: Vec::with_capacity(num_queries * k),
            scores: Vec::with_capacity(num_queries * k),
        }
    }

    /// Append one query's results. `row` must hold exactly `k` entries.
    pub fn push_row(&mut self, row: &[Neighbor]) {
        debug_assert_eq!(row.len(), self.k);
        self.ids.extend(row.iter().map(|n| n.id));
        self.scores.extend(row.iter().map(|n| n.score));
        self.num_queries += 1;
    }

    /// Results for query `query` as neighbors, or `None` past the last row.
    pub fn row(&self, query: usize) -> Option<Vec<Neighbor>> {
        if query >= self.num_queries {
            return None;
        }

        let start = query * self.k;
        let ids = self.ids.get(start..start + self.k)?;
        let scores = self.scores.get(start..start + self.k)?;
        Some(
            ids.iter()
                .zip(scores)
                .map(|(&id, &score)| Neighbor { id, score })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        let pad = Neighbor::padding(Metric::L2Squared);
        assert!(pad.is_padding());
        assert_eq!(pad.score, f32::INFINITY);

        let pad = Neighbor::padding(Metric::InnerProduct);
        assert_eq!(pad.score, f32::NEG_INFINITY);
    }

    #[test]
    fn test_pad_results() {
        let mut results = vec![Neighbor::new(3, 0.5)];
        pad_results(&mut results, 3, Metric::L2Squared);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Neighbor::new(3, 0.5));
        assert!(results[1].is_padding());
        assert!(results[2].is_padding());

        // Never truncates
        pad_results(&mut results, 1, Metric::L2Squared);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_batch_rows() {
        let mut batch = SearchBatch::with_capacity(2, 2);
        batch.push_row(&[Neighbor::new(1, 0.1), Neighbor::new(2, 0.2)]);
        batch.push_row(&[Neighbor::new(3, 0.3), Neighbor::padding(Metric::L2Squared)]);

        assert_eq!(batch.num_queries, 2);
        assert_eq!(batch.ids, vec![1, 2, 3, SENTINEL_ID]);
        let row = batch.row(1).unwrap();
        assert_eq!(row[0], Neighbor::new(3, 0.3));
        assert!(row[1].is_padding());
    }

    #[test]
    fn test_batch_row_out_of_range() {
        let mut batch = SearchBatch::with_capacity(1, 2);
        assert_eq!(batch.row(0), None);

        batch.push_row(&[Neighbor::new(1, 0.1), Neighbor::new(2, 0.2)]);
        assert!(batch.row(0).is_some());
        assert_eq!(batch.row(1), None);
        assert_eq!(batch.row(usize::MAX), None);

        let mut empty = SearchBatch::with_capacity(1, 0);
        empty.push_row(&[]);
        assert_eq!(empty.row(0), Some(Vec::new()));
    }
}
