//! Query surface shared by every index type.

use crate::error::{CoreError, CoreResult};
use crate::types::{Neighbor, SearchBatch};
use crate::Metric;
use std::ops::Range;

/// A k-nearest-neighbor index over fixed-dimension f32 vectors.
///
/// Implementations are single-threaded: `add` takes `&mut self`, so the
/// borrow checker serializes mutation against in-flight searches.
pub trait VectorIndex {
    /// Dimension fixed at construction.
    fn dim(&self) -> usize;

    /// Metric fixed at construction.
    fn metric(&self) -> Metric;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a row-major `[n, dim]` block, with optional external ids.
    ///
    /// Returns the internal indices assigned to the new rows.
    fn add(&mut self, vectors: &[f32], ids: Option<&[u64]>) -> CoreResult<Range<usize>>;

    /// Best-first results for `query`, padded to exactly `k` entries.
    fn search(&self, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>>;

    /// Write the `k` results of [`VectorIndex::search`] into caller buffers.
    ///
    /// Both buffers must hold at least `k` elements; only the first `k` are
    /// written.
    fn search_into(
        &self,
        query: &[f32],
        k: usize,
        out_ids: &mut [u64],
        out_scores: &mut [f32],
    ) -> CoreResult<()> {
        if out_ids.len() < k || out_scores.len() < k {
            return Err(CoreError::InvalidArgument(format!(
                "output buffers hold {} ids and {} scores, need {}",
                out_ids.len(),
                out_scores.len(),
                k
            )));
        }

        let results = self.search(query, k)?;
        for (i, neighbor) in results.iter().enumerate() {
            out_ids[i] = neighbor.id;
            out_scores[i] = neighbor.score;
        }
        Ok(())
    }

    /// Run [`VectorIndex::search`] for each row of a row-major `[m, dim]` block.
    ///
    /// Rows are independent; the result is `[m, k]`.
    fn search_batch(&self, queries: &[f32], k: usize) -> CoreResult<SearchBatch> {
        let dim = self.dim();
        if queries.len() % dim != 0 {
            return Err(CoreError::BufferLength {
                len: queries.len(),
                dim,
            });
        }

        let num_queries = queries.len() / dim;
        let mut batch = SearchBatch::with_capacity(num_queries, k);
        for query in queries.chunks_exact(dim) {
            let row = self.search(query, k)?;
            batch.push_row(&row);
        }
        Ok(batch)
    }
}

/// Reject a query whose length is not `dim`.
pub fn check_query(query: &[f32], dim: usize) -> CoreResult<()> {
    if query.len() != dim {
        return Err(CoreError::DimensionMismatch {
            expected: dim,
            got: query.len(),
        });
    }
    Ok(())
}
