//! Flat (exhaustive) index.

use std::ops::Range;
use vectorcore_core::index::check_query;
use vectorcore_core::types::pad_results;
use vectorcore_core::{CoreResult, FlatStorage, Kernel, Metric, Neighbor, TopK, VectorIndex};

/// Exact index: scans every stored vector on each query.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    storage: FlatStorage,
    metric: Metric,
    /// Kernel resolved from `metric` once at construction.
    kernel: Kernel,
}

impl FlatIndex {
    /// Create an empty index. Fails if `dim == 0`.
    pub fn new(dim: usize, metric: Metric) -> CoreResult<Self> {
        Ok(Self {
            storage: FlatStorage::new(dim)?,
            metric,
            kernel: metric.kernel(),
        })
    }

    /// Create an empty index with room for `capacity` vectors.
    pub fn with_capacity(dim: usize, metric: Metric, capacity: usize) -> CoreResult<Self> {
        Ok(Self {
            storage: FlatStorage::with_capacity(dim, capacity)?,
            metric,
            kernel: metric.kernel(),
        })
    }

    /// Underlying vector storage.
    pub fn storage(&self) -> &FlatStorage {
        &self.storage
    }

    /// Read-only view of the vector at internal index `index`.
    pub fn vector(&self, index: usize) -> CoreResult<&[f32]> {
        self.storage.vector(index)
    }

    /// External id of the vector at internal index `index`.
    pub fn id(&self, index: usize) -> CoreResult<u64> {
        self.storage.id(index)
    }
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.storage.dim()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn add(&mut self, vectors: &[f32], ids: Option<&[u64]>) -> CoreResult<Range<usize>> {
        self.storage.append(vectors, ids)
    }

    fn search(&self, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>> {
        check_query(query, self.storage.dim())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut results = brute_force_search(&self.storage, self.kernel, self.metric, query, k);
        pad_results(&mut results, k, self.metric);
        Ok(results)
    }
}

/// Exhaustive top-`k` over all of `storage`, best-first, without padding.
///
/// Returns `min(k, storage.len())` entries with native scores.
pub fn brute_force_search(
    storage: &FlatStorage,
    kernel: Kernel,
    metric: Metric,
    query: &[f32],
    k: usize,
) -> Vec<Neighbor> {
    let mut top = TopK::new(k.min(storage.len()));

    for (vector, &id) in storage
        .as_slice()
        .chunks_exact(storage.dim())
        .zip(storage.ids())
    {
        let score = kernel(query, vector);
        top.push(metric.badness(score), id);
    }

    top.into_sorted_vec()
        .into_iter()
        .map(|s| Neighbor::new(s.item, metric.score_from_badness(s.badness)))
        .collect()
}
