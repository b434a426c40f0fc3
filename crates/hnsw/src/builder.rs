//! Graph construction.

use crate::config::GraphConfig;
use crate::error::HnswResult;
use crate::graph::ProximityGraph;
use crate::GraphIndex;
use vectorcore_core::{FlatStorage, Kernel, Metric, TopK, VectorIndex};

/// Link the vector stored at `idx` into `graph`.
///
/// Brute-force scans the `idx` vectors inserted before it, keeps the
/// `min(M, idx)` best as the new node's neighbors, then offers each of them a
/// back-edge. Back-edges to nodes already holding `M` edges are dropped, so
/// once `idx >= M` the new node is full on arrival and never gains an
/// incoming edge. Returns the number of dropped back-edges.
pub(crate) fn insert_node(
    graph: &mut ProximityGraph,
    storage: &FlatStorage,
    kernel: Kernel,
    metric: Metric,
    idx: usize,
) -> usize {
    debug_assert_eq!(graph.len(), idx, "nodes must be linked in insertion order");

    if idx == 0 {
        graph.push_node(Vec::new());
        return 0;
    }

    let dim = storage.dim();
    let vector = storage.row(idx);
    let predecessors = &storage.as_slice()[..idx * dim];

    let mut top = TopK::new(graph.max_degree().min(idx));
    for (j, other) in predecessors.chunks_exact(dim).enumerate() {
        top.push(metric.badness(kernel(vector, other)), j as u32);
    }

    let neighbors: Vec<u32> = top.into_sorted_vec().into_iter().map(|s| s.item).collect();
    graph.push_node(neighbors.clone());

    neighbors
        .iter()
        .filter(|&&neighbor| !graph.try_add_edge(neighbor as usize, idx as u32))
        .count()
}

/// Builder for [`GraphIndex`].
#[derive(Debug, Clone)]
pub struct GraphIndexBuilder {
    dim: usize,
    metric: Metric,
    config: GraphConfig,
    capacity: usize,
}

impl GraphIndexBuilder {
    /// Start a builder for vectors of `dim` coordinates.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            metric: Metric::default(),
            config: GraphConfig::default(),
            capacity: 0,
        }
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Maximum neighbors per node.
    pub fn m(mut self, m: usize) -> Self {
        self.config.m = m;
        self
    }

    /// Default exploration budget for search.
    pub fn ef_search(mut self, ef: usize) -> Self {
        self.config.ef_search = ef;
        self
    }

    /// Replace the whole graph configuration.
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Pre-allocate room for `capacity` vectors.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build an empty index.
    pub fn build(self) -> HnswResult<GraphIndex> {
        let mut index = GraphIndex::new(self.dim, self.metric, self.config)?;
        index.reserve(self.capacity);
        Ok(index)
    }

    /// Build an index and insert a row-major block of vectors.
    pub fn build_from(self, vectors: &[f32], ids: Option<&[u64]>) -> HnswResult<GraphIndex> {
        let mut index = self.build()?;
        index.add(vectors, ids)?;
        Ok(index)
    }
}
