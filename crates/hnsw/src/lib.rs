//! Single-layer proximity-graph index for vectorcore.
//!
//! A simplified graph index modeled on the base layer of HNSW: every vector
//! is a node holding at most `M` outgoing edges, and queries walk the graph
//! greedily from node 0.
//!
//! # Construction
//! Insertion links each new vector to its `min(M, n)` nearest predecessors by
//! brute force and offers each of them a back-edge. Back-edges to nodes that
//! already hold `M` edges are dropped, never rebalanced. Construction is
//! therefore O(n) per insert; the graph only speeds up search.
//!
//! With this drop rule the first `M + 1` nodes end up as a clique of degree
//! `M`, and every later node arrives already holding `M` forward edges. No
//! back-edge is accepted after that point, so walks from node 0 only ever
//! reach the first `M + 1` insertions. Exhaustive-quality search therefore
//! requires `M >= n - 1`.
//!
//! # Search
//! Best-first expansion from node 0 under an exploration budget `ef`
//! (default 64, capped at the collection size). Results are approximate: only
//! nodes reachable within the budget are considered.
//!
//! # Example
//! ```ignore
//! use vectorcore_core::{Metric, VectorIndex};
//! use vectorcore_hnsw::GraphIndexBuilder;
//!
//! let mut index = GraphIndexBuilder::new(128).metric(Metric::InnerProduct).m(16).build()?;
//! index.add(&vectors, None)?;
//! let results = index.search(&query, 10)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod search;

pub use builder::GraphIndexBuilder;
pub use config::{GraphConfig, DEFAULT_EF_SEARCH, DEFAULT_M};
pub use error::{HnswError, HnswResult};
pub use graph::{GraphNode, GraphStats, ProximityGraph};
pub use search::search_graph;

use std::ops::Range;
use vectorcore_core::index::check_query;
use vectorcore_core::types::pad_results;
use vectorcore_core::{CoreError, CoreResult, FlatStorage, Kernel, Metric, Neighbor, VectorIndex};

/// Approximate index over a single-layer proximity graph.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    storage: FlatStorage,
    graph: ProximityGraph,
    config: GraphConfig,
    metric: Metric,
    kernel: Kernel,
    /// Back-edges refused because their target was already full.
    dropped_back_edges: usize,
}

impl GraphIndex {
    /// Create an empty index. Fails on `dim == 0`, `M == 0` or a zero budget.
    pub fn new(dim: usize, metric: Metric, config: GraphConfig) -> HnswResult<Self> {
        config.validate()?;
        Ok(Self {
            storage: FlatStorage::new(dim)?,
            graph: ProximityGraph::new(config.m),
            config,
            metric,
            kernel: metric.kernel(),
            dropped_back_edges: 0,
        })
    }

    /// Create an empty index with the given `m` and default budget.
    pub fn with_m(dim: usize, metric: Metric, m: usize) -> HnswResult<Self> {
        Self::new(dim, metric, GraphConfig::new(m))
    }

    /// Reserve room for `additional` more vectors.
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
        self.graph.reserve(additional);
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Underlying vector storage.
    pub fn storage(&self) -> &FlatStorage {
        &self.storage
    }

    pub fn graph(&self) -> &ProximityGraph {
        &self.graph
    }

    /// Read-only view of the vector at internal index `index`.
    pub fn vector(&self, index: usize) -> CoreResult<&[f32]> {
        self.storage.vector(index)
    }

    /// External id of the vector at internal index `index`.
    pub fn id(&self, index: usize) -> CoreResult<u64> {
        self.storage.id(index)
    }

    /// Outgoing edges of internal index `index`.
    pub fn neighbors(&self, index: usize) -> CoreResult<&[u32]> {
        match self.graph.node(index) {
            Some(node) => Ok(node.neighbors.as_slice()),
            None => Err(CoreError::OutOfBounds {
                index,
                len: self.graph.len(),
            }),
        }
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Total back-edges dropped at the degree cap since construction.
    pub fn dropped_back_edges(&self) -> usize {
        self.dropped_back_edges
    }

    /// Search with an explicit exploration budget instead of the configured
    /// one. `ef` is capped at the collection size; zero is rejected.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> CoreResult<Vec<Neighbor>> {
        check_query(query, self.storage.dim())?;
        if ef == 0 {
            return Err(CoreError::InvalidArgument("ef must be > 0".into()));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let candidates = search_graph(
            &self.graph,
            &self.storage,
            self.kernel,
            self.metric,
            query,
            ef,
        );

        let ids = self.storage.ids();
        let mut results: Vec<Neighbor> = candidates
            .into_iter()
            .take(k)
            .map(|c| {
                Neighbor::new(
                    ids[c.item as usize],
                    self.metric.score_from_badness(c.badness),
                )
            })
            .collect();

        pad_results(&mut results, k, self.metric);
        Ok(results)
    }
}

impl VectorIndex for GraphIndex {
    fn dim(&self) -> usize {
        self.storage.dim()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    /// Append vectors and link each one into the graph in order.
    ///
    /// Nodes are addressed by `u32`, so the collection may not grow past
    /// `u32::MAX` vectors.
    fn add(&mut self, vectors: &[f32], ids: Option<&[u64]>) -> CoreResult<Range<usize>> {
        let count = self.storage.rows_in(vectors.len())?;
        let total = self.storage.len() + count;
        if total > u32::MAX as usize {
            return Err(CoreError::InvalidArgument(format!(
                "graph index holds at most {} vectors, got {}",
                u32::MAX,
                total
            )));
        }

        let range = self.storage.append(vectors, ids)?;
        self.graph.reserve(range.len());
        for idx in range.clone() {
            self.dropped_back_edges += builder::insert_node(
                &mut self.graph,
                &self.storage,
                self.kernel,
                self.metric,
                idx,
            );
        }
        Ok(range)
    }

    fn search(&self, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>> {
        self.search_with_ef(query, k, self.config.ef_search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use vectorcore_core::SENTINEL_ID;

    fn generate_random_vectors(n: usize, dim: usize, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n * dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    fn test_basic_search() {
        let vectors = generate_random_vectors(100, 16, 42);
        let mut index = GraphIndex::with_m(16, Metric::L2Squared, 8).unwrap();
        index.add(&vectors, None).unwrap();

        let results = index.search(&vectors[..16], 5).unwrap();

        assert_eq!(results.len(), 5);
        // The query is stored, so it is its own nearest neighbor
        assert_eq!(results[0].id, 0);
        assert!(results[0].score < 1e-6);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            GraphIndex::with_m(0, Metric::L2Squared, 4).unwrap_err(),
            HnswError::Core(CoreError::ZeroDimension)
        );
        assert!(matches!(
            GraphIndex::with_m(4, Metric::L2Squared, 0),
            Err(HnswError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_empty_index_pads() {
        let index = GraphIndex::with_m(2, Metric::InnerProduct, 4).unwrap();
        let results = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|n| n.id == SENTINEL_ID && n.score == f32::NEG_INFINITY));
    }

    #[test]
    fn test_k_larger_than_budget_pads() {
        let vectors = generate_random_vectors(10, 4, 3);
        let mut index = GraphIndex::with_m(4, Metric::L2Squared, 4).unwrap();
        index.add(&vectors, None).unwrap();

        let results = index.search_with_ef(&vectors[..4], 6, 2).unwrap();
        assert_eq!(results.len(), 6);
        assert!(results[..2].iter().all(|n| !n.is_padding()));
        assert!(results[2..].iter().all(Neighbor::is_padding));
    }

    #[test]
    fn test_search_argument_errors() {
        let mut index = GraphIndex::with_m(3, Metric::L2Squared, 4).unwrap();
        index.add(&[0.0, 0.0, 0.0], None).unwrap();

        assert!(matches!(
            index.search(&[0.0, 0.0], 1),
            Err(CoreError::DimensionMismatch { expected: 3, got: 2 })
        ));
        assert!(matches!(
            index.search_with_ef(&[0.0, 0.0, 0.0], 1, 0),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(index.search(&[0.0, 0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_failed_add_leaves_index_unchanged() {
        let mut index = GraphIndex::with_m(2, Metric::L2Squared, 4).unwrap();
        index.add(&[0.0, 0.0], None).unwrap();

        assert!(index.add(&[1.0, 1.0, 2.0], None).is_err());
        assert!(index.add(&[1.0, 1.0], Some(&[1, 2])).is_err());
        assert_eq!(index.len(), 1);
        assert_eq!(index.graph().len(), 1);
    }

    #[test]
    fn test_neighbors_and_stats() {
        let vectors = generate_random_vectors(40, 8, 11);
        let mut index = GraphIndex::with_m(8, Metric::L2Squared, 4).unwrap();
        index.add(&vectors[..160], None).unwrap();
        index.add(&vectors[160..], None).unwrap();

        assert!(index.neighbors(0).unwrap().len() <= 4);
        assert_eq!(index.neighbors(1).unwrap()[0], 0);
        assert!(matches!(
            index.neighbors(40),
            Err(CoreError::OutOfBounds { index: 40, len: 40 })
        ));

        let stats = index.stats();
        assert_eq!(stats.num_nodes, 40);
        assert!(stats.max_degree <= 4);
        assert_eq!(stats.isolated_nodes, 0);
        assert!(index.dropped_back_edges() > 0);
    }

    #[test]
    fn test_external_ids_returned() {
        let mut index = GraphIndex::with_m(2, Metric::L2Squared, 4).unwrap();
        index
            .add(&[0.0, 0.0, 5.0, 5.0, 9.0, 9.0], Some(&[70, 80, 90]))
            .unwrap();

        let results = index.search(&[5.0, 5.1], 1).unwrap();
        assert_eq!(results[0].id, 80);
    }
}
