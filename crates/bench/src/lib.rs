//! Benchmark utilities for vectorcore.

use rand::prelude::*;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use vectorcore_core::{Metric, Neighbor};
use vectorcore_hnsw::{DEFAULT_EF_SEARCH, DEFAULT_M};

/// Row-major block of `count` standard-normal vectors, reproducible from `seed`.
pub fn random_vectors(count: usize, dim: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count * dim)
        .map(|_| rng.sample::<f32, _>(StandardNormal))
        .collect()
}

/// Fraction of the real hits in `truth` that also appear in `approx`.
///
/// Padding entries never count. An empty ground truth yields 1.0.
pub fn recall(approx: &[Neighbor], truth: &[Neighbor]) -> f64 {
    let expected: HashSet<u64> = truth
        .iter()
        .filter(|n| !n.is_padding())
        .map(|n| n.id)
        .collect();
    if expected.is_empty() {
        return 1.0;
    }

    let found = approx
        .iter()
        .filter(|n| !n.is_padding() && expected.contains(&n.id))
        .count();
    found as f64 / expected.len() as f64
}

/// Latency percentiles in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencyStats {
    pub fn from_durations(latencies: &[Duration]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let mut sorted = latencies.to_vec();
        sorted.sort();
        let n = sorted.len();
        let at = |q: f64| sorted[((n as f64 * q) as usize).min(n - 1)].as_secs_f64() * 1000.0;
        let total: Duration = sorted.iter().sum();

        Self {
            mean_ms: total.as_secs_f64() * 1000.0 / n as f64,
            p50_ms: at(0.50),
            p95_ms: at(0.95),
            p99_ms: at(0.99),
        }
    }
}

/// Benchmark parameters, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub num_vectors: usize,
    pub dim: usize,
    pub num_queries: usize,
    pub top_k: usize,
    pub metric: Metric,
    pub m: usize,
    pub ef_values: Vec<usize>,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_vectors: 5_000,
            dim: 64,
            num_queries: 100,
            top_k: 10,
            metric: Metric::L2Squared,
            m: DEFAULT_M,
            ef_values: vec![16, 32, DEFAULT_EF_SEARCH, 128],
            seed: 42,
        }
    }
}

/// Parse a comma-separated list such as `"16,32,64"`.
pub fn parse_usize_list(input: &str) -> Result<Vec<usize>, std::num::ParseIntError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
