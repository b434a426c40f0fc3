//! Recall benchmark tool for vectorcore.
//!
//! Builds an exact and a graph index over the same seeded Gaussian dataset,
//! takes the exact results as ground truth, and measures recall@K and
//! latency of graph search at several exploration budgets.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vectorcore_bench::{parse_usize_list, random_vectors, recall, BenchConfig, LatencyStats};
use vectorcore_core::{distance, Metric, Neighbor, VectorIndex};
use vectorcore_hnsw::{GraphIndexBuilder, GraphStats};
use vectorcore_index::FlatIndex;

/// Benchmark recall@K of graph search against exact search.
#[derive(Parser, Debug)]
#[command(name = "recall-bench")]
#[command(about = "Benchmark recall@K of graph search vs brute-force ground truth")]
struct Args {
    /// JSON file with benchmark parameters. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of vectors to index.
    #[arg(long)]
    num_vectors: Option<usize>,

    /// Vector dimension.
    #[arg(long)]
    dim: Option<usize>,

    /// Number of query vectors.
    #[arg(long)]
    num_queries: Option<usize>,

    /// Number of results per query (K in recall@K).
    #[arg(long)]
    top_k: Option<usize>,

    /// Metric: l2 or ip.
    #[arg(long)]
    metric: Option<Metric>,

    /// Maximum neighbors per graph node.
    #[arg(long)]
    m: Option<usize>,

    /// Comma-separated exploration budgets to test.
    #[arg(long)]
    ef: Option<String>,

    /// Random seed for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Results for one exploration budget.
#[derive(Debug, Serialize)]
struct EfResult {
    ef: usize,
    mean_recall: f64,
    #[serde(flatten)]
    latency: LatencyStats,
    qps: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    config: BenchConfig,
    kernel: &'static str,
    flat_build_ms: f64,
    graph_build_ms: f64,
    ground_truth_ms: f64,
    graph_edges: usize,
    graph_avg_degree: f64,
    graph_saturated_nodes: usize,
    dropped_back_edges: usize,
    results: Vec<EfResult>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    if config.num_vectors == 0 || config.num_queries == 0 {
        anyhow::bail!("num_vectors and num_queries must be > 0");
    }
    if config.ef_values.is_empty() {
        anyhow::bail!("No valid ef values provided");
    }

    tracing::info!("Starting recall benchmark");
    tracing::info!("  Vectors: {} x {}", config.num_vectors, config.dim);
    tracing::info!("  Queries: {}", config.num_queries);
    tracing::info!("  Top-K: {}", config.top_k);
    tracing::info!("  Metric: {}", config.metric);
    tracing::info!("  M: {}", config.m);
    tracing::info!("  ef values: {:?}", config.ef_values);
    tracing::info!("  Seed: {}", config.seed);
    tracing::info!("  Kernel: {}", distance::active_kernel());

    let dataset = random_vectors(config.num_vectors, config.dim, config.seed);
    let queries = random_vectors(config.num_queries, config.dim, config.seed.wrapping_add(1));

    tracing::info!("Building exact index...");
    let start = Instant::now();
    let mut flat = FlatIndex::with_capacity(config.dim, config.metric, config.num_vectors)?;
    flat.add(&dataset, None)?;
    let flat_build_ms = ms(start.elapsed());

    tracing::info!("Building graph index...");
    let start = Instant::now();
    let graph = GraphIndexBuilder::new(config.dim)
        .metric(config.metric)
        .m(config.m)
        .capacity(config.num_vectors)
        .build_from(&dataset, None)?;
    let graph_build_ms = ms(start.elapsed());

    let stats = graph.stats();
    log_graph_stats(&stats, graph.dropped_back_edges());
    tracing::info!(
        "Build times: exact {:.1}ms, graph {:.1}ms",
        flat_build_ms,
        graph_build_ms
    );

    tracing::info!("Computing ground truth (brute-force search)...");
    let start = Instant::now();
    let ground_truth: Vec<Vec<Neighbor>> = queries
        .chunks_exact(config.dim)
        .map(|q| flat.search(q, config.top_k))
        .collect::<Result<_, _>>()?;
    let ground_truth_ms = ms(start.elapsed());
    tracing::info!("Ground truth computed for {} queries", ground_truth.len());

    let mut results = Vec::with_capacity(config.ef_values.len());
    for &ef in &config.ef_values {
        tracing::info!("Benchmarking with ef={}", ef);
        if ef < config.top_k {
            tracing::warn!("ef={} is below top_k={}; tail slots will be padding", ef, config.top_k);
        }

        let mut latencies = Vec::with_capacity(ground_truth.len());
        let mut recalls = Vec::with_capacity(ground_truth.len());
        let total_start = Instant::now();

        for (query, truth) in queries.chunks_exact(config.dim).zip(&ground_truth) {
            let start = Instant::now();
            let approx = graph.search_with_ef(query, config.top_k, ef)?;
            latencies.push(start.elapsed());
            recalls.push(recall(&approx, truth));
        }

        let total_elapsed = total_start.elapsed();
        let result = EfResult {
            ef,
            mean_recall: recalls.iter().sum::<f64>() / recalls.len() as f64,
            latency: LatencyStats::from_durations(&latencies),
            qps: recalls.len() as f64 / total_elapsed.as_secs_f64(),
        };

        tracing::info!(
            "  ef={}: recall={:.4}, p50={:.3}ms, p95={:.3}ms, qps={:.0}",
            result.ef,
            result.mean_recall,
            result.latency.p50_ms,
            result.latency.p95_ms,
            result.qps
        );
        results.push(result);
    }

    print_summary(&config, &results);

    if let Some(path) = &args.output {
        let report = Report {
            config,
            kernel: distance::active_kernel(),
            flat_build_ms,
            graph_build_ms,
            ground_truth_ms,
            graph_edges: stats.total_edges,
            graph_avg_degree: stats.avg_degree,
            graph_saturated_nodes: stats.saturated_nodes,
            dropped_back_edges: graph.dropped_back_edges(),
            results,
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Results written to {:?}", path);
    }

    Ok(())
}

/// Start from the JSON file (if any) and apply explicit flags on top.
fn resolve_config(args: &Args) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => BenchConfig::default(),
    };

    if let Some(v) = args.num_vectors {
        config.num_vectors = v;
    }
    if let Some(v) = args.dim {
        config.dim = v;
    }
    if let Some(v) = args.num_queries {
        config.num_queries = v;
    }
    if let Some(v) = args.top_k {
        config.top_k = v;
    }
    if let Some(v) = args.metric {
        config.metric = v;
    }
    if let Some(v) = args.m {
        config.m = v;
    }
    if let Some(v) = &args.ef {
        config.ef_values = parse_usize_list(v).context("invalid --ef list")?;
    }
    if let Some(v) = args.seed {
        config.seed = v;
    }

    tracing::debug!("Resolved config: {:?}", config);
    Ok(config)
}

fn log_graph_stats(stats: &GraphStats, dropped: usize) {
    tracing::info!("Graph stats:");
    tracing::info!("  Nodes: {}", stats.num_nodes);
    tracing::info!("  Edges: {}", stats.total_edges);
    tracing::info!("  Avg degree: {:.2}", stats.avg_degree);
    tracing::info!("  Max degree: {}", stats.max_degree);
    tracing::info!("  Saturated nodes: {}", stats.saturated_nodes);
    tracing::info!("  Isolated nodes: {}", stats.isolated_nodes);
    tracing::info!("  Dropped back-edges: {}", dropped);
}

fn print_summary(config: &BenchConfig, results: &[EfResult]) {
    println!("\n{}", "=".repeat(80));
    println!("RECALL BENCHMARK RESULTS");
    println!("{}", "=".repeat(80));
    println!(
        "{:>8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "ef", "top_k", "recall", "mean_ms", "p50_ms", "p95_ms", "p99_ms", "qps"
    );
    println!("{}", "-".repeat(80));

    for r in results {
        println!(
            "{:>8} {:>8} {:>10.4} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.0}",
            r.ef,
            config.top_k,
            r.mean_recall,
            r.latency.mean_ms,
            r.latency.p50_ms,
            r.latency.p95_ms,
            r.latency.p99_ms,
            r.qps
        );
    }

    println!("{}", "=".repeat(80));
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
