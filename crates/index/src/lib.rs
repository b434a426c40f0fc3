//! Exact (brute-force) nearest-neighbor search for vectorcore.
//!
//! [`FlatIndex`] scores every stored vector against the query and keeps the
//! best `k` with a bounded heap: O(N·dim) per query, exact results.

pub mod flat;

pub use flat::{brute_force_search, FlatIndex};
