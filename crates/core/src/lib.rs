//! Core building blocks for the vectorcore search engine.
//!
//! - [`FlatStorage`]: one contiguous buffer holding every vector back-to-back
//! - [`distance`]: squared-L2 and inner-product kernels (scalar and AVX2)
//! - [`TopK`]: bounded online selection of the best `k` candidates
//! - [`VectorIndex`]: the query surface shared by the exact and graph indexes

pub mod distance;
pub mod error;
pub mod index;
pub mod metric;
pub mod storage;
pub mod topk;
pub mod types;

pub use distance::{inner_product, l2_squared, Kernel};
pub use error::{CoreError, CoreResult};
pub use index::VectorIndex;
pub use metric::Metric;
pub use storage::FlatStorage;
pub use topk::{Scored, TopK};
pub use types::{Neighbor, SearchBatch, SENTINEL_ID};
