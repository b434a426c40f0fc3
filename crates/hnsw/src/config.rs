//! Graph index configuration.

use crate::error::{HnswError, HnswResult};
use serde::{Deserialize, Serialize};

/// Default maximum out-degree per node.
pub const DEFAULT_M: usize = 16;

/// Default exploration budget for search.
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Parameters for graph construction and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of neighbors per node.
    /// New nodes link to their `min(m, n)` nearest predecessors; back-edges
    /// that would push a node past `m` are dropped.
    pub m: usize,

    /// Number of candidates retained during search before expansion stops.
    /// Capped at the collection size per query.
    pub ef_search: usize,
}

impl GraphConfig {
    /// Create a config with the given `m` and the default budget.
    pub fn new(m: usize) -> Self {
        Self {
            m,
            ef_search: DEFAULT_EF_SEARCH,
        }
    }

    /// Set ef_search.
    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> HnswResult<()> {
        if self.m == 0 {
            return Err(HnswError::InvalidParams("M must be > 0".into()));
        }
        if self.ef_search == 0 {
            return Err(HnswError::InvalidParams("ef_search must be > 0".into()));
        }
        Ok(())
    }

    /// Budget actually used for a collection of `len` vectors.
    pub fn effective_ef(&self, len: usize) -> usize {
        self.ef_search.min(len)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::new(DEFAULT_M)
    }
}
