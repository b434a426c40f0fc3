//! Similarity metric definitions.

use crate::distance::{self, Kernel};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Scoring function fixed for the lifetime of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Euclidean distance - lower is more similar
    #[serde(alias = "l2")]
    L2Squared,
    /// Inner product - higher is more similar
    #[serde(alias = "ip")]
    InnerProduct,
}

impl Metric {
    /// Whether a larger native score means a closer match.
    #[inline]
    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::InnerProduct)
    }

    /// Map a native score onto the shared minimization key.
    ///
    /// Selection code only ever minimizes badness, so one heap layout serves
    /// both metrics.
    #[inline]
    pub fn badness(self, score: f32) -> f32 {
        match self {
            Metric::L2Squared => score,
            Metric::InnerProduct => -score,
        }
    }

    /// Inverse of [`Metric::badness`].
    #[inline]
    pub fn score_from_badness(self, badness: f32) -> f32 {
        match self {
            Metric::L2Squared => badness,
            Metric::InnerProduct => -badness,
        }
    }

    /// Score carried by padding entries: the worst value the metric can produce.
    #[inline]
    pub fn worst_score(self) -> f32 {
        match self {
            Metric::L2Squared => f32::INFINITY,
            Metric::InnerProduct => f32::NEG_INFINITY,
        }
    }

    /// Resolve the distance kernel for this metric.
    ///
    /// Indexes call this once at construction and keep the function pointer,
    /// so the per-pair hot loop never branches on the metric.
    pub fn kernel(self) -> Kernel {
        match self {
            Metric::L2Squared => distance::l2_squared,
            Metric::InnerProduct => distance::inner_product,
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::L2Squared
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::L2Squared => write!(f, "l2_squared"),
            Metric::InnerProduct => write!(f, "inner_product"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" | "l2_squared" | "euclidean" => Ok(Metric::L2Squared),
            "ip" | "inner_product" | "dot" => Ok(Metric::InnerProduct),
            _ => Err(CoreError::InvalidArgument(format!("Unknown metric: {}", s))),
        }
    }
}
