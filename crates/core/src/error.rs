//! Core error types.

use thiserror::Error;

/// Errors raised by storage, kernels and index operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid dimension: dim must be > 0")]
    ZeroDimension,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Buffer length {len} is not a multiple of dim {dim}")]
    BufferLength { len: usize, dim: usize },

    #[error("Index out of bounds: {index} >= {len}")]
    OutOfBounds { index: usize, len: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
