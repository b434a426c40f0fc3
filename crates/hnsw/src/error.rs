//! Graph index error types.

use thiserror::Error;
use vectorcore_core::CoreError;

/// Graph-index errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HnswError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type HnswResult<T> = Result<T, HnswError>;
