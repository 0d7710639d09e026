//! Error types for chain operations.

use powchain_core::{CoreError, MineError};
use powchain_validate::ValidationError;
use thiserror::Error;

/// Errors that can occur while building, checking or persisting a chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Record encoding error.
    #[error("codec error: {0}")]
    Codec(#[from] CoreError),

    /// Mining failed or was cancelled.
    #[error("mining error: {0}")]
    Mine(#[from] MineError),

    /// The chain did not validate.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The predecessor already holds the largest sequence number.
    #[error("no sequence number follows {0}")]
    SequenceExhausted(u64),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document field could not be converted back into a record.
    #[error("invalid field {field} in record {index}: {reason}")]
    InvalidDocument {
        index: u64,
        field: &'static str,
        reason: String,
    },
}

impl ChainError {
    /// Whether the operation stopped because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        match self {
            ChainError::Mine(err) => err.is_cancelled(),
            ChainError::Validation(err) => err.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
