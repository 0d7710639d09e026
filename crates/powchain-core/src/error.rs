//! Error types for Powchain Core.

use thiserror::Error;

/// Errors raised while encoding or decoding a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unsupported record version: {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("reserved flag bits set: {0:#010b}")]
    ReservedFlags(u8),

    #[error("truncated {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("{field} is {len} bytes, longer than a 32-bit length prefix allows")]
    FieldTooLarge { field: &'static str, len: usize },
}

/// Errors raised by the proof-of-work search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MineError {
    #[error("invalid difficulty {requested}: must be between 0 and {max} bits")]
    InvalidDifficulty { requested: u32, max: u32 },

    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce space exhausted without meeting difficulty {difficulty}")]
    NonceSpaceExhausted { difficulty: u32 },

    #[error("record cannot be encoded: {0}")]
    Codec(#[from] CoreError),
}

impl MineError {
    /// Whether the search stopped because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MineError::Cancelled { .. })
    }
}
