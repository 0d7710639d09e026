//! Error types for chain validation.

use powchain_core::CoreError;
use thiserror::Error;

/// Why a pair failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaultKind {
    #[error("sequence number {found} does not follow {previous}")]
    SequenceGap { previous: u64, found: u64 },

    #[error("predecessor digest does not match the preceding record")]
    BrokenLink,

    #[error("stored digest does not match the record contents")]
    DigestMismatch,

    #[error("digest has {found} leading zero bits, {required} required")]
    InsufficientWork { required: u32, found: u32 },

    #[error("record cannot be encoded: {0}")]
    Unencodable(CoreError),
}

/// The record at which validation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("record {sequence_number} at position {position}: {kind}")]
pub struct ChainFault {
    /// Index of the offending record within the chain.
    pub position: usize,
    /// Its claimed sequence number.
    pub sequence_number: u64,
    /// What was wrong.
    pub kind: FaultKind,
}

/// Outcome of a validation that did not accept the chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chain invalid: {0}")]
    Fault(#[from] ChainFault),

    #[error("validation cancelled after {checked} of {total} pairs")]
    Cancelled { checked: usize, total: usize },
}

impl ValidationError {
    /// The fault, if the chain was shown invalid.
    pub fn fault(&self) -> Option<&ChainFault> {
        match self {
            ValidationError::Fault(fault) => Some(fault),
            ValidationError::Cancelled { .. } => None,
        }
    }

    /// Whether validation stopped because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ValidationError::Cancelled { .. })
    }
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
