//! # Powchain Validate
//!
//! Chain validation: every adjacent pair `(prev, curr)` must satisfy
//!
//! 1. `curr.sequence_number == prev.sequence_number + 1` (policy, on by default)
//! 2. `curr.predecessor_digest == digest(prev)`
//! 3. `curr.digest == digest(curr)`
//! 4. optionally, `curr.digest` meets a minimum difficulty
//!
//! The first pair additionally checks the anchor record's own digest.
//!
//! Two forms share the pair check and always agree:
//!
//! - [`ChainValidator::verify`] walks pairs in order and stops at the first
//!   fault, hashing each record at most once through a per-run cache.
//! - [`ChainValidator::verify_concurrent`] fans pairs out over a bounded
//!   worker pool and reports the lowest-position fault. Short chains fall
//!   back to the sequential walk.

pub mod cache;
pub mod concurrent;
pub mod error;
mod pair;
pub mod policy;
pub mod sequential;
pub mod validator;

pub use cache::DigestCache;
pub use concurrent::{ConcurrentConfig, DEFAULT_SEQUENTIAL_BELOW};
pub use error::{ChainFault, FaultKind, ValidationError};
pub use policy::ValidationPolicy;
pub use validator::{validate, validate_concurrent, verify_chain, ChainValidator};
