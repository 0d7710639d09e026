//! # Powchain
//!
//! Append-only chains of hash-linked records admitted by proof-of-work.
//!
//! ## Overview
//!
//! - **Record**: sequence number, timestamp, payload, predecessor digest,
//!   nonce and flags, committed to by a BLAKE3 digest over a fixed,
//!   length-prefixed encoding.
//! - **Factory**: builds the anchor record directly and mines successors
//!   until their digest has the required leading zero bits.
//! - **Validation**: checks every adjacent pair for linkage and digest
//!   integrity, sequentially or on a bounded worker pool.
//! - **Persistence**: whole chains as hex-encoded JSON.
//!
//! ## Usage
//!
//! ```rust
//! use powchain::{Chain, ChainConfig};
//!
//! let mut chain = Chain::new("Genesis", ChainConfig::with_difficulty(4)).unwrap();
//! chain.append("Block 1").unwrap();
//! chain.append("Block 2").unwrap();
//! assert!(chain.validate());
//! assert!(chain.validate_concurrent(2));
//! ```
//!
//! ## Re-exports
//!
//! - `powchain::core` - records, codec, hasher, miner
//! - `powchain::validation` - validators, policy, faults

pub mod chain;
pub mod config;
pub mod error;
pub mod factory;
pub mod persist;

pub use powchain_core as core;
pub use powchain_validate as validation;

pub use chain::Chain;
pub use config::{ChainConfig, DEFAULT_DIFFICULTY};
pub use error::{ChainError, Result};
pub use factory::{system_clock, Clock, RecordFactory};
pub use persist::{read_chain_json, write_chain_json, RecordDocument};

pub use powchain_core::{
    CancelToken, Digest, HasherConfig, Miner, MiningReport, Record, RecordBuilder, RecordFlags,
    RecordHasher,
};
pub use powchain_validate::{
    validate, validate_concurrent, verify_chain, ChainFault, ChainValidator, ConcurrentConfig,
    FaultKind, ValidationError, ValidationPolicy,
};
