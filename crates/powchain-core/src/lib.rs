//! # Powchain Core
//!
//! Pure primitives for powchain: hash-linked records, their canonical
//! encoding, digest computation and the proof-of-work search.
//!
//! This crate contains no I/O and spawns no threads. Everything here is
//! deterministic computation over record fields, plus a cooperative
//! cancellation token polled by the miner.
//!
//! ## Key Types
//!
//! - [`Record`] - One chained unit: sequence number, timestamp, payload, link
//! - [`Digest`] - 32-byte BLAKE3 digest of a record's canonical encoding
//! - [`RecordHasher`] - Buffered and streaming digest paths over a buffer pool
//! - [`Miner`] - Nonce search until a digest meets a difficulty
//! - [`CancelToken`] - Explicit stop flag with an optional deadline
//!
//! ## Encoding
//!
//! Records are encoded with fixed-width little-endian integers and
//! length-prefixed byte fields. See the [`codec`] module.

pub mod cancel;
pub mod codec;
pub mod difficulty;
pub mod error;
pub mod hasher;
pub mod pool;
pub mod pow;
pub mod record;
pub mod types;

pub use cancel::CancelToken;
pub use codec::{decode, encoded_len, serialize};
pub use difficulty::{leading_zero_bits, meets_difficulty, Difficulty, MAX_DIFFICULTY};
pub use error::{CoreError, MineError};
pub use hasher::{digest_streaming, HashPath, HasherConfig, MiningTemplate, RecordHasher};
pub use pool::{BufferPool, PooledBuffer};
pub use pow::{Miner, MiningReport, DEFAULT_POLL_INTERVAL};
pub use record::{Record, RecordBuilder, RecordFlags, RECORD_VERSION};
pub use types::{Digest, DIGEST_LEN};
