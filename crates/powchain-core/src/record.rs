//! Record: one hash-linked unit of a chain.
//!
//! A record commits to its predecessor through `predecessor_digest` and to
//! its own content through `digest`. Once sealed it is treated as immutable;
//! only the miner moves `nonce` (and with it `digest`) during creation.

use bytes::Bytes;

use crate::error::CoreError;
use crate::hasher::{digest_streaming, RecordHasher};
use crate::types::Digest;

/// The version tag written as the first byte of every encoded record.
pub const RECORD_VERSION: u8 = 0x01;

/// Flag bits carried in the second byte of the encoding.
///
/// Bit 0 marks the chain anchor. The remaining bits are reserved and must
/// be zero, so a `RecordFlags` value can only hold known bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordFlags(u8);

impl RecordFlags {
    /// No flags set.
    pub const NONE: Self = Self(0x00);

    /// The record anchors a chain (sequence number 0, empty predecessor).
    pub const GENESIS: Self = Self(0x01);

    const KNOWN_BITS: u8 = 0x01;

    /// Parse flag bits, rejecting reserved bits.
    pub fn from_bits(bits: u8) -> Result<Self, CoreError> {
        if bits & !Self::KNOWN_BITS != 0 {
            return Err(CoreError::ReservedFlags(bits));
        }
        Ok(Self(bits))
    }

    /// The raw flag byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the genesis bit is set.
    pub const fn is_genesis(self) -> bool {
        self.contains(Self::GENESIS)
    }
}

/// A chained record.
///
/// `Record::default()` is the all-zero record: sequence 0, timestamp 0,
/// empty fields, no flags. It differs in encoding from a genesis record
/// with an empty payload because the flag byte differs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Position in the chain, starting at 0.
    pub sequence_number: u64,

    /// Creation time in seconds since the Unix epoch.
    pub created_at: i64,

    /// Arbitrary payload bytes.
    pub payload: Bytes,

    /// Digest of the preceding record (empty for the first record).
    pub predecessor_digest: Bytes,

    /// Digest over this record's encoding, once sealed.
    pub digest: Digest,

    /// Proof-of-work search variable.
    pub nonce: u64,

    /// Encoded flag bits.
    pub flags: RecordFlags,
}

impl Record {
    /// Create an unsealed record with nonce 0 and no flags.
    pub fn new(
        sequence_number: u64,
        created_at: i64,
        payload: impl Into<Bytes>,
        predecessor_digest: impl Into<Bytes>,
    ) -> Self {
        Self {
            sequence_number,
            created_at,
            payload: payload.into(),
            predecessor_digest: predecessor_digest.into(),
            digest: Digest::ZERO,
            nonce: 0,
            flags: RecordFlags::NONE,
        }
    }

    /// Recompute the digest from the current field values.
    ///
    /// Uses the streaming path, so no pool is needed.
    pub fn compute_digest(&self) -> Result<Digest, CoreError> {
        digest_streaming(self)
    }

    /// Whether the stored digest matches the current field values.
    pub fn is_self_consistent(&self) -> bool {
        matches!(self.compute_digest(), Ok(d) if d == self.digest)
    }

    /// Whether this record's predecessor link names `prev`'s stored digest.
    pub fn links_to(&self, prev: &Record) -> bool {
        self.predecessor_digest.as_ref() == prev.digest.as_bytes()
    }

    /// Whether this record carries the genesis flag.
    pub fn is_genesis(&self) -> bool {
        self.flags.is_genesis()
    }
}

/// Builder for creating records.
pub struct RecordBuilder {
    sequence_number: u64,
    created_at: i64,
    payload: Bytes,
    predecessor_digest: Bytes,
    nonce: u64,
    flags: RecordFlags,
}

impl RecordBuilder {
    /// Start building a record at the given sequence number.
    pub fn new(sequence_number: u64) -> Self {
        Self {
            sequence_number,
            created_at: 0,
            payload: Bytes::new(),
            predecessor_digest: Bytes::new(),
            nonce: 0,
            flags: RecordFlags::NONE,
        }
    }

    /// Start building a genesis record.
    pub fn genesis() -> Self {
        Self::new(0).flags(RecordFlags::GENESIS)
    }

    /// Start building the successor of `prev`.
    ///
    /// The sequence number wraps to 0 after `u64::MAX`. Such a successor
    /// never passes the sequence check, and `RecordFactory` refuses to build
    /// it; callers that need the overflow as an error use
    /// `prev.sequence_number.checked_add(1)` with [`RecordBuilder::new`].
    pub fn after(prev: &Record) -> Self {
        Self::new(prev.sequence_number.wrapping_add(1))
            .predecessor(Bytes::copy_from_slice(prev.digest.as_bytes()))
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.created_at = ts;
        self
    }

    /// Set the payload.
    pub fn payload(mut self, p: impl Into<Bytes>) -> Self {
        self.payload = p.into();
        self
    }

    /// Set the predecessor digest bytes.
    pub fn predecessor(mut self, prev: impl Into<Bytes>) -> Self {
        self.predecessor_digest = prev.into();
        self
    }

    /// Set the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the flags.
    pub fn flags(mut self, flags: RecordFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Build an unsealed record (digest left zero).
    pub fn build(self) -> Record {
        Record {
            sequence_number: self.sequence_number,
            created_at: self.created_at,
            payload: self.payload,
            predecessor_digest: self.predecessor_digest,
            digest: Digest::ZERO,
            nonce: self.nonce,
            flags: self.flags,
        }
    }

    /// Build the record and store its digest at the current nonce.
    pub fn seal(self, hasher: &RecordHasher) -> Result<Record, CoreError> {
        let mut record = self.build();
        record.digest = hasher.digest(&record)?;
        Ok(record)
    }
}
