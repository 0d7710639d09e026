//! Test fixtures and helpers.
//!
//! Deterministic chain builders: every record gets a fixed timestamp derived
//! from its sequence number, so the same call always yields the same chain.

use std::sync::Arc;

use bytes::Bytes;
use powchain_core::{Digest, Miner, Record, RecordBuilder, RecordHasher};

/// Timestamp of the anchor record in fixture chains.
pub const BASE_TIME: i64 = 1_700_000_000;

/// A shared hasher and miner for building chains in tests.
pub struct ChainFixture {
    pub hasher: Arc<RecordHasher>,
    pub miner: Miner,
    pub base_time: i64,
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainFixture {
    /// Create a fixture with default hasher settings.
    pub fn new() -> Self {
        Self::with_hasher(RecordHasher::default())
    }

    /// Create a fixture around a specific hasher, e.g. one with a low
    /// streaming threshold.
    pub fn with_hasher(hasher: RecordHasher) -> Self {
        Self {
            hasher: Arc::new(hasher),
            miner: Miner::default(),
            base_time: BASE_TIME,
        }
    }

    /// The anchor record carrying `payload`.
    pub fn anchor(&self, payload: impl Into<Bytes>) -> Record {
        RecordBuilder::genesis()
            .timestamp(self.base_time)
            .payload(payload)
            .seal(&self.hasher)
            .expect("fixture payloads fit a length prefix")
    }

    /// Mine the successor of `prev` at `difficulty` bits.
    pub fn successor(&self, prev: &Record, payload: impl Into<Bytes>, difficulty: u32) -> Record {
        let sequence_number = prev.sequence_number + 1;
        let mut record = RecordBuilder::after(prev)
            .timestamp(self.base_time + sequence_number as i64)
            .payload(payload)
            .build();
        self.miner
            .mine(&self.hasher, &mut record, difficulty)
            .expect("fixture mining succeeds");
        record
    }

    /// Anchor plus successors carrying `payloads`, mined at `difficulty`.
    pub fn chain_with_payloads<P>(&self, payloads: &[P], difficulty: u32) -> Vec<Record>
    where
        P: AsRef<[u8]>,
    {
        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let bytes = Bytes::copy_from_slice(payload.as_ref());
            let record = match records.last() {
                None => self.anchor(bytes),
                Some(prev) => self.successor(prev, bytes, difficulty),
            };
            records.push(record);
        }
        records
    }

    /// A chain of `len` records (`"Genesis"`, `"Block 1"`, ...) mined at
    /// `difficulty`.
    pub fn mined_chain(&self, len: usize, difficulty: u32) -> Vec<Record> {
        self.chain_with_payloads(&block_payloads(len), difficulty)
    }

    /// A linked, self-consistent chain with no proof-of-work, cheap enough
    /// to build with many thousands of records.
    pub fn unmined_chain(&self, len: usize) -> Vec<Record> {
        self.mined_chain(len, 0)
    }
}

/// Payloads `"Genesis"`, `"Block 1"`, ... `"Block {len - 1}"`.
pub fn block_payloads(len: usize) -> Vec<String> {
    (0..len)
        .map(|i| match i {
            0 => "Genesis".to_string(),
            i => format!("Block {i}"),
        })
        .collect()
}

/// A single-field edit made without re-mining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    Payload,
    Timestamp,
    Nonce,
    PredecessorDigest,
    Digest,
    SequenceNumber,
}

impl Tamper {
    /// Every kind of edit.
    pub const ALL: [Tamper; 6] = [
        Tamper::Payload,
        Tamper::Timestamp,
        Tamper::Nonce,
        Tamper::PredecessorDigest,
        Tamper::Digest,
        Tamper::SequenceNumber,
    ];

    /// Apply the edit. The result always differs from the input.
    pub fn apply(self, record: &mut Record) {
        match self {
            Tamper::Payload => {
                let mut payload = record.payload.to_vec();
                payload.push(0x00);
                record.payload = Bytes::from(payload);
            }
            Tamper::Timestamp => record.created_at = record.created_at.wrapping_add(1),
            Tamper::Nonce => record.nonce = record.nonce.wrapping_add(1),
            Tamper::PredecessorDigest => {
                let mut prev = record.predecessor_digest.to_vec();
                match prev.first_mut() {
                    Some(byte) => *byte ^= 0x01,
                    None => prev.push(0x01),
                }
                record.predecessor_digest = Bytes::from(prev);
            }
            Tamper::Digest => {
                let mut bytes = *record.digest.as_bytes();
                bytes[31] ^= 0x01;
                record.digest = Digest::from_bytes(bytes);
            }
            Tamper::SequenceNumber => {
                record.sequence_number = record.sequence_number.wrapping_add(1)
            }
        }
    }
}
