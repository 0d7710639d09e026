//! JSON persistence of whole chains.
//!
//! Byte fields are hex-encoded. Digests are stored as found and restored
//! verbatim, never recomputed, so a tampered file still reads back and then
//! fails validation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bytes::Bytes;
use powchain_core::{Digest, Record, RecordFlags};
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// One record as it appears in a chain file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub index: u64,
    pub timestamp: i64,
    /// Hex-encoded payload.
    pub payload: String,
    /// Hex-encoded predecessor digest, empty for the first record.
    pub prev_hash: String,
    /// Hex-encoded digest.
    pub hash: String,
    pub nonce: u64,
    #[serde(default)]
    pub flags: u8,
}

impl From<&Record> for RecordDocument {
    fn from(record: &Record) -> Self {
        Self {
            index: record.sequence_number,
            timestamp: record.created_at,
            payload: hex::encode(&record.payload),
            prev_hash: hex::encode(&record.predecessor_digest),
            hash: record.digest.to_hex(),
            nonce: record.nonce,
            flags: record.flags.bits(),
        }
    }
}

impl TryFrom<RecordDocument> for Record {
    type Error = ChainError;

    fn try_from(doc: RecordDocument) -> Result<Self> {
        let index = doc.index;
        let invalid = |field: &'static str, reason: String| ChainError::InvalidDocument {
            index,
            field,
            reason,
        };

        let payload = hex::decode(&doc.payload)
            .map_err(|e| invalid("payload", e.to_string()))?;
        let prev = hex::decode(&doc.prev_hash)
            .map_err(|e| invalid("prev_hash", e.to_string()))?;
        let digest = Digest::from_hex(&doc.hash)
            .map_err(|e| invalid("hash", e.to_string()))?;
        let flags = RecordFlags::from_bits(doc.flags)
            .map_err(|e| invalid("flags", e.to_string()))?;

        Ok(Record {
            sequence_number: doc.index,
            created_at: doc.timestamp,
            payload: Bytes::from(payload),
            predecessor_digest: Bytes::from(prev),
            digest,
            nonce: doc.nonce,
            flags,
        })
    }
}

/// Write `records` to `path` as pretty-printed JSON, replacing any existing
/// file.
pub fn write_chain_json(records: &[Record], path: impl AsRef<Path>) -> Result<()> {
    let docs: Vec<RecordDocument> = records.iter().map(RecordDocument::from).collect();
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, &docs)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::debug!(records = records.len(), path = %path.as_ref().display(), "chain written");
    Ok(())
}

/// Read a chain previously written by [`write_chain_json`].
pub fn read_chain_json(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let docs: Vec<RecordDocument> = serde_json::from_reader(reader)?;
    docs.into_iter().map(Record::try_from).collect()
}
