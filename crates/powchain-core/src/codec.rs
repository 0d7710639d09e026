//! Canonical record encoding.
//!
//! The encoding is the digest pre-image, so it is frozen:
//!
//! | offset | width | field |
//! |---|---|---|
//! | 0 | 1 | version tag (`0x01`) |
//! | 1 | 1 | flag byte |
//! | 2 | 8 | `sequence_number`, u64 little-endian |
//! | 10 | 8 | `created_at`, i64 little-endian |
//! | 18 | 8 | `nonce`, u64 little-endian |
//! | 26 | 4 | payload length, u32 little-endian |
//! | 30 | n | payload |
//! | 30+n | 4 | predecessor digest length, u32 little-endian |
//! | 34+n | m | predecessor digest |
//!
//! Every variable-length field is preceded by its length, so field
//! boundaries never depend on field contents.

use bytes::Bytes;

use crate::error::CoreError;
use crate::record::{Record, RecordFlags, RECORD_VERSION};
use crate::types::Digest;

/// Length of the fixed-width header (version, flags, three integers).
pub const HEADER_LEN: usize = 1 + 1 + 8 + 8 + 8;

/// Byte offset of the nonce within the encoding.
pub const NONCE_OFFSET: usize = 18;

/// Width of a length prefix.
pub const LEN_PREFIX: usize = 4;

/// A destination for encoded bytes.
///
/// Implemented for in-memory buffers and for incremental hashers, so one
/// encoder feeds both digest paths.
pub trait ByteSink {
    /// Append bytes to the sink.
    fn put(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl ByteSink for blake3::Hasher {
    fn put(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

/// Encode a record into a fresh buffer.
pub fn serialize(record: &Record) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::with_capacity(encoded_len(record));
    encode_to(record, &mut buf)?;
    Ok(buf)
}

/// Exact length of a record's encoding.
pub fn encoded_len(record: &Record) -> usize {
    HEADER_LEN + LEN_PREFIX + record.payload.len() + LEN_PREFIX + record.predecessor_digest.len()
}

/// Encode a record into any sink.
///
/// Length prefixes are checked before anything is written, so a failing
/// record leaves the sink untouched.
pub fn encode_to<S: ByteSink>(record: &Record, sink: &mut S) -> Result<(), CoreError> {
    let payload_len = length_prefix("payload", record.payload.len())?;
    let prev_len = length_prefix("predecessor_digest", record.predecessor_digest.len())?;

    sink.put(&encode_header(record));
    sink.put(&payload_len);
    sink.put(&record.payload);
    sink.put(&prev_len);
    sink.put(&record.predecessor_digest);
    Ok(())
}

/// Encode the fixed-width header.
pub fn encode_header(record: &Record) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = RECORD_VERSION;
    header[1] = record.flags.bits();
    header[2..10].copy_from_slice(&record.sequence_number.to_le_bytes());
    header[10..18].copy_from_slice(&record.created_at.to_le_bytes());
    header[NONCE_OFFSET..HEADER_LEN].copy_from_slice(&record.nonce.to_le_bytes());
    header
}

/// Encode a length as a 4-byte little-endian prefix.
pub fn length_prefix(field: &'static str, len: usize) -> Result<[u8; LEN_PREFIX], CoreError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| CoreError::FieldTooLarge { field, len })
}

/// Decode a record from its canonical encoding.
///
/// The digest is not part of the encoding; the returned record carries
/// [`Digest::ZERO`]. Trailing bytes are rejected.
pub fn decode(bytes: &[u8]) -> Result<Record, CoreError> {
    let mut reader = Reader::new(bytes);

    let version = reader.take("version", 1)?[0];
    if version != RECORD_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    let flags = RecordFlags::from_bits(reader.take("flags", 1)?[0])?;

    let sequence_number = u64::from_le_bytes(reader.array("sequence_number")?);
    let created_at = i64::from_le_bytes(reader.array("created_at")?);
    let nonce = u64::from_le_bytes(reader.array("nonce")?);

    let payload = reader.prefixed("payload")?;
    let predecessor_digest = reader.prefixed("predecessor_digest")?;

    if !reader.is_empty() {
        return Err(CoreError::TrailingBytes(reader.remaining()));
    }

    Ok(Record {
        sequence_number,
        created_at,
        payload: Bytes::copy_from_slice(payload),
        predecessor_digest: Bytes::copy_from_slice(predecessor_digest),
        digest: Digest::ZERO,
        nonce,
        flags,
    })
}

/// Cursor over an encoded record.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8], CoreError> {
        if self.remaining() < needed {
            return Err(CoreError::Truncated {
                field,
                needed,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CoreError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(field, N)?);
        Ok(arr)
    }

    fn prefixed(&mut self, field: &'static str) -> Result<&'a [u8], CoreError> {
        let len = u32::from_le_bytes(self.array(field)?) as usize;
        self.take(field, len)
    }
}
