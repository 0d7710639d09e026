//! Record digests.
//!
//! Two paths compute the same BLAKE3 digest of a record's encoding:
//!
//! - **Buffered**: encode into a pooled scratch buffer, hash it in one call.
//!   Used for payloads below the streaming threshold.
//! - **Streaming**: feed the encoding straight into an incremental hasher,
//!   never materialising the full pre-image. Used for large payloads.
//!
//! Both paths drive the same encoder ([`codec::encode_to`]), so their
//! outputs are bit-identical for every record.

use bytes::Bytes;

use crate::codec::{self, ByteSink, HEADER_LEN, LEN_PREFIX, NONCE_OFFSET};
use crate::error::CoreError;
use crate::pool::{BufferPool, PooledBuffer};
use crate::record::Record;
use crate::types::Digest;

/// Payloads of at least this many bytes take the streaming path.
pub const DEFAULT_STREAMING_THRESHOLD: usize = 64 * 1024;

/// Configuration for a [`RecordHasher`].
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Payload length at which hashing switches to the streaming path.
    pub streaming_threshold: usize,
    /// Maximum number of idle buffers kept by the pool.
    pub pool_capacity: usize,
    /// Buffers that grew beyond this capacity are dropped, not pooled.
    pub max_pooled_buffer: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
            pool_capacity: 16,
            max_pooled_buffer: 4 * DEFAULT_STREAMING_THRESHOLD,
        }
    }
}

/// Which digest path a record takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPath {
    Buffered,
    Streaming,
}

/// Computes record digests, owning the scratch buffer pool.
///
/// `RecordHasher` is `Sync`; share one behind an `Arc` across threads.
#[derive(Debug)]
pub struct RecordHasher {
    config: HasherConfig,
    pool: BufferPool,
}

impl RecordHasher {
    /// Create a hasher with the given configuration.
    pub fn new(config: HasherConfig) -> Self {
        let pool = BufferPool::new(config.pool_capacity, config.max_pooled_buffer);
        Self { config, pool }
    }

    /// The active configuration.
    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// The scratch buffer pool.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// The path [`digest`](Self::digest) will take for `record`.
    pub fn path_for(&self, record: &Record) -> HashPath {
        if record.payload.len() < self.config.streaming_threshold {
            HashPath::Buffered
        } else {
            HashPath::Streaming
        }
    }

    /// Compute the digest of `record`, choosing the path by payload size.
    pub fn digest(&self, record: &Record) -> Result<Digest, CoreError> {
        match self.path_for(record) {
            HashPath::Buffered => self.digest_buffered(record),
            HashPath::Streaming => digest_streaming(record),
        }
    }

    /// Compute the digest through a pooled buffer, regardless of size.
    pub fn digest_buffered(&self, record: &Record) -> Result<Digest, CoreError> {
        let mut buf = self.pool.acquire();
        codec::encode_to(record, &mut *buf)?;
        Ok(Digest::from(blake3::hash(&buf[..])))
    }

    /// Encode `record` through a pooled buffer into caller-owned bytes.
    pub fn serialize(&self, record: &Record) -> Result<Vec<u8>, CoreError> {
        let mut buf = self.pool.acquire();
        buf.reserve(codec::encoded_len(record));
        codec::encode_to(record, &mut *buf)?;
        Ok(buf.to_owned_bytes())
    }

    /// Prepare a nonce-search template for `record`.
    ///
    /// The template hashes `record` with substituted nonces without
    /// touching the record itself.
    pub fn template<'a>(&'a self, record: &'a Record) -> Result<MiningTemplate<'a>, CoreError> {
        match self.path_for(record) {
            HashPath::Buffered => {
                let mut preimage = self.pool.acquire();
                codec::encode_to(record, &mut *preimage)?;
                Ok(MiningTemplate {
                    inner: TemplateInner::Buffered { preimage },
                })
            }
            HashPath::Streaming => {
                let payload_len = codec::length_prefix("payload", record.payload.len())?;
                let prev_len =
                    codec::length_prefix("predecessor_digest", record.predecessor_digest.len())?;
                let header = codec::encode_header(record);
                let mut prefix = blake3::Hasher::new();
                prefix.update(&header[..NONCE_OFFSET]);
                Ok(MiningTemplate {
                    inner: TemplateInner::Streaming {
                        prefix,
                        payload_len,
                        payload: record.payload.clone(),
                        prev_len,
                        predecessor_digest: record.predecessor_digest.clone(),
                    },
                })
            }
        }
    }
}

impl Default for RecordHasher {
    fn default() -> Self {
        Self::new(HasherConfig::default())
    }
}

/// Compute the digest of `record` without materialising its encoding.
pub fn digest_streaming(record: &Record) -> Result<Digest, CoreError> {
    let mut hasher = blake3::Hasher::new();
    codec::encode_to(record, &mut hasher)?;
    Ok(Digest::from(hasher.finalize()))
}

/// A record prepared for repeated hashing with different nonces.
///
/// Buffered-size records keep their full encoding and patch the eight
/// nonce bytes per attempt. Streaming-size records keep the hasher state
/// after the bytes preceding the nonce.
pub struct MiningTemplate<'a> {
    inner: TemplateInner<'a>,
}

enum TemplateInner<'a> {
    Buffered {
        preimage: PooledBuffer<'a>,
    },
    Streaming {
        prefix: blake3::Hasher,
        payload_len: [u8; LEN_PREFIX],
        payload: Bytes,
        prev_len: [u8; LEN_PREFIX],
        predecessor_digest: Bytes,
    },
}

impl MiningTemplate<'_> {
    /// Digest of the prepared record with its nonce replaced by `nonce`.
    pub fn digest_with_nonce(&mut self, nonce: u64) -> Digest {
        match &mut self.inner {
            TemplateInner::Buffered { preimage } => {
                preimage[NONCE_OFFSET..HEADER_LEN].copy_from_slice(&nonce.to_le_bytes());
                Digest::from(blake3::hash(&preimage[..]))
            }
            TemplateInner::Streaming {
                prefix,
                payload_len,
                payload,
                prev_len,
                predecessor_digest,
            } => {
                let mut hasher = prefix.clone();
                hasher.put(&nonce.to_le_bytes());
                hasher.put(&payload_len[..]);
                hasher.put(&payload[..]);
                hasher.put(&prev_len[..]);
                hasher.put(&predecessor_digest[..]);
                Digest::from(hasher.finalize())
            }
        }
    }

    /// Which path this template hashes along.
    pub fn path(&self) -> HashPath {
        match self.inner {
            TemplateInner::Buffered { .. } => HashPath::Buffered,
            TemplateInner::Streaming { .. } => HashPath::Streaming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordBuilder, RecordFlags};

    fn record_with_payload(len: usize) -> Record {
        RecordBuilder::new(7)
            .timestamp(1_700_000_000)
            .payload(vec![0x61u8; len])
            .predecessor(vec![0xabu8; 32])
            .nonce(99)
            .build()
    }

    #[test]
    fn test_paths_agree_small() {
        let hasher = RecordHasher::default();
        let record = record_with_payload(16);
        assert_eq!(hasher.path_for(&record), HashPath::Buffered);
        assert_eq!(
            hasher.digest_buffered(&record).unwrap(),
            digest_streaming(&record).unwrap()
        );
    }

    #[test]
    fn test_paths_agree_large() {
        let hasher = RecordHasher::default();
        let record = record_with_payload(512 * 1024);
        assert_eq!(hasher.path_for(&record), HashPath::Streaming);
        assert_eq!(
            hasher.digest(&record).unwrap(),
            hasher.digest_buffered(&record).unwrap()
        );
    }

    #[test]
    fn test_paths_agree_at_threshold_boundary() {
        let hasher = RecordHasher::default();
        for len in [
            DEFAULT_STREAMING_THRESHOLD - 1,
            DEFAULT_STREAMING_THRESHOLD,
            DEFAULT_STREAMING_THRESHOLD + 1,
        ] {
            let record = record_with_payload(len);
            assert_eq!(
                hasher.digest_buffered(&record).unwrap(),
                digest_streaming(&record).unwrap(),
                "paths disagree at payload length {}",
                len
            );
        }
    }

    #[test]
    fn test_digest_matches_hash_of_serialization() {
        let hasher = RecordHasher::default();
        let record = record_with_payload(100);
        let bytes = codec::serialize(&record).unwrap();
        assert_eq!(
            hasher.digest(&record).unwrap(),
            Digest::from(blake3::hash(&bytes))
        );
    }

    #[test]
    fn test_pooled_serialize_matches_codec() {
        let hasher = RecordHasher::default();
        let record = record_with_payload(100);
        let pooled = hasher.serialize(&record).unwrap();
        assert_eq!(pooled, codec::serialize(&record).unwrap());
        // The pooled buffer went back empty; the copy is unaffected.
        assert_eq!(hasher.pool().idle(), 1);
        let again = hasher.pool().acquire();
        assert!(again.is_empty());
        drop(again);
        assert_eq!(pooled.len(), codec::encoded_len(&record));
    }

    #[test]
    fn test_template_matches_digest_both_paths() {
        let hasher = RecordHasher::default();
        for len in [0, 100, 128 * 1024] {
            let mut record = record_with_payload(len);
            let mut template = hasher.template(&record).unwrap();
            let via_template: Vec<Digest> = (0..4).map(|n| template.digest_with_nonce(n)).collect();
            drop(template);

            for (nonce, expected) in via_template.into_iter().enumerate() {
                record.nonce = nonce as u64;
                assert_eq!(hasher.digest(&record).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_template_path_follows_threshold() {
        let hasher = RecordHasher::new(HasherConfig {
            streaming_threshold: 8,
            ..HasherConfig::default()
        });
        let small = record_with_payload(4);
        let large = record_with_payload(8);
        assert_eq!(hasher.template(&small).unwrap().path(), HashPath::Buffered);
        assert_eq!(hasher.template(&large).unwrap().path(), HashPath::Streaming);
    }

    #[test]
    fn test_flags_change_digest() {
        let hasher = RecordHasher::default();
        let plain = Record::default();
        let genesis = RecordBuilder::genesis().build();
        assert_eq!(genesis.flags, RecordFlags::GENESIS);
        assert_ne!(
            hasher.digest(&plain).unwrap(),
            hasher.digest(&genesis).unwrap()
        );
    }
}
