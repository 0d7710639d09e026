//! An owned, in-memory chain of records.

use std::sync::Arc;

use bytes::Bytes;
use powchain_core::{CancelToken, Miner, Record, RecordHasher};
use powchain_validate::{ChainValidator, ConcurrentConfig, ValidationError};
use tracing::debug;

use crate::config::ChainConfig;
use crate::error::Result;
use crate::factory::RecordFactory;

/// A chain that owns its records and appends through a [`RecordFactory`].
///
/// Records are only ever appended. Validation never mutates them.
#[derive(Debug, Clone)]
pub struct Chain {
    records: Vec<Record>,
    factory: RecordFactory,
    validator: ChainValidator,
    config: ChainConfig,
}

impl Chain {
    /// Start a chain whose first record carries `genesis_payload`.
    pub fn new(genesis_payload: impl Into<Bytes>, config: ChainConfig) -> Result<Self> {
        let hasher = Arc::new(RecordHasher::new(config.hasher.clone()));
        let factory = RecordFactory::new(hasher, Miner::new(config.poll_interval));
        Self::with_factory(genesis_payload, factory, config)
    }

    /// Start a chain using a caller-supplied factory.
    pub fn with_factory(
        genesis_payload: impl Into<Bytes>,
        factory: RecordFactory,
        config: ChainConfig,
    ) -> Result<Self> {
        let mut chain = Self::assemble(Vec::new(), factory, config);
        let first = chain.factory.create_first_record(genesis_payload)?;
        chain.records.push(first);
        Ok(chain)
    }

    /// Wrap existing records without checking them.
    ///
    /// Call [`verify`](Self::verify) before trusting the result.
    pub fn from_records(records: Vec<Record>, config: ChainConfig) -> Self {
        let hasher = Arc::new(RecordHasher::new(config.hasher.clone()));
        let factory = RecordFactory::new(hasher, Miner::new(config.poll_interval));
        Self::assemble(records, factory, config)
    }

    fn assemble(records: Vec<Record>, factory: RecordFactory, config: ChainConfig) -> Self {
        let policy = config.validation_policy();
        let validator = ChainValidator::new(Arc::clone(factory.hasher()), policy)
            .with_concurrent(config.concurrent.clone());
        Self {
            records,
            factory,
            validator,
            config,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Appending
    // ─────────────────────────────────────────────────────────────────────────

    /// Mine and append a record at the configured difficulty.
    pub fn append(&mut self, payload: impl Into<Bytes>) -> Result<&Record> {
        self.append_until(payload, &CancelToken::new())
    }

    /// Like [`append`](Self::append), but gives up when `cancel` fires.
    ///
    /// On error the chain is unchanged. An empty chain gets an anchor record.
    pub fn append_until(
        &mut self,
        payload: impl Into<Bytes>,
        cancel: &CancelToken,
    ) -> Result<&Record> {
        let record = match self.records.last() {
            Some(prev) => {
                self.factory
                    .create_next_record(prev, payload, self.config.difficulty, cancel)?
            }
            None => self.factory.create_first_record(payload)?,
        };
        debug!(
            seq = record.sequence_number,
            nonce = record.nonce,
            digest = %record.digest,
            "record appended"
        );
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the chain is valid under the configured policy.
    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    /// Validate sequentially and report the first fault.
    pub fn verify(&self) -> std::result::Result<(), ValidationError> {
        self.validator.verify(&self.records)
    }

    /// Whether the chain is valid, checked with `workers` workers.
    pub fn validate_concurrent(&self, workers: usize) -> bool {
        self.verify_concurrent(workers, &CancelToken::new()).is_ok()
    }

    /// Validate on the worker pool, giving up when `cancel` fires.
    ///
    /// The configured worker count runs on the chain's own pool; any other
    /// count gets a pool for this call only.
    pub fn verify_concurrent(
        &self,
        workers: usize,
        cancel: &CancelToken,
    ) -> std::result::Result<(), ValidationError> {
        if workers == self.validator.concurrent_config().workers {
            return self.validator.verify_concurrent(&self.records, cancel);
        }
        let config = ConcurrentConfig {
            workers,
            ..self.config.concurrent.clone()
        };
        self.validator
            .clone()
            .with_concurrent(config)
            .verify_concurrent(&self.records, cancel)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The most recent record.
    pub fn tip(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chain holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records, oldest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Give up ownership of the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// The configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The factory used for appends.
    pub fn factory(&self) -> &RecordFactory {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chain(blocks: usize) -> Chain {
        let config = ChainConfig::with_difficulty(4);
        let mut chain = Chain::new("Genesis", config).unwrap();
        for i in 1..=blocks {
            chain.append(format!("Block {i}")).unwrap();
        }
        chain
    }

    #[test]
    fn test_new_chain_has_anchor() {
        let chain = small_chain(0);
        assert_eq!(chain.len(), 1);
        let tip = chain.tip().unwrap();
        assert!(tip.is_genesis());
        assert_eq!(&tip.payload[..], b"Genesis");
        assert!(chain.validate());
    }

    #[test]
    fn test_append_links_records() {
        let chain = small_chain(3);
        assert_eq!(chain.len(), 4);
        for (i, pair) in chain.records().windows(2).enumerate() {
            assert!(pair[1].links_to(&pair[0]));
            assert_eq!(pair[1].sequence_number, i as u64 + 1);
        }
        assert!(chain.validate());
        assert!(chain.validate_concurrent(2));
    }

    #[test]
    fn test_cancelled_append_leaves_chain_unchanged() {
        let config = ChainConfig::with_difficulty(200);
        let mut chain = Chain::new("Genesis", config).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = chain.append_until("Block 1", &cancel).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_empty_chain_append_creates_anchor() {
        let mut chain = Chain::from_records(Vec::new(), ChainConfig::with_difficulty(1));
        assert!(chain.is_empty());
        assert!(chain.tip().is_none());
        assert!(chain.validate());

        chain.append("first").unwrap();
        assert!(chain.tip().unwrap().is_genesis());
    }

    #[test]
    fn test_round_trip_through_records() {
        let chain = small_chain(2);
        let config = chain.config().clone();
        let rebuilt = Chain::from_records(chain.clone().into_records(), config);
        assert_eq!(rebuilt.records(), chain.records());
        assert!(rebuilt.validate());
    }

    #[test]
    fn test_concurrent_worker_counts_agree() {
        let mut config = ChainConfig::with_difficulty(4);
        config.concurrent = ConcurrentConfig {
            workers: 2,
            sequential_below: 0,
        };
        let mut chain = Chain::new("Genesis", config).unwrap();
        for i in 1..=6 {
            chain.append(format!("Block {i}")).unwrap();
        }

        // The configured count runs repeatedly on the chain's pool.
        assert!(chain.validate_concurrent(2));
        assert!(chain.validate_concurrent(2));
        assert!(chain.validate_concurrent(3));

        chain.records[4].payload = Bytes::from_static(b"tampered");
        let configured = chain.verify_concurrent(2, &CancelToken::new()).unwrap_err();
        let other = chain.verify_concurrent(3, &CancelToken::new()).unwrap_err();
        assert_eq!(configured, other);
        assert_eq!(configured.fault().unwrap().position, 4);
    }
}
