//! Record factory: builds records and hands successors to the miner.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use powchain_core::{CancelToken, Miner, MiningReport, Record, RecordBuilder, RecordHasher};
use tracing::debug;

use crate::error::{ChainError, Result};

/// Source of `created_at` timestamps, in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Current wall-clock time in seconds since the Unix epoch.
///
/// Times before the epoch come out negative.
pub fn system_clock() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
        Err(before) => {
            let secs = before.duration().as_secs();
            i64::try_from(secs).map_or(i64::MIN, |s| -s)
        }
    }
}

/// Builds the first record of a chain and mines its successors.
#[derive(Clone)]
pub struct RecordFactory {
    hasher: Arc<RecordHasher>,
    miner: Miner,
    clock: Clock,
}

impl fmt::Debug for RecordFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordFactory")
            .field("hasher", &self.hasher)
            .field("miner", &self.miner)
            .finish_non_exhaustive()
    }
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self::new(Arc::new(RecordHasher::default()), Miner::default())
    }
}

impl RecordFactory {
    /// Create a factory stamping records with the system clock.
    pub fn new(hasher: Arc<RecordHasher>, miner: Miner) -> Self {
        Self {
            hasher,
            miner,
            clock: Arc::new(system_clock),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The shared hasher.
    pub fn hasher(&self) -> &Arc<RecordHasher> {
        &self.hasher
    }

    /// The miner.
    pub fn miner(&self) -> &Miner {
        &self.miner
    }

    /// Build the chain's anchor: sequence 0, empty predecessor, genesis flag.
    ///
    /// Its digest is computed directly; the anchor is not mined.
    pub fn create_first_record(&self, payload: impl Into<Bytes>) -> Result<Record> {
        let record = RecordBuilder::genesis()
            .timestamp((self.clock)())
            .payload(payload)
            .seal(&self.hasher)?;
        debug!(digest = %record.digest, "first record created");
        Ok(record)
    }

    /// Build and mine the successor of `prev`.
    pub fn create_next_record(
        &self,
        prev: &Record,
        payload: impl Into<Bytes>,
        difficulty: u32,
        cancel: &CancelToken,
    ) -> Result<Record> {
        self.mine_next_record(prev, payload, difficulty, cancel)
            .map(|(record, _)| record)
    }

    /// Like [`create_next_record`](Self::create_next_record), also returning
    /// the search statistics.
    pub fn mine_next_record(
        &self,
        prev: &Record,
        payload: impl Into<Bytes>,
        difficulty: u32,
        cancel: &CancelToken,
    ) -> Result<(Record, MiningReport)> {
        let sequence_number = prev
            .sequence_number
            .checked_add(1)
            .ok_or(ChainError::SequenceExhausted(prev.sequence_number))?;

        let mut record = RecordBuilder::new(sequence_number)
            .timestamp((self.clock)())
            .payload(payload)
            .predecessor(Bytes::copy_from_slice(prev.digest.as_bytes()))
            .build();
        let report = self
            .miner
            .mine_until(&self.hasher, &mut record, difficulty, cancel)?;
        Ok((record, report))
    }
}
