//! Proof-of-work search.
//!
//! Starting at nonce 0, the miner hashes the record with each successive
//! nonce until the digest has `difficulty` leading zero bits. The first
//! qualifying nonce wins, so the result is the smallest such nonce.
//!
//! Cancellation is polled once every `poll_interval` attempts, including
//! before the first one. A larger interval costs less per attempt and
//! reacts later to a fired token.

use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::difficulty::{Difficulty, MAX_DIFFICULTY};
use crate::error::MineError;
use crate::hasher::RecordHasher;
use crate::record::Record;
use crate::types::Digest;

/// Default number of attempts between cancellation polls.
pub const DEFAULT_POLL_INTERVAL: u64 = 1024;

/// Outcome of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningReport {
    /// The qualifying digest, now stored on the record.
    pub digest: Digest,
    /// The winning nonce, now stored on the record.
    pub nonce: u64,
    /// Number of digests computed.
    pub attempts: u64,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

/// Nonce searcher.
#[derive(Debug, Clone)]
pub struct Miner {
    poll_interval: u64,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Miner {
    /// Create a miner polling cancellation every `poll_interval` attempts.
    ///
    /// An interval of 0 is treated as 1.
    pub fn new(poll_interval: u64) -> Self {
        Self {
            poll_interval: poll_interval.max(1),
        }
    }

    /// Attempts between cancellation polls.
    pub fn poll_interval(&self) -> u64 {
        self.poll_interval
    }

    /// Search without a cancellation signal.
    pub fn mine(
        &self,
        hasher: &RecordHasher,
        record: &mut Record,
        difficulty: u32,
    ) -> Result<MiningReport, MineError> {
        self.mine_until(hasher, record, difficulty, &CancelToken::new())
    }

    /// Search until a qualifying nonce is found or `cancel` fires.
    ///
    /// On success the record's `nonce` and `digest` hold the winning values.
    /// On any error the record is left exactly as it was.
    pub fn mine_until(
        &self,
        hasher: &RecordHasher,
        record: &mut Record,
        difficulty: u32,
        cancel: &CancelToken,
    ) -> Result<MiningReport, MineError> {
        let target = Difficulty::new(difficulty).ok_or(MineError::InvalidDifficulty {
            requested: difficulty,
            max: MAX_DIFFICULTY,
        })?;

        tracing::debug!(
            seq = record.sequence_number,
            difficulty,
            payload_len = record.payload.len(),
            "mining started"
        );

        let started = Instant::now();
        let mut template = hasher.template(record)?;
        let mut nonce: u64 = 0;
        let mut attempts: u64 = 0;

        let outcome = loop {
            if attempts % self.poll_interval == 0 && cancel.is_cancelled() {
                break Err(MineError::Cancelled { attempts });
            }

            let digest = template.digest_with_nonce(nonce);
            attempts += 1;
            if target.is_met_by(&digest) {
                break Ok(digest);
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => break Err(MineError::NonceSpaceExhausted { difficulty }),
            };
        };
        drop(template);

        let digest = match outcome {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(seq = record.sequence_number, difficulty, %err, "mining stopped");
                return Err(err);
            }
        };

        record.nonce = nonce;
        record.digest = digest;

        let report = MiningReport {
            digest,
            nonce,
            attempts,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            seq = record.sequence_number,
            nonce,
            attempts,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "mining finished"
        );
        Ok(report)
    }
}
