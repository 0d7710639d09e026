//! Worker-pool validation.
//!
//! Pair positions are handed out through a shared counter to a fixed number
//! of workers, so the number of threads is bounded by the configuration and
//! not by the chain length. Each worker reports one verdict per pair over a
//! channel; the caller's thread collects them and keeps the lowest-position
//! fault. Fault positions grow with pair positions, so that fault belongs to
//! the first failing pair, the one the sequential walk stops at.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;
use powchain_core::{CancelToken, Record};
use tracing::{debug, warn};

use crate::error::{ChainFault, Result, ValidationError};
use crate::pair::check_pair;
use crate::validator::ChainValidator;

/// Chains shorter than this are validated sequentially by default.
pub const DEFAULT_SEQUENTIAL_BELOW: usize = 1000;

/// How often the collector re-checks cancellation while waiting.
const COLLECT_POLL: Duration = Duration::from_millis(10);

/// Settings for [`ChainValidator::verify_concurrent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrentConfig {
    /// Number of workers. `0` means the available parallelism.
    pub workers: usize,
    /// Chains with fewer records take the sequential path.
    pub sequential_below: usize,
}

impl Default for ConcurrentConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            sequential_below: DEFAULT_SEQUENTIAL_BELOW,
        }
    }
}

impl ConcurrentConfig {
    /// Threads in the worker pool: `workers`, or the available parallelism
    /// when that is 0.
    pub fn pool_threads(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }

    /// Worker count actually used for `pairs` pairs: never zero and never
    /// more than there are pairs to check.
    pub fn effective_workers(&self, pairs: usize) -> usize {
        self.pool_threads().min(pairs).max(1)
    }
}

type PairVerdict = std::result::Result<(), ChainFault>;

impl ChainValidator {
    /// Whether `chain` is valid, checked on the worker pool.
    pub fn validate_concurrent(&self, chain: &[Record]) -> bool {
        self.verify_concurrent(chain, &CancelToken::new()).is_ok()
    }

    /// Check every pair of `chain` on a bounded worker pool.
    ///
    /// Returns the lowest-position fault if any pair fails, or
    /// [`ValidationError::Cancelled`] if `cancel` fires before every pair
    /// has reported.
    pub fn verify_concurrent(&self, chain: &[Record], cancel: &CancelToken) -> Result<()> {
        if chain.len() < 2 {
            return Ok(());
        }
        if chain.len() < self.concurrent.sequential_below {
            return self.verify_until(chain, cancel);
        }

        let Some(pool) = self.pool() else {
            return self.verify_until(chain, cancel);
        };
        let total = chain.len() - 1;
        let workers = self.concurrent.effective_workers(total);

        debug!(records = chain.len(), workers, "concurrent validation started");

        let cache = self.run_cache(chain.len());
        let cache = cache.as_ref();
        let next = AtomicUsize::new(1);
        let next = &next;
        let hasher = &*self.hasher;
        let policy = &self.policy;
        let (tx, rx) = crossbeam::channel::unbounded::<PairVerdict>();

        let (checked, lowest) = pool.in_place_scope(move |scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                scope.spawn(move |_| loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let position = next.fetch_add(1, Ordering::Relaxed);
                    if position >= chain.len() {
                        break;
                    }
                    let verdict = check_pair(hasher, cache, policy, chain, position);
                    if tx.send(verdict).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            let mut checked = 0usize;
            let mut lowest: Option<ChainFault> = None;
            while checked < total {
                match rx.recv_timeout(COLLECT_POLL) {
                    Ok(verdict) => {
                        checked += 1;
                        if let Err(fault) = verdict {
                            let lower = lowest
                                .as_ref()
                                .map_or(true, |f| fault.position < f.position);
                            if lower {
                                lowest = Some(fault);
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            (checked, lowest)
        });

        if checked < total {
            warn!(checked, total, "concurrent validation cancelled");
            return Err(ValidationError::Cancelled { checked, total });
        }
        if let Some(fault) = lowest {
            warn!(%fault, "chain rejected");
            return Err(fault.into());
        }

        debug!(records = chain.len(), "chain verified");
        Ok(())
    }
}
