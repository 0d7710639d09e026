//! Validator handle and convenience entry points.

use std::sync::{Arc, OnceLock};

use powchain_core::{CancelToken, Record, RecordHasher};
use tracing::{debug, warn};

use crate::cache::DigestCache;
use crate::concurrent::ConcurrentConfig;
use crate::error::Result;
use crate::policy::ValidationPolicy;

/// Validates chains under one policy with a shared hasher.
///
/// The worker pool is built on the first concurrent run and reused by every
/// later run of this validator and its clones.
#[derive(Debug, Clone)]
pub struct ChainValidator {
    pub(crate) hasher: Arc<RecordHasher>,
    pub(crate) policy: ValidationPolicy,
    pub(crate) concurrent: ConcurrentConfig,
    pool: Arc<OnceLock<Option<rayon::ThreadPool>>>,
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::new(
            Arc::new(RecordHasher::default()),
            ValidationPolicy::default(),
        )
    }
}

impl ChainValidator {
    /// Create a validator with the default concurrent settings.
    pub fn new(hasher: Arc<RecordHasher>, policy: ValidationPolicy) -> Self {
        Self {
            hasher,
            policy,
            concurrent: ConcurrentConfig::default(),
            pool: Arc::new(OnceLock::new()),
        }
    }

    /// Replace the concurrent settings.
    ///
    /// The pool is rebuilt to the new size on the next concurrent run.
    pub fn with_concurrent(mut self, config: ConcurrentConfig) -> Self {
        self.concurrent = config;
        self.pool = Arc::new(OnceLock::new());
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// The active concurrent settings.
    pub fn concurrent_config(&self) -> &ConcurrentConfig {
        &self.concurrent
    }

    /// A fresh per-run cache, or none when the policy disables caching.
    pub(crate) fn run_cache(&self, len: usize) -> Option<DigestCache> {
        self.policy
            .use_cache
            .then(|| DigestCache::with_capacity(len))
    }

    /// The worker pool, or `None` when it could not be built.
    pub(crate) fn pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool
            .get_or_init(|| {
                let threads = self.concurrent.pool_threads();
                let built = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("powchain-validate-{i}"))
                    .build();
                match built {
                    Ok(pool) => {
                        debug!(threads, "worker pool built");
                        Some(pool)
                    }
                    Err(err) => {
                        warn!(error = %err, "worker pool unavailable, validating sequentially");
                        None
                    }
                }
            })
            .as_ref()
    }
}

/// Sequential validation under the default policy.
///
/// Checks linkage, sequence continuity and digest integrity only. Proof-of-work
/// is never re-checked, so a record whose nonce was reset and whose digest was
/// recomputed still passes; use [`verify_chain`] with
/// [`ValidationPolicy::with_min_difficulty`] to require it.
pub fn validate(chain: &[Record]) -> bool {
    ChainValidator::default().validate(chain)
}

/// Sequential validation under `policy`, reporting the first fault.
pub fn verify_chain(chain: &[Record], policy: &ValidationPolicy) -> Result<()> {
    ChainValidator::new(Arc::new(RecordHasher::default()), policy.clone())
        .verify(chain)
}

/// Concurrent validation under the default policy with `workers` workers.
///
/// Like [`validate`], this never re-checks proof-of-work.
///
/// `workers == 0` uses the available parallelism. Chains shorter than
/// [`DEFAULT_SEQUENTIAL_BELOW`](crate::DEFAULT_SEQUENTIAL_BELOW) are walked
/// sequentially.
pub fn validate_concurrent(chain: &[Record], workers: usize) -> bool {
    let config = ConcurrentConfig {
        workers,
        ..ConcurrentConfig::default()
    };
    ChainValidator::default()
        .with_concurrent(config)
        .verify_concurrent(chain, &CancelToken::new())
        .is_ok()
}
