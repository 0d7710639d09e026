//! Chain configuration.

use powchain_core::{HasherConfig, DEFAULT_POLL_INTERVAL};
use powchain_validate::{ConcurrentConfig, ValidationPolicy};

/// Leading zero bits required of mined records by default.
pub const DEFAULT_DIFFICULTY: u32 = 16;

/// Configuration for a [`Chain`](crate::Chain).
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Difficulty, in leading zero bits, for appended records.
    pub difficulty: u32,
    /// Hasher settings shared by mining and validation.
    pub hasher: HasherConfig,
    /// Nonce attempts between cancellation polls.
    pub poll_interval: u64,
    /// Worker-pool validation settings.
    pub concurrent: ConcurrentConfig,
    /// Base validation policy.
    pub policy: ValidationPolicy,
    /// Re-check every appended record against `difficulty` on validation,
    /// unless `policy` already names a difficulty.
    pub verify_work: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            hasher: HasherConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            concurrent: ConcurrentConfig::default(),
            policy: ValidationPolicy::default(),
            verify_work: true,
        }
    }
}

impl ChainConfig {
    /// Config with the given difficulty and defaults elsewhere.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// The policy validation runs under.
    pub fn validation_policy(&self) -> ValidationPolicy {
        let mut policy = self.policy.clone();
        if self.verify_work && policy.min_difficulty.is_none() {
            policy.min_difficulty = Some(self.difficulty);
        }
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.difficulty, 16);
        assert_eq!(config.poll_interval, 1024);
        assert_eq!(config.concurrent.sequential_below, 1000);
        assert_eq!(config.concurrent.workers, 0);
        assert_eq!(config.hasher.streaming_threshold, 64 * 1024);
    }

    #[test]
    fn test_validation_policy_work() {
        let config = ChainConfig::with_difficulty(5);
        assert_eq!(config.validation_policy().min_difficulty, Some(5));

        let relaxed = ChainConfig {
            verify_work: false,
            ..ChainConfig::with_difficulty(5)
        };
        assert_eq!(relaxed.validation_policy().min_difficulty, None);

        let explicit = ChainConfig {
            policy: ValidationPolicy::default().with_min_difficulty(2),
            ..ChainConfig::with_difficulty(5)
        };
        assert_eq!(explicit.validation_policy().min_difficulty, Some(2));
    }
}
