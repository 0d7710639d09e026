//! Validation policy.

/// Which checks a validation run performs beyond linkage and
/// self-consistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Require sequence numbers to increase by exactly one per record.
    pub check_sequence: bool,
    /// Require every non-anchor digest to meet this difficulty.
    ///
    /// `None` skips the check, so a chain with correct links and digests
    /// but no real proof-of-work is accepted.
    pub min_difficulty: Option<u32>,
    /// Reuse digests within a run. Verdicts do not depend on this.
    pub use_cache: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            check_sequence: true,
            min_difficulty: None,
            use_cache: true,
        }
    }
}

impl ValidationPolicy {
    /// Also re-check proof-of-work at `difficulty` bits.
    pub fn with_min_difficulty(mut self, difficulty: u32) -> Self {
        self.min_difficulty = Some(difficulty);
        self
    }

    /// Skip the sequence continuity check.
    pub fn without_sequence_check(mut self) -> Self {
        self.check_sequence = false;
        self
    }

    /// Hash every consultation afresh.
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}
