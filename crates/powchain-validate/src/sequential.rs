//! Sequential validation.

use powchain_core::{CancelToken, Record};
use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::pair::check_pair;
use crate::validator::ChainValidator;

/// Pairs checked between cancellation polls.
const CANCEL_POLL_PAIRS: usize = 256;

impl ChainValidator {
    /// Whether `chain` is valid. Chains of zero or one record always are.
    pub fn validate(&self, chain: &[Record]) -> bool {
        self.verify(chain).is_ok()
    }

    /// Walk `chain` pair by pair and return the first fault.
    pub fn verify(&self, chain: &[Record]) -> Result<()> {
        self.walk(chain, None)
    }

    /// Like [`verify`](Self::verify), but stops when `cancel` fires.
    pub fn verify_until(&self, chain: &[Record], cancel: &CancelToken) -> Result<()> {
        self.walk(chain, Some(cancel))
    }

    fn walk(&self, chain: &[Record], cancel: Option<&CancelToken>) -> Result<()> {
        let total = chain.len().saturating_sub(1);
        let cache = self.run_cache(chain.len());

        for position in 1..chain.len() {
            if let Some(cancel) = cancel {
                if (position - 1) % CANCEL_POLL_PAIRS == 0 && cancel.is_cancelled() {
                    return Err(ValidationError::Cancelled {
                        checked: position - 1,
                        total,
                    });
                }
            }
            if let Err(fault) =
                check_pair(&self.hasher, cache.as_ref(), &self.policy, chain, position)
            {
                warn!(%fault, "chain rejected");
                return Err(fault.into());
            }
        }

        debug!(records = chain.len(), "chain verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultKind;
    use crate::policy::ValidationPolicy;
    use crate::validate;
    use bytes::Bytes;
    use powchain_core::{Digest, RecordBuilder, RecordHasher};
    use std::sync::Arc;
    use std::time::Duration;

    fn chain(len: usize) -> Vec<Record> {
        let hasher = RecordHasher::default();
        let mut records = Vec::with_capacity(len);
        if len == 0 {
            return records;
        }
        records.push(
            RecordBuilder::genesis()
                .timestamp(1_000)
                .payload("Genesis Block")
                .seal(&hasher)
                .unwrap(),
        );
        for i in 1..len {
            let record = RecordBuilder::after(&records[i - 1])
                .timestamp(1_000 + i as i64)
                .payload(format!("Block {i}"))
                .seal(&hasher)
                .unwrap();
            records.push(record);
        }
        records
    }

    #[test]
    fn test_trivial_chains_valid() {
        assert!(validate(&[]));
        assert!(validate(&chain(1)));

        // A lone record is accepted whatever it holds.
        let mut lone = chain(1);
        lone[0].digest = Digest::from_bytes([7; 32]);
        assert!(validate(&lone));
    }

    #[test]
    fn test_honest_chain_valid() {
        assert!(validate(&chain(10)));
    }

    #[test]
    fn test_payload_tamper_detected() {
        let mut records = chain(5);
        records[2].payload = Bytes::from_static(b"forged");

        let err = ChainValidator::default().verify(&records).unwrap_err();
        let fault = err.fault().unwrap();
        assert_eq!(fault.position, 2);
        assert_eq!(fault.kind, FaultKind::DigestMismatch);
    }

    #[test]
    fn test_relinked_tamper_detected_at_successor() {
        let hasher = RecordHasher::default();
        let mut records = chain(5);
        records[2].payload = Bytes::from_static(b"forged");
        records[2].digest = hasher.digest(&records[2]).unwrap();

        let err = ChainValidator::default().verify(&records).unwrap_err();
        let fault = err.fault().unwrap();
        assert_eq!(fault.position, 3);
        assert_eq!(fault.kind, FaultKind::BrokenLink);
    }

    #[test]
    fn test_every_single_field_tamper_detected() {
        let base = chain(4);
        for position in 0..base.len() {
            let mutations: Vec<Box<dyn Fn(&mut Record)>> = vec![
                Box::new(|r: &mut Record| r.payload = Bytes::from_static(b"x")),
                Box::new(|r: &mut Record| r.created_at += 1),
                Box::new(|r: &mut Record| r.predecessor_digest = Bytes::from_static(b"y")),
                Box::new(|r: &mut Record| r.nonce += 1),
                Box::new(|r: &mut Record| r.digest = Digest::from_bytes([0xab; 32])),
            ];
            for mutate in &mutations {
                let mut records = base.clone();
                mutate(&mut records[position]);
                assert!(!validate(&records), "tamper at {position} accepted");
            }
        }
    }

    #[test]
    fn test_sequence_gap_policy() {
        let hasher = RecordHasher::default();
        let mut records = chain(3);
        records[2].sequence_number = 9;
        records[2].digest = hasher.digest(&records[2]).unwrap();

        assert!(!validate(&records));
        let relaxed = ChainValidator::new(
            Arc::new(RecordHasher::default()),
            ValidationPolicy::default().without_sequence_check(),
        );
        assert!(relaxed.validate(&records));
    }

    #[test]
    fn test_cache_does_not_change_verdicts() {
        let cached = ChainValidator::default();
        let uncached = ChainValidator::new(
            Arc::new(RecordHasher::default()),
            ValidationPolicy::default().without_cache(),
        );

        let honest = chain(6);
        assert_eq!(cached.verify(&honest), uncached.verify(&honest));

        let mut tampered = honest.clone();
        tampered[4].created_at = -1;
        assert_eq!(cached.verify(&tampered), uncached.verify(&tampered));
        assert!(cached.verify(&tampered).is_err());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let records = chain(5);
        let validator = ChainValidator::default();
        let before = records.clone();
        assert!(validator.validate(&records));
        assert!(validator.validate(&records));
        assert_eq!(records, before);
    }

    #[test]
    fn test_deadline_mid_walk_is_cancelled() {
        let hasher = RecordHasher::default();
        let payload = Bytes::from(vec![0x5au8; 512 * 1024]);
        let mut records = chain(1);
        for i in 1..1_500i64 {
            let record = RecordBuilder::after(&records[records.len() - 1])
                .timestamp(1_000 + i)
                .payload(payload.clone())
                .seal(&hasher)
                .unwrap();
            records.push(record);
        }
        let validator = ChainValidator::new(
            Arc::new(RecordHasher::default()),
            ValidationPolicy::default().without_cache(),
        );

        let cancel = CancelToken::with_timeout(Duration::from_millis(20));
        match validator.verify_until(&records, &cancel) {
            Err(ValidationError::Cancelled { checked, total }) => {
                assert_eq!(total, 1_499);
                assert!(checked < total, "{checked} of {total}");
                assert_eq!(checked % CANCEL_POLL_PAIRS, 0);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert!(validator.validate(&records));
    }

    #[test]
    fn test_cancelled_walk() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = ChainValidator::default()
            .verify_until(&chain(3), &cancel)
            .unwrap_err();
        assert_eq!(err, ValidationError::Cancelled { checked: 0, total: 2 });
    }
}
