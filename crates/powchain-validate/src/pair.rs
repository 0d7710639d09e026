//! The per-pair check shared by both validation forms.

use powchain_core::{meets_difficulty, Digest, Record, RecordHasher};

use crate::cache::DigestCache;
use crate::error::{ChainFault, FaultKind};
use crate::policy::ValidationPolicy;

/// Digest of `chain[position]`, through the cache when one is supplied.
fn digest_at(
    hasher: &RecordHasher,
    cache: Option<&DigestCache>,
    chain: &[Record],
    position: usize,
) -> Result<Digest, ChainFault> {
    let record = &chain[position];
    if let Some(digest) = cache.and_then(|c| c.get(position)) {
        return Ok(digest);
    }
    let digest = hasher
        .digest(record)
        .map_err(|err| fault(record, position, FaultKind::Unencodable(err)))?;
    Ok(match cache {
        Some(cache) => cache.insert(position, digest),
        None => digest,
    })
}

fn fault(record: &Record, position: usize, kind: FaultKind) -> ChainFault {
    ChainFault {
        position,
        sequence_number: record.sequence_number,
        kind,
    }
}

/// Check the pair `(chain[position - 1], chain[position])`.
///
/// Checks run in a fixed order (sequence, link, anchor digest, digest,
/// work) so every caller reports the same fault for the same pair.
///
/// `position` must be in `1..chain.len()`.
pub(crate) fn check_pair(
    hasher: &RecordHasher,
    cache: Option<&DigestCache>,
    policy: &ValidationPolicy,
    chain: &[Record],
    position: usize,
) -> Result<(), ChainFault> {
    let prev = &chain[position - 1];
    let curr = &chain[position];

    if policy.check_sequence && prev.sequence_number.checked_add(1) != Some(curr.sequence_number) {
        return Err(fault(
            curr,
            position,
            FaultKind::SequenceGap {
                previous: prev.sequence_number,
                found: curr.sequence_number,
            },
        ));
    }

    let prev_digest = digest_at(hasher, cache, chain, position - 1)?;
    if curr.predecessor_digest[..] != prev_digest.as_bytes()[..] {
        return Err(fault(curr, position, FaultKind::BrokenLink));
    }

    // Nothing else vouches for the anchor's stored digest.
    if position == 1 && prev.digest != prev_digest {
        return Err(fault(prev, 0, FaultKind::DigestMismatch));
    }

    let curr_digest = digest_at(hasher, cache, chain, position)?;
    if curr.digest != curr_digest {
        return Err(fault(curr, position, FaultKind::DigestMismatch));
    }

    if let Some(required) = policy.min_difficulty {
        if !meets_difficulty(curr.digest.as_bytes(), required) {
            return Err(fault(
                curr,
                position,
                FaultKind::InsufficientWork {
                    required,
                    found: curr.digest.leading_zero_bits(),
                },
            ));
        }
    }

    Ok(())
}
