//! Difficulty predicate for proof-of-work.
//!
//! A digest meets difficulty `d` when its first `d` bits are zero, reading
//! byte 0 first and the most significant bit of each byte first. Requiring
//! `h` leading zero hex digits is the bit difficulty `4 * h`.

use crate::types::{Digest, DIGEST_LEN};

/// Largest accepted difficulty: every bit of the digest.
pub const MAX_DIFFICULTY: u32 = (DIGEST_LEN * 8) as u32;

/// A validated difficulty in leading zero bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Difficulty(u32);

impl Difficulty {
    /// Difficulty 0: every digest qualifies.
    pub const ZERO: Self = Self(0);

    /// Validate a difficulty. Values above [`MAX_DIFFICULTY`] are rejected.
    pub fn new(bits: u32) -> Option<Self> {
        (bits <= MAX_DIFFICULTY).then_some(Self(bits))
    }

    /// The number of leading zero bits required.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `digest` satisfies this difficulty.
    pub fn is_met_by(self, digest: &Digest) -> bool {
        meets_difficulty(digest.as_bytes(), self.0)
    }
}

/// Whether the first `bits` bits of `digest` are all zero.
///
/// Returns false when `digest` is shorter than `bits`.
pub fn meets_difficulty(digest: &[u8], bits: u32) -> bool {
    let bits = bits as usize;
    if bits > digest.len() * 8 {
        return false;
    }

    let whole = bits / 8;
    if digest[..whole].iter().any(|b| *b != 0) {
        return false;
    }

    match bits % 8 {
        0 => true,
        rem => digest[whole] >> (8 - rem) == 0,
    }
}

/// Count leading zero bits of a byte string.
pub fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut count = 0;
    for byte in bytes {
        if *byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_difficulty_bounds() {
        assert_eq!(Difficulty::new(0), Some(Difficulty::ZERO));
        assert_eq!(Difficulty::new(256).map(Difficulty::bits), Some(256));
        assert_eq!(Difficulty::new(257), None);
    }

    #[test]
    fn test_whole_bytes() {
        let mut d = [0xffu8; 32];
        d[0] = 0;
        d[1] = 0;
        assert!(meets_difficulty(&d, 16));
        assert!(!meets_difficulty(&d, 17));
    }

    #[test]
    fn test_half_byte() {
        let mut d = [0xffu8; 32];
        d[0] = 0x00;
        d[1] = 0x0f;
        // Three zero hex digits.
        assert!(meets_difficulty(&d, 12));
        assert!(!meets_difficulty(&d, 13));
    }

    #[test]
    fn test_zero_difficulty_always_met() {
        assert!(meets_difficulty(&[0xff; 32], 0));
        assert!(meets_difficulty(&[], 0));
    }

    #[test]
    fn test_all_zero_digest_meets_max() {
        assert!(meets_difficulty(&[0u8; 32], MAX_DIFFICULTY));
        assert!(!meets_difficulty(&[0u8; 32], MAX_DIFFICULTY + 1));
    }

    #[test]
    fn test_leading_zero_bits() {
        assert_eq!(leading_zero_bits(&[0x00, 0x10]), 11);
        assert_eq!(leading_zero_bits(&[0x80]), 0);
        assert_eq!(leading_zero_bits(&[0u8; 32]), 256);
        assert_eq!(Digest::ZERO.leading_zero_bits(), 256);
    }

    proptest! {
        #[test]
        fn test_predicate_matches_leading_zero_count(
            bytes in any::<[u8; 32]>(),
            bits in 0u32..=256,
        ) {
            prop_assert_eq!(
                meets_difficulty(&bytes, bits),
                leading_zero_bits(&bytes) >= bits
            );
        }
    }
}
