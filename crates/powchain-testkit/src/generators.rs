//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use powchain_core::{Digest, Record, RecordFlags};

use crate::fixtures::Tamper;

/// Generate a random Digest.
pub fn digest() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(Digest::from_bytes)
}

/// Generate payload bytes of at most `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a predecessor link: empty, a full digest, or odd-length junk.
pub fn predecessor() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(Vec::<u8>::new()),
        any::<[u8; 32]>().prop_map(|d| d.to_vec()),
        payload(40),
    ]
}

/// Generate a tamper kind.
pub fn tamper() -> impl Strategy<Value = Tamper> {
    prop::sample::select(Tamper::ALL.to_vec())
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub sequence_number: u64,
    pub created_at: i64,
    pub payload: Vec<u8>,
    pub predecessor_digest: Vec<u8>,
    pub nonce: u64,
    pub genesis: bool,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<u64>(),
            any::<i64>(),
            payload(256),
            predecessor(),
            any::<u64>(),
            any::<bool>(),
        )
            .prop_map(
                |(sequence_number, created_at, payload, predecessor_digest, nonce, genesis)| {
                    RecordParams {
                        sequence_number,
                        created_at,
                        payload,
                        predecessor_digest,
                        nonce,
                        genesis,
                    }
                },
            )
            .boxed()
    }
}

/// Generate an unsealed record from parameters.
pub fn record_from_params(params: &RecordParams) -> Record {
    Record {
        sequence_number: params.sequence_number,
        created_at: params.created_at,
        payload: Bytes::from(params.payload.clone()),
        predecessor_digest: Bytes::from(params.predecessor_digest.clone()),
        digest: Digest::ZERO,
        nonce: params.nonce,
        flags: if params.genesis {
            RecordFlags::GENESIS
        } else {
            RecordFlags::NONE
        },
    }
}
