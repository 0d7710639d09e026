//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the record encoding and BLAKE3 digests. Any change to
//! the pre-image layout breaks every existing chain and fails them.

use bytes::Bytes;
use serde::Serialize;

use powchain_core::{serialize, Record, RecordFlags};

/// Payload of a golden vector.
#[derive(Debug, Clone, Copy)]
pub enum VectorPayload {
    /// Literal bytes.
    Literal(&'static [u8]),
    /// `len` bytes where byte `i` is `i % 251`.
    Pattern(usize),
}

impl VectorPayload {
    /// Materialize the payload.
    pub fn bytes(&self) -> Bytes {
        match *self {
            VectorPayload::Literal(bytes) => Bytes::from_static(bytes),
            VectorPayload::Pattern(len) => (0..len).map(|i| (i % 251) as u8).collect(),
        }
    }
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub sequence_number: u64,
    pub created_at: i64,
    pub nonce: u64,
    pub flags: RecordFlags,
    pub payload: VectorPayload,
    /// Predecessor digest (hex).
    pub predecessor: &'static str,
    /// Expected encoding (hex), when short enough to pin.
    pub expected_encoding: Option<&'static str>,
    /// Expected digest (hex).
    pub expected_digest: &'static str,
}

/// Digest of the `"Genesis"` vector, linked to by later vectors.
pub const GENESIS_DIGEST: &str = "1463802515d418873c686515d549df76450371e8be3da6e15b65ac5472e61e96";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Default record",
            sequence_number: 0,
            created_at: 0,
            nonce: 0,
            flags: RecordFlags::NONE,
            payload: VectorPayload::Literal(b""),
            predecessor: "",
            expected_encoding: Some(
                "01000000000000000000000000000000000000000000000000000000000000000000",
            ),
            expected_digest: "af5bf2cfb83d1dff734ce89a707f2e4a4a41aabcea3d08f38c7f496fe785b61d",
        },
        GoldenVector {
            name: "Empty anchor",
            sequence_number: 0,
            created_at: 0,
            nonce: 0,
            flags: RecordFlags::GENESIS,
            payload: VectorPayload::Literal(b""),
            predecessor: "",
            expected_encoding: Some(
                "01010000000000000000000000000000000000000000000000000000000000000000",
            ),
            expected_digest: "43f1e9dfd734be1eab132d296271ba634769edead7dfc0df15bf06d8b6ea6120",
        },
        GoldenVector {
            name: "Genesis",
            sequence_number: 0,
            created_at: 1_700_000_000,
            nonce: 0,
            flags: RecordFlags::GENESIS,
            payload: VectorPayload::Literal(b"Genesis"),
            predecessor: "",
            expected_encoding: Some(
                "0101000000000000000000f153650000000000000000000000000700000047656e6573697300000000",
            ),
            expected_digest: GENESIS_DIGEST,
        },
        GoldenVector {
            name: "Linked to Genesis",
            sequence_number: 1,
            created_at: 1_700_000_001,
            nonce: 42,
            flags: RecordFlags::NONE,
            payload: VectorPayload::Literal(b"Block 1"),
            predecessor: GENESIS_DIGEST,
            expected_encoding: Some(
                "0100010000000000000001f15365000000002a0000000000000007000000426c6f636b2031\
                 200000001463802515d418873c686515d549df76450371e8be3da6e15b65ac5472e61e96",
            ),
            expected_digest: "9a8adbd9c306b5e5bb755e47e3bb344c867e2d4a4ecc552eeed590d37b6a3d4f",
        },
        GoldenVector {
            name: "Extreme integers and null bytes",
            sequence_number: 7,
            created_at: -1,
            nonce: u64::MAX,
            flags: RecordFlags::NONE,
            payload: VectorPayload::Literal(b"\x00\x00\xff"),
            predecessor: "00",
            expected_encoding: Some(
                "01000700000000000000ffffffffffffffffffffffffffffffff030000000000ff0100000000",
            ),
            expected_digest: "f7098f76ae48c01fdd9762028bda639d0b5c90f6ae8a7a96463e36177ff4f498",
        },
        GoldenVector {
            name: "Streaming-size payload",
            sequence_number: 2,
            created_at: 1_700_000_002,
            nonce: 9,
            flags: RecordFlags::NONE,
            payload: VectorPayload::Pattern(70_000),
            predecessor: "1111111111111111111111111111111111111111111111111111111111111111",
            expected_encoding: None,
            expected_digest: "db390e6cb25b116df11e3a8e91eb39617c388a126f17810ff592634339d8fdc2",
        },
    ]
}

/// A golden mining result: the smallest nonce meeting `difficulty`.
#[derive(Debug, Clone)]
pub struct MiningVector {
    pub name: &'static str,
    /// The record to mine (its nonce is ignored).
    pub base: GoldenVector,
    pub difficulty: u32,
    pub expected_nonce: u64,
    pub expected_digest: &'static str,
}

/// Get all golden mining vectors.
pub fn mining_vectors() -> Vec<MiningVector> {
    let base = GoldenVector {
        name: "Block 1 after Genesis",
        sequence_number: 1,
        created_at: 1_700_000_001,
        nonce: 0,
        flags: RecordFlags::NONE,
        payload: VectorPayload::Literal(b"Block 1"),
        predecessor: GENESIS_DIGEST,
        expected_encoding: None,
        expected_digest: "",
    };
    vec![
        MiningVector {
            name: "Block 1 at 8 bits",
            base: base.clone(),
            difficulty: 8,
            expected_nonce: 15,
            expected_digest: "00101c714b531e223d61d973fe62833bd37a1291113ae3020887f1ba6110e736",
        },
        MiningVector {
            name: "Block 1 at 12 bits",
            base,
            difficulty: 12,
            expected_nonce: 1400,
            expected_digest: "00050e9ad013e4893cd996cbb5e173676f6c1576055cf1749f4d1362d80d89ef",
        },
    ]
}

/// Build the unsealed record described by a vector.
pub fn record_from_vector(vector: &GoldenVector) -> Record {
    let predecessor = hex::decode(vector.predecessor).unwrap_or_default();
    let mut record = Record::new(
        vector.sequence_number,
        vector.created_at,
        vector.payload.bytes(),
        predecessor,
    );
    record.nonce = vector.nonce;
    record.flags = vector.flags;
    record
}

/// Outcome of checking one vector, suitable for emitting as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct VectorReport {
    pub name: String,
    pub matches: bool,
    pub encoding: Option<String>,
    pub digest: String,
}

/// Check every golden vector against this implementation.
pub fn verify_all_vectors() -> Vec<VectorReport> {
    all_vectors()
        .iter()
        .map(|v| {
            let record = record_from_vector(v);
            let digest = record
                .compute_digest()
                .map(|d| d.to_hex())
                .unwrap_or_default();
            let encoding = v
                .expected_encoding
                .and_then(|_| serialize(&record).ok())
                .map(hex::encode);

            let encoding_matches = match (v.expected_encoding, &encoding) {
                (Some(expected), Some(actual)) => expected == actual,
                (None, _) => true,
                (Some(_), None) => false,
            };

            VectorReport {
                name: v.name.to_string(),
                matches: encoding_matches && digest == v.expected_digest,
                encoding,
                digest,
            }
        })
        .collect()
}
