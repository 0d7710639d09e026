//! Golden vectors checked end to end: both digest paths, the codec, the
//! miner and the validators.

use powchain_core::{decode, serialize, HashPath, HasherConfig, RecordHasher};
use powchain_testkit::vectors::{all_vectors, mining_vectors, record_from_vector, VectorPayload};
use powchain_testkit::{verify_all_vectors, ChainFixture, Tamper};
use powchain_validate::{validate, validate_concurrent, ChainValidator, ConcurrentConfig};

#[test]
fn test_vectors_on_both_paths() {
    let buffered = RecordHasher::new(HasherConfig {
        streaming_threshold: usize::MAX,
        ..HasherConfig::default()
    });
    let streaming = RecordHasher::new(HasherConfig {
        streaming_threshold: 0,
        ..HasherConfig::default()
    });

    for vector in all_vectors() {
        let record = record_from_vector(&vector);
        assert_eq!(buffered.path_for(&record), HashPath::Buffered);
        assert_eq!(streaming.path_for(&record), HashPath::Streaming);

        assert_eq!(
            buffered.digest(&record).unwrap().to_hex(),
            vector.expected_digest,
            "buffered: {}",
            vector.name
        );
        assert_eq!(
            streaming.digest(&record).unwrap().to_hex(),
            vector.expected_digest,
            "streaming: {}",
            vector.name
        );
    }
}

#[test]
fn test_large_vector_round_trips() {
    let vector = all_vectors()
        .into_iter()
        .find(|v| matches!(v.payload, VectorPayload::Pattern(_)))
        .unwrap();
    let record = record_from_vector(&vector);
    assert_eq!(
        RecordHasher::default().path_for(&record),
        HashPath::Streaming
    );

    let bytes = serialize(&record).unwrap();
    assert_eq!(bytes.len(), 26 + 4 + 70_000 + 4 + 32);
    assert_eq!(decode(&bytes).unwrap(), record);
}

#[test]
fn test_mined_vectors_validate() {
    let hasher = RecordHasher::default();
    for vector in mining_vectors() {
        let mut genesis = record_from_vector(&all_vectors()[2]);
        genesis.digest = hasher.digest(&genesis).unwrap();

        let mut next = record_from_vector(&vector.base);
        next.nonce = vector.expected_nonce;
        next.digest = hasher.digest(&next).unwrap();
        assert_eq!(next.digest.to_hex(), vector.expected_digest);

        let chain = vec![genesis, next];
        assert!(validate(&chain));
        assert!(validate_concurrent(&chain, 2));
    }
}

#[test]
fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vectors.json");

    let reports = verify_all_vectors();
    let json = serde_json::to_string_pretty(&reports).unwrap();
    std::fs::write(&path, json).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), all_vectors().len());
    assert!(entries.iter().all(|e| e["matches"] == true));
}

#[test]
fn test_every_tamper_rejected_by_both_forms() {
    let fixture = ChainFixture::new();
    let honest = fixture.mined_chain(5, 4);
    let pooled = ChainValidator::default().with_concurrent(ConcurrentConfig {
        workers: 3,
        sequential_below: 0,
    });

    for position in 0..honest.len() {
        for tamper in Tamper::ALL {
            // The anchor's sequence number is only checked against its
            // successor, which still catches it.
            let mut chain = honest.clone();
            tamper.apply(&mut chain[position]);

            let sequential = ChainValidator::default().verify(&chain);
            let concurrent = pooled.verify_concurrent(&chain, &Default::default());
            assert!(sequential.is_err(), "{tamper:?} at {position}");
            assert_eq!(sequential, concurrent, "{tamper:?} at {position}");
        }
    }
}

#[test]
fn test_large_unmined_chain_agreement() {
    let fixture = ChainFixture::new();
    let mut chain = fixture.unmined_chain(2_000);
    assert!(validate(&chain));
    assert!(validate_concurrent(&chain, 4));

    Tamper::Payload.apply(&mut chain[1_500]);
    assert!(!validate(&chain));
    assert!(!validate_concurrent(&chain, 4));
}
