//! # Powchain Testkit
//!
//! Testing utilities for powchain.
//!
//! ## Overview
//!
//! - **Golden vectors**: fixed records with their expected encodings,
//!   digests and mined nonces
//! - **Generators**: proptest strategies for records and tampering
//! - **Fixtures**: deterministic chain builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use powchain_testkit::vectors::{all_vectors, record_from_vector};
//!
//! for vector in all_vectors() {
//!     let record = record_from_vector(&vector);
//!     let digest = record.compute_digest().unwrap();
//!     assert_eq!(digest.to_hex(), vector.expected_digest, "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use powchain_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(params: RecordParams) {
//!         let record = record_from_params(&params);
//!         prop_assert_eq!(record.compute_digest(), record.compute_digest());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use powchain_testkit::fixtures::ChainFixture;
//!
//! let fixture = ChainFixture::new();
//! let chain = fixture.mined_chain(4, 6);
//! assert!(powchain_validate::validate(&chain));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{ChainFixture, Tamper};
pub use generators::{record_from_params, RecordParams};
pub use vectors::{
    all_vectors, mining_vectors, record_from_vector, verify_all_vectors, GoldenVector,
};
