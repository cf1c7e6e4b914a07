//! # Factom Client Testkit
//!
//! Testing utilities for the Factom client.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known addresses, chain ids and entry hashes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic keys, an in-memory network, a recording observer
//!
//! ## Golden Vectors
//!
//! ```rust
//! use factom_client_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use factom_client_testkit::generators::EntryParams;
//!
//! proptest! {
//!     #[test]
//!     fn entry_hash_is_deterministic(params: EntryParams) {
//!         prop_assert_eq!(params.entry().hash()?, params.entry().hash()?);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use factom_client_testkit::fixtures::{identity_key, TestNetwork};
//!
//! let network = TestNetwork::new();
//! let key = identity_key(1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    ec_payer, identity_key, init_tracing, ObservedEvent, RecordingObserver, TestNetwork,
};
pub use generators::EntryParams;
pub use vectors::{address_vectors, entry_vectors, verify_all_vectors, AddressVector, EntryVector};
