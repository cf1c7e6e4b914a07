//! # Factom Client Core
//!
//! Pure primitives for the Factom client: encodings, addresses, entries and
//! commit messages.
//!
//! This crate contains no I/O, no networking and no async code. Every
//! function is deterministic apart from the commit timestamp, which is read
//! through an injectable [`Clock`].
//!
//! ## Key Types
//!
//! - [`Address`] - A validated `FA`/`Fs`/`EC`/`Es`/`idpub`/`idsec` address
//! - [`Rcd`] - Redeem condition behind a Factoid public address
//! - [`Entry`] / [`Chain`] - Content plus external ids, and a chain's first entry
//! - [`ChainId`] / [`EntryHash`] - 32-byte protocol hashes
//!
//! ## Commit Messages
//!
//! [`build_entry_commit`] and [`build_chain_commit`] produce the signed
//! binary payload that pays for an entry before it is revealed. See the
//! [`commit`] module for the byte layout.

pub mod address;
pub mod commit;
pub mod crypto;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod rcd;
pub mod types;
pub mod validation;

pub use address::{
    assert_type, assert_visibility, decode_address, encode_hex_key, encode_key,
    is_valid_address, Address, AddressType, KeyFamily, Visibility,
};
pub use commit::{
    build_chain_commit, build_entry_commit, verify_commit, Clock, FixedClock, ParsedCommit,
    SystemClock,
};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
pub use entry::{compute_chain_id, entry_cost, Chain, Entry, MAX_ENTRY_PAYLOAD};
pub use error::{CoreError, ValidationError};
pub use rcd::Rcd;
pub use types::{ChainId, EntryHash, TxId};
pub use validation::{validate_chain, validate_entry};
