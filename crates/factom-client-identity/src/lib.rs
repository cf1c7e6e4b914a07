//! # Factom Client Identity
//!
//! Identity chains: their entry formats, DIDs, and the replay that turns a
//! chain's history into the identity's current key list.
//!
//! ## Overview
//!
//! An identity is not stored as mutable state anywhere. Its creation entry
//! lists the initial keys, and later key replacement entries swap one key for
//! another. [`reduce_identity`] replays those entries oldest first to compute
//! an [`IdentitySnapshot`].
//!
//! ## Key Authority
//!
//! Keys are ordered by authority, index 0 being the strongest. A replacement
//! is only honoured when it is signed by an active key that strictly outranks
//! the key being replaced. Entries that break this rule, or carry a bad
//! signature, are skipped without failing the whole replay.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use factom_client_identity::{creation_entry, reduce_identity, ChainEntry, Cutoff};
//!
//! // let chain = creation_entry([&b"alice"[..]], vec![idpub_1, idpub_2])?;
//! // let entries: Vec<ChainEntry> = fetch_from_node(chain.chain_id());
//! // let snapshot = reduce_identity(chain.chain_id(), &entries, Cutoff::default())?;
//! ```

pub mod did;
pub mod entries;
pub mod error;
pub mod state;

pub use did::{Did, DID_PREFIX};
pub use entries::{
    creation_entry, key_replacement_entry, parse_identity_key, replacement_message,
    IdentityCreation, IdentityEntry, KeyReplacement, IDENTITY_CHAIN_MARKER, REPLACE_KEY_MARKER,
};
pub use error::{EntryRejection, IdentityError, Result};
pub use state::{reduce_identity, ChainEntry, Cutoff, IdentitySnapshot, RejectedEntry};
