//! # Factom Client
//!
//! The unified API for writing to and reading from a Factom network.
//!
//! ## Overview
//!
//! - **Addresses**: `FA`/`Fs`/`EC`/`Es`/`idpub`/`idsec` encoding and key handling
//! - **Entries and chains**: building, hashing and pricing entries
//! - **Submission**: the commit/reveal protocol with acknowledgement polling
//! - **Identities**: resolving an identity's active keys from its chain
//!
//! ## Key Concepts
//!
//! - **Commit**: pays entry credits for an entry hash. Signed by the payer.
//! - **Reveal**: publishes the entry whose hash was committed.
//! - **Acknowledgement**: the node has accepted the entry; confirmation
//!   follows when its directory block is sealed.
//! - **Identity**: a chain whose entries define and rotate a list of keys.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use factom_client::{ClientConfig, FactomClient};
//! use factom_client::core::{Address, Chain};
//! use factom_client::submit::{Composer, MemoryNode};
//!
//! async fn example() {
//!     let node = Arc::new(MemoryNode::new());
//!     let client = FactomClient::new(node.clone(), Composer::online(node), ClientConfig::default());
//!
//!     let payer = Address::parse("Es3Y6U6H1Pfg4wYag8VMtRZEGuEJnfkJ2ZuSyCVcQKweB6y4WvGH").unwrap();
//!     let chain = Chain::new([&b"my-chain"[..]], &b"first entry"[..]).unwrap();
//!
//!     let handle = client.submit_chain(chain, &payer, false, vec![]).await.unwrap();
//!     let result = handle.await.unwrap();
//!     println!("entry {} acknowledged: {}", result.entry_hash, result.is_acknowledged());
//!
//!     // let identity = client.resolve_identity("did:factom:<chain id>", None, None).await?;
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `factom_client::core` - Addresses, entries, commits
//! - `factom_client::identity` - Identity entries, DIDs, key replay
//! - `factom_client::submit` - Submission protocol and node backends

pub mod client;
pub mod error;

// Re-export component crates
pub use factom_client_core as core;
pub use factom_client_identity as identity;
pub use factom_client_submit as submit;

// Re-export main types for convenience
pub use client::{ClientConfig, FactomClient};
pub use error::{ClientError, Result};

// Re-export commonly used types
pub use factom_client_core::{Address, AddressType, Chain, ChainId, Entry, EntryHash, KeyFamily};
pub use factom_client_identity::{Did, IdentitySnapshot};
pub use factom_client_submit::{
    Composer, PollOutcome, SubmissionHandle, SubmissionObserver, SubmissionResult, SubmitConfig,
};
