//! Identity state computation.
//!
//! An identity's active key list is computed by replaying its chain from the
//! creation entry forward. Nothing is cached between calls: a query with a
//! different height or time cutoff sees a different set of entries, so the
//! fold is always run in full.

use bytes::Bytes;

use factom_client_core::{Address, ChainId, Entry, EntryHash};

use crate::entries::{
    parse_identity_key, replacement_message, IdentityCreation, IdentityEntry, KeyReplacement,
};
use crate::error::{EntryRejection, IdentityError, Result};

/// A chain entry annotated with the directory block it was included in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub entry: Entry,
    pub entry_hash: EntryHash,
    pub block_height: u64,
    /// Block timestamp, seconds since the Unix epoch.
    pub timestamp: u64,
}

/// Upper bounds on which entries participate in a reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cutoff {
    pub max_height: Option<u64>,
    pub max_timestamp: Option<u64>,
}

impl Cutoff {
    pub fn new(max_height: Option<u64>, max_timestamp: Option<u64>) -> Self {
        Self {
            max_height,
            max_timestamp,
        }
    }

    /// Whether an entry at this position is included.
    pub fn admits(&self, entry: &ChainEntry) -> bool {
        self.max_height.map_or(true, |h| entry.block_height <= h)
            && self.max_timestamp.map_or(true, |t| entry.timestamp <= t)
    }
}

/// A key replacement that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub entry_hash: EntryHash,
    pub block_height: u64,
    pub reason: EntryRejection,
}

/// The state of an identity at a point in its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub chain_id: ChainId,
    /// Creation entry external ids after the marker.
    pub name: Vec<Bytes>,
    /// Active keys, highest authority first.
    pub keys: Vec<Address>,
    pub created_height: u64,
    pub created_timestamp: u64,
    pub updated_height: u64,
    pub updated_timestamp: u64,
    /// Key replacements skipped during the fold.
    pub rejected: Vec<RejectedEntry>,
}

impl IdentitySnapshot {
    /// Start a snapshot from the creation entry.
    fn created(chain_id: ChainId, creation: IdentityCreation, at: &ChainEntry) -> Self {
        Self {
            chain_id,
            name: creation.name,
            keys: creation.keys,
            created_height: at.block_height,
            created_timestamp: at.timestamp,
            updated_height: at.block_height,
            updated_timestamp: at.timestamp,
            rejected: Vec::new(),
        }
    }

    /// Position of a key in the active list (0 is the highest authority).
    pub fn key_index(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.as_str() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index(key).is_some()
    }

    /// Active keys as text.
    pub fn key_strings(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.as_str()).collect()
    }

    /// Validate a key replacement against the current state and apply it.
    ///
    /// On error the snapshot is left untouched.
    pub fn apply_replacement(
        &mut self,
        replacement: &KeyReplacement,
        at: &ChainEntry,
    ) -> std::result::Result<(), EntryRejection> {
        let signer = parse_identity_key(&replacement.signer_key)?;
        let signer_key = signer
            .public_key()
            .map_err(|_| EntryRejection::InvalidKey(replacement.signer_key.clone()))?;
        let message =
            replacement_message(&self.chain_id, &replacement.old_key, &replacement.new_key);
        signer_key
            .verify(&message, &replacement.signature)
            .map_err(|_| EntryRejection::SignatureVerificationFailure)?;

        parse_identity_key(&replacement.old_key)?;
        let new_key = parse_identity_key(&replacement.new_key)?;

        if replacement.old_key == replacement.new_key {
            return Err(EntryRejection::SameKey);
        }
        let old_index = self
            .key_index(&replacement.old_key)
            .ok_or(EntryRejection::OldKeyNotActive)?;
        if self.contains_key(&replacement.new_key) {
            return Err(EntryRejection::NewKeyAlreadyActive);
        }
        let signer_index = self
            .key_index(&replacement.signer_key)
            .ok_or(EntryRejection::SignerNotActive)?;
        if signer_index == old_index {
            return Err(EntryRejection::SignerIsOldKey);
        }
        if signer_index > old_index {
            return Err(EntryRejection::InvalidKeyOrdering {
                signer_index,
                old_index,
            });
        }

        self.keys[old_index] = new_key;
        self.updated_height = at.block_height;
        self.updated_timestamp = at.timestamp;
        Ok(())
    }
}

/// Replay an identity chain, oldest entry first, into its current snapshot.
///
/// Fails only when the first participating entry is not a valid creation
/// entry. Invalid key replacements are recorded in
/// [`IdentitySnapshot::rejected`] and otherwise ignored.
pub fn reduce_identity(
    chain_id: &ChainId,
    entries: &[ChainEntry],
    cutoff: Cutoff,
) -> Result<IdentitySnapshot> {
    let mut participating = entries.iter().filter(|e| cutoff.admits(e));

    let first = participating.next().ok_or_else(|| {
        IdentityError::MalformedIdentityChain("no entries within the requested range".into())
    })?;
    if first.entry.chain_id() != chain_id {
        return Err(IdentityError::MalformedIdentityChain(format!(
            "first entry belongs to chain {}",
            first.entry.chain_id()
        )));
    }
    let creation = IdentityCreation::decode(&first.entry)?;
    let mut snapshot = IdentitySnapshot::created(*chain_id, creation, first);

    for chain_entry in participating {
        let replacement = match IdentityEntry::decode_update(&chain_entry.entry) {
            IdentityEntry::KeyReplacement(replacement) => replacement,
            IdentityEntry::MalformedReplacement(reason) => {
                reject(&mut snapshot, chain_entry, reason);
                continue;
            }
            IdentityEntry::Unrecognized => continue,
        };

        if let Err(reason) = snapshot.apply_replacement(&replacement, chain_entry) {
            reject(&mut snapshot, chain_entry, reason);
        }
    }

    Ok(snapshot)
}

fn reject(snapshot: &mut IdentitySnapshot, at: &ChainEntry, reason: EntryRejection) {
    tracing::debug!(
        "skipping identity entry {} at height {}: {}",
        at.entry_hash,
        at.block_height,
        reason
    );
    snapshot.rejected.push(RejectedEntry {
        entry_hash: at.entry_hash,
        block_height: at.block_height,
        reason,
    });
}
