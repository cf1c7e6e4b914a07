//! Commit messages.
//!
//! A commit pays for an entry (or chain) and binds the payer to its hash
//! before the content itself is revealed.
//!
//! ```text
//! entry commit: version(1) || millis(6) || entry_hash(32) || cost(1) || pubkey(32) || sig(64)
//! chain commit: version(1) || millis(6) || chain_id_hash(32) || weld(32) || entry_hash(32)
//!               || cost(1) || pubkey(32) || sig(64)
//! ```
//!
//! The signature covers every byte before the public key. `chain_id_hash` is
//! `SHA256d(chain_id)` and `weld` is `SHA256d(entry_hash || chain_id)`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::address::{Address, KeyFamily, Visibility};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::encoding::sha256d;
use crate::entry::{Chain, Entry};
use crate::error::ValidationError;
use crate::types::{ChainId, EntryHash};

/// Commit message version.
pub const COMMIT_VERSION: u8 = 0;

/// Length of a signed entry commit.
pub const ENTRY_COMMIT_LEN: usize = 136;

/// Length of a signed chain commit.
pub const CHAIN_COMMIT_LEN: usize = 200;

const TIMESTAMP_LEN: usize = 6;
const SIGNATURE_TAIL_LEN: usize = 32 + 64;

/// Source of the commit timestamp.
///
/// Commit building is pure except for this input, so tests inject a fixed one.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Lowest six bytes of the millisecond timestamp, big-endian.
pub fn timestamp_bytes(millis: u64) -> [u8; TIMESTAMP_LEN] {
    let full = millis.to_be_bytes();
    let mut out = [0u8; TIMESTAMP_LEN];
    out.copy_from_slice(&full[8 - TIMESTAMP_LEN..]);
    out
}

/// Build and sign the commit for an entry on an existing chain.
pub fn build_entry_commit(
    entry: &Entry,
    payer: &Address,
    clock: &dyn Clock,
) -> Result<Vec<u8>, ValidationError> {
    check_payer(payer)?;
    let entry_hash = entry.hash()?;
    let cost = entry.cost()?;

    let mut message = Vec::with_capacity(ENTRY_COMMIT_LEN);
    message.push(COMMIT_VERSION);
    message.extend_from_slice(&timestamp_bytes(clock.now_millis()));
    message.extend_from_slice(entry_hash.as_bytes());
    message.push(cost);

    sign_into(message, payer)
}

/// Build and sign the commit for a new chain.
pub fn build_chain_commit(
    chain: &Chain,
    payer: &Address,
    clock: &dyn Clock,
) -> Result<Vec<u8>, ValidationError> {
    check_payer(payer)?;
    let entry_hash = chain.first_entry().hash()?;
    let cost = chain.cost()?;

    let mut message = Vec::with_capacity(CHAIN_COMMIT_LEN);
    message.push(COMMIT_VERSION);
    message.extend_from_slice(&timestamp_bytes(clock.now_millis()));
    message.extend_from_slice(&sha256d(chain.chain_id().as_bytes()));
    message.extend_from_slice(&commit_weld(&entry_hash, chain.chain_id()));
    message.extend_from_slice(entry_hash.as_bytes());
    message.push(cost);

    sign_into(message, payer)
}

/// `SHA256d(entry_hash || chain_id)`.
pub fn commit_weld(entry_hash: &EntryHash, chain_id: &ChainId) -> [u8; 32] {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(entry_hash.as_bytes());
    data[32..].copy_from_slice(chain_id.as_bytes());
    sha256d(&data)
}

fn check_payer(payer: &Address) -> Result<(), ValidationError> {
    payer.assert_family(KeyFamily::EntryCredit)?;
    payer.assert_visibility(Visibility::Private)?;
    Ok(())
}

fn sign_into(mut message: Vec<u8>, payer: &Address) -> Result<Vec<u8>, ValidationError> {
    let keypair = payer.keypair()?;
    let signature = keypair.sign(&message);
    message.extend_from_slice(keypair.public_key().as_bytes());
    message.extend_from_slice(signature.as_bytes());
    Ok(message)
}

/// Chain-specific fields of a chain commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainCommitFields {
    pub chain_id_hash: [u8; 32],
    pub weld: [u8; 32],
}

/// A decoded, signature-checked commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub timestamp_millis: u64,
    pub entry_hash: EntryHash,
    pub cost: u8,
    pub payer: Ed25519PublicKey,
    pub signature: Ed25519Signature,
    /// Present for chain commits.
    pub chain: Option<ChainCommitFields>,
}

impl ParsedCommit {
    pub fn is_chain_commit(&self) -> bool {
        self.chain.is_some()
    }

    /// True when this commit's weld matches the given chain.
    pub fn welds(&self, chain_id: &ChainId) -> bool {
        match &self.chain {
            Some(fields) => {
                fields.chain_id_hash == sha256d(chain_id.as_bytes())
                    && fields.weld == commit_weld(&self.entry_hash, chain_id)
            }
            None => false,
        }
    }
}

/// Decode a commit (entry or chain, told apart by length) and verify its
/// signature.
pub fn verify_commit(data: &[u8]) -> Result<ParsedCommit, ValidationError> {
    let is_chain = match data.len() {
        ENTRY_COMMIT_LEN => false,
        CHAIN_COMMIT_LEN => true,
        other => {
            return Err(ValidationError::MalformedCommit(format!(
                "unexpected commit length {other}"
            )))
        }
    };
    if data[0] != COMMIT_VERSION {
        return Err(ValidationError::UnsupportedVersion(data[0]));
    }

    let signed_len = data.len() - SIGNATURE_TAIL_LEN;
    let (signed, tail) = data.split_at(signed_len);
    let mut payer = [0u8; 32];
    payer.copy_from_slice(&tail[..32]);
    let payer = Ed25519PublicKey::from_bytes(payer);
    let signature = Ed25519Signature::from_slice(&tail[32..])?;
    payer
        .verify(signed, &signature)
        .map_err(|_| ValidationError::SignatureFailed)?;

    let mut ts = [0u8; 8];
    ts[8 - TIMESTAMP_LEN..].copy_from_slice(&signed[1..1 + TIMESTAMP_LEN]);
    let mut cursor = 1 + TIMESTAMP_LEN;

    let chain = if is_chain {
        let mut chain_id_hash = [0u8; 32];
        chain_id_hash.copy_from_slice(&signed[cursor..cursor + 32]);
        let mut weld = [0u8; 32];
        weld.copy_from_slice(&signed[cursor + 32..cursor + 64]);
        cursor += 64;
        Some(ChainCommitFields {
            chain_id_hash,
            weld,
        })
    } else {
        None
    };

    let entry_hash = EntryHash::try_from(&signed[cursor..cursor + 32])
        .map_err(|_| ValidationError::MalformedCommit("entry hash".into()))?;
    let cost = signed[cursor + 32];

    Ok(ParsedCommit {
        timestamp_millis: u64::from_be_bytes(ts),
        entry_hash,
        cost,
        payer,
        signature,
        chain,
    })
}
