//! Typed responses, one per node or wallet call.
//!
//! Field names follow the JSON the Factom node (`factomd`) and wallet
//! (`walletd`) return, so a transport can deserialize straight into these.
//! Hashes travel as lowercase hex.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use factom_client_core::encoding::from_hex;
use factom_client_core::{ChainId, EntryHash, TxId};

mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    use factom_client_core::encoding::{from_hex_array, to_hex};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&to_hex(value.as_ref()))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<[u8; 32]>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = from_hex_array::<32>(&text).map_err(serde::de::Error::custom)?;
        Ok(T::from(bytes))
    }
}

/// The pair of payloads produced by composing a chain or entry.
///
/// Deserializes from the wallet's `compose-chain` / `compose-entry` result,
/// which wraps each payload in a ready-to-send JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawComposed")]
pub struct ComposedPayloads {
    /// Signed commit message.
    pub commit: Bytes,
    /// Marshalled entry.
    pub reveal: Bytes,
}

impl ComposedPayloads {
    pub fn new(commit: impl Into<Bytes>, reveal: impl Into<Bytes>) -> Self {
        Self {
            commit: commit.into(),
            reveal: reveal.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawComposed {
    commit: RawRequest,
    reveal: RawRequest,
}

#[derive(Deserialize)]
struct RawRequest {
    params: RawParams,
}

#[derive(Deserialize)]
struct RawParams {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    entry: Option<String>,
}

impl TryFrom<RawComposed> for ComposedPayloads {
    type Error = String;

    fn try_from(raw: RawComposed) -> Result<Self, Self::Error> {
        let commit = raw.commit.params.message.ok_or("commit request has no message")?;
        let reveal = raw.reveal.params.entry.ok_or("reveal request has no entry")?;
        Ok(Self::new(
            from_hex(&commit).map_err(|e| e.to_string())?,
            from_hex(&reveal).map_err(|e| e.to_string())?,
        ))
    }
}

/// Result of `commit-chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitChainResponse {
    pub message: String,
    #[serde(rename = "txid", with = "hex_hash")]
    pub tx_id: TxId,
    #[serde(rename = "entryhash", with = "hex_hash")]
    pub entry_hash: EntryHash,
    /// Double SHA-256 of the new chain id.
    #[serde(rename = "chainidhash", with = "hex_hash")]
    pub chain_id_hash: [u8; 32],
}

/// Result of `commit-entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntryResponse {
    pub message: String,
    #[serde(rename = "txid", with = "hex_hash")]
    pub tx_id: TxId,
    #[serde(rename = "entryhash", with = "hex_hash")]
    pub entry_hash: EntryHash,
}

/// Either commit result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResponse {
    Chain(CommitChainResponse),
    Entry(CommitEntryResponse),
}

impl CommitResponse {
    pub fn tx_id(&self) -> &TxId {
        match self {
            Self::Chain(r) => &r.tx_id,
            Self::Entry(r) => &r.tx_id,
        }
    }

    pub fn entry_hash(&self) -> &EntryHash {
        match self {
            Self::Chain(r) => &r.entry_hash,
            Self::Entry(r) => &r.entry_hash,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Chain(r) => &r.message,
            Self::Entry(r) => &r.message,
        }
    }
}

/// Result of `reveal-chain` / `reveal-entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResponse {
    pub message: String,
    #[serde(rename = "entryhash", with = "hex_hash")]
    pub entry_hash: EntryHash,
    #[serde(rename = "chainid", with = "hex_hash")]
    pub chain_id: ChainId,
}

/// Network acknowledgement level of a commit or entry.
///
/// Ordered from least to most final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    Unknown,
    NotConfirmed,
    #[serde(rename = "TransactionACK")]
    TransactionAck,
    DBlockConfirmed,
}

/// Status block inside an ack response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckData {
    pub status: AckStatus,
}

/// Result of `ack` for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(rename = "entryhash", with = "hex_hash")]
    pub entry_hash: EntryHash,
    #[serde(rename = "commitdata")]
    pub commit_data: AckData,
    #[serde(rename = "entrydata")]
    pub entry_data: AckData,
}

impl AckResponse {
    pub fn new(entry_hash: EntryHash, commit: AckStatus, entry: AckStatus) -> Self {
        Self {
            entry_hash,
            commit_data: AckData { status: commit },
            entry_data: AckData { status: entry },
        }
    }

    /// The status polling decisions are made on: that of the revealed entry.
    pub fn status(&self) -> AckStatus {
        self.entry_data.status
    }
}

/// Header of an entry block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlockHeader {
    #[serde(rename = "chainid", with = "hex_hash")]
    pub chain_id: ChainId,
    /// Directory block height the entry block belongs to.
    #[serde(rename = "dbheight")]
    pub height: u64,
    /// Block time, seconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(rename = "blocksequencenumber")]
    pub sequence: u64,
}

/// An entry reference inside an entry block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlockEntry {
    #[serde(rename = "entryhash", with = "hex_hash")]
    pub entry_hash: EntryHash,
    pub timestamp: u64,
}

/// A block of one chain's entries, as returned by `entry-block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBlock {
    pub header: EntryBlockHeader,
    #[serde(rename = "entrylist")]
    pub entries: Vec<EntryBlockEntry>,
}

impl EntryBlock {
    pub fn height(&self) -> u64 {
        self.header.height
    }
}
