//! Entries and chains.
//!
//! An entry is content plus an ordered list of external ids, appended to a
//! chain. A chain is created by its first entry; the chain id is derived from
//! that entry's external ids.
//!
//! Marshalled entry layout:
//!
//! ```text
//! version(1) || chain_id(32) || ext_ids_len(2, BE) || { len(2, BE) || ext_id }* || content
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::encoding::{sha256, sha512};
use crate::error::ValidationError;
use crate::types::{ChainId, EntryHash};

/// Entry format version.
pub const ENTRY_VERSION: u8 = 0;

/// Bytes preceding the external ids: version, chain id, ext id length.
pub const ENTRY_HEADER_LEN: usize = 35;

/// Largest payload (marshalled length minus header) the network accepts.
pub const MAX_ENTRY_PAYLOAD: usize = 10 * 1024;

/// Entry credits charged per started KiB of payload.
pub const BYTES_PER_CREDIT: usize = 1024;

/// Extra entry credits charged for creating a chain.
pub const CHAIN_CREATION_FEE: u8 = 10;

/// An entry to be appended to an existing chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    chain_id: ChainId,
    ext_ids: Vec<Bytes>,
    content: Bytes,
}

impl Entry {
    pub fn new<I, E>(chain_id: ChainId, ext_ids: I, content: impl Into<Bytes>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Bytes>,
    {
        Self {
            chain_id,
            ext_ids: ext_ids.into_iter().map(Into::into).collect(),
            content: content.into(),
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn ext_ids(&self) -> &[Bytes] {
        &self.ext_ids
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// External id at `index` if present.
    pub fn ext_id(&self, index: usize) -> Option<&[u8]> {
        self.ext_ids.get(index).map(|b| b.as_ref())
    }

    /// Size of everything after the fixed header.
    pub fn payload_len(&self) -> usize {
        self.ext_ids.iter().map(|e| 2 + e.len()).sum::<usize>() + self.content.len()
    }

    /// Serialize to the network format.
    pub fn marshal(&self) -> Result<Vec<u8>, ValidationError> {
        let ext_len = self.ext_ids.iter().map(|e| 2 + e.len()).sum::<usize>();
        let ext_len = u16::try_from(ext_len).map_err(|_| ValidationError::PayloadTooLarge {
            size: self.payload_len(),
            max: MAX_ENTRY_PAYLOAD,
        })?;

        let mut out = Vec::with_capacity(ENTRY_HEADER_LEN + self.payload_len());
        out.push(ENTRY_VERSION);
        out.extend_from_slice(self.chain_id.as_bytes());
        out.extend_from_slice(&ext_len.to_be_bytes());
        for ext_id in &self.ext_ids {
            let len = u16::try_from(ext_id.len())
                .map_err(|_| ValidationError::ExtIdTooLong(ext_id.len()))?;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(ext_id);
        }
        out.extend_from_slice(&self.content);
        Ok(out)
    }

    /// Parse the network format.
    pub fn unmarshal(data: &[u8]) -> Result<Self, ValidationError> {
        if data.len() < ENTRY_HEADER_LEN {
            return Err(ValidationError::MalformedEntry(format!(
                "{} bytes is shorter than the entry header",
                data.len()
            )));
        }
        if data[0] != ENTRY_VERSION {
            return Err(ValidationError::UnsupportedVersion(data[0]));
        }

        let mut chain_id = [0u8; 32];
        chain_id.copy_from_slice(&data[1..33]);
        let ext_len = u16::from_be_bytes([data[33], data[34]]) as usize;
        let rest = &data[ENTRY_HEADER_LEN..];
        if ext_len > rest.len() {
            return Err(ValidationError::MalformedEntry(
                "external ids run past the end of the entry".into(),
            ));
        }

        let (mut ext_bytes, content) = rest.split_at(ext_len);
        let mut ext_ids = Vec::new();
        while !ext_bytes.is_empty() {
            if ext_bytes.len() < 2 {
                return Err(ValidationError::MalformedEntry("truncated ext id length".into()));
            }
            let len = u16::from_be_bytes([ext_bytes[0], ext_bytes[1]]) as usize;
            let body = &ext_bytes[2..];
            if len > body.len() {
                return Err(ValidationError::MalformedEntry("truncated ext id".into()));
            }
            ext_ids.push(Bytes::copy_from_slice(&body[..len]));
            ext_bytes = &body[len..];
        }

        Ok(Self {
            chain_id: ChainId::from_bytes(chain_id),
            ext_ids,
            content: Bytes::copy_from_slice(content),
        })
    }

    /// `SHA256(SHA512(marshalled) || marshalled)`.
    pub fn hash(&self) -> Result<EntryHash, ValidationError> {
        Ok(hash_marshalled(&self.marshal()?))
    }

    /// Entry credits this entry costs.
    pub fn cost(&self) -> Result<u8, ValidationError> {
        entry_cost(self.payload_len())
    }
}

/// The first entry of a new chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    first_entry: Entry,
}

impl Chain {
    /// Build a chain, deriving its id from the external ids.
    pub fn new<I, E>(ext_ids: I, content: impl Into<Bytes>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Bytes>,
    {
        let ext_ids: Vec<Bytes> = ext_ids.into_iter().map(Into::into).collect();
        if ext_ids.is_empty() {
            return Err(ValidationError::MissingChainExtIds);
        }
        let chain_id = compute_chain_id(&ext_ids);
        Ok(Self {
            first_entry: Entry::new(chain_id, ext_ids, content),
        })
    }

    /// Treat an existing entry as a chain's first entry, checking its id.
    pub fn from_entry(entry: Entry) -> Result<Self, ValidationError> {
        if entry.ext_ids.is_empty() {
            return Err(ValidationError::MissingChainExtIds);
        }
        let derived = compute_chain_id(&entry.ext_ids);
        if derived != entry.chain_id {
            return Err(ValidationError::ChainIdMismatch {
                expected: entry.chain_id.to_hex(),
                derived: derived.to_hex(),
            });
        }
        Ok(Self { first_entry: entry })
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.first_entry.chain_id
    }

    pub fn first_entry(&self) -> &Entry {
        &self.first_entry
    }

    pub fn into_entry(self) -> Entry {
        self.first_entry
    }

    /// Entry cost of the first entry plus the chain creation fee.
    pub fn cost(&self) -> Result<u8, ValidationError> {
        Ok(self.first_entry.cost()? + CHAIN_CREATION_FEE)
    }
}

/// `SHA256(SHA256(ext_id_1) || SHA256(ext_id_2) || ...)`.
pub fn compute_chain_id<E: AsRef<[u8]>>(ext_ids: &[E]) -> ChainId {
    let mut concat = Vec::with_capacity(ext_ids.len() * 32);
    for ext_id in ext_ids {
        concat.extend_from_slice(&sha256(ext_id.as_ref()));
    }
    ChainId::from_bytes(sha256(&concat))
}

/// Hash of an already marshalled entry.
pub fn hash_marshalled(marshalled: &[u8]) -> EntryHash {
    let mut data = Vec::with_capacity(64 + marshalled.len());
    data.extend_from_slice(&sha512(marshalled));
    data.extend_from_slice(marshalled);
    EntryHash::from_bytes(sha256(&data))
}

/// `ceil(payload_len / 1024)`, at least 1.
pub fn entry_cost(payload_len: usize) -> Result<u8, ValidationError> {
    if payload_len > MAX_ENTRY_PAYLOAD {
        return Err(ValidationError::PayloadTooLarge {
            size: payload_len,
            max: MAX_ENTRY_PAYLOAD,
        });
    }
    let credits = payload_len.div_ceil(BYTES_PER_CREDIT).max(1);
    // At most 10 given the bound above.
    Ok(credits as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chain_id_derivation() {
        let chain = Chain::new([&b"test"[..], &b"chain"[..]], &b"hello"[..]).unwrap();
        let mut concat = Vec::new();
        concat.extend_from_slice(&sha256(b"test"));
        concat.extend_from_slice(&sha256(b"chain"));
        assert_eq!(chain.chain_id().as_bytes(), &sha256(&concat));
    }

    #[test]
    fn test_chain_needs_ext_ids() {
        let empty: Vec<Vec<u8>> = vec![];
        assert!(matches!(
            Chain::new(empty, &b"x"[..]),
            Err(ValidationError::MissingChainExtIds)
        ));
    }

    #[test]
    fn test_from_entry_checks_chain_id() {
        let entry = Entry::new(ChainId::ZERO, [&b"a"[..]], &b""[..]);
        assert!(matches!(
            Chain::from_entry(entry),
            Err(ValidationError::ChainIdMismatch { .. })
        ));
    }

    #[test]
    fn test_marshal_layout() {
        let chain_id = ChainId::from_bytes([0x11; 32]);
        let entry = Entry::new(chain_id, [&b"ab"[..], &b"c"[..]], &b"xyz"[..]);
        let bytes = entry.marshal().unwrap();

        assert_eq!(bytes[0], ENTRY_VERSION);
        assert_eq!(&bytes[1..33], &[0x11; 32]);
        assert_eq!(&bytes[33..35], &[0, 7]);
        assert_eq!(&bytes[35..], &[0, 2, b'a', b'b', 0, 1, b'c', b'x', b'y', b'z']);
        assert_eq!(bytes.len() - ENTRY_HEADER_LEN, entry.payload_len());
    }

    #[test]
    fn test_unmarshal_rejects_truncation() {
        let entry = Entry::new(ChainId::ZERO, [&b"abc"[..]], &b""[..]);
        let bytes = entry.marshal().unwrap();
        assert!(Entry::unmarshal(&bytes[..bytes.len() - 1]).is_err());
        assert!(Entry::unmarshal(&bytes[..10]).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 1;
        assert!(matches!(
            Entry::unmarshal(&wrong_version),
            Err(ValidationError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_cost_boundaries() {
        assert_eq!(entry_cost(0).unwrap(), 1);
        assert_eq!(entry_cost(1).unwrap(), 1);
        assert_eq!(entry_cost(1024).unwrap(), 1);
        assert_eq!(entry_cost(1025).unwrap(), 2);
        assert_eq!(entry_cost(MAX_ENTRY_PAYLOAD).unwrap(), 10);
        assert!(matches!(
            entry_cost(MAX_ENTRY_PAYLOAD + 1),
            Err(ValidationError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_chain_cost_adds_fee() {
        let chain = Chain::new([&b"x"[..]], vec![0u8; 2000]).unwrap();
        assert_eq!(chain.cost().unwrap(), 2 + CHAIN_CREATION_FEE);
    }

    proptest! {
        #[test]
        fn test_cost_monotonic(a in 0usize..=MAX_ENTRY_PAYLOAD, b in 0usize..=MAX_ENTRY_PAYLOAD) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let small_cost = entry_cost(small).unwrap();
            prop_assert!(small_cost >= 1);
            prop_assert!(small_cost <= entry_cost(large).unwrap());
        }

        #[test]
        fn test_unmarshal_inverts_marshal(
            chain_id in any::<[u8; 32]>(),
            ext_ids in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..5),
            content in prop::collection::vec(any::<u8>(), 0..200),
        ) {
            let entry = Entry::new(ChainId::from_bytes(chain_id), ext_ids, content);
            let bytes = entry.marshal().unwrap();
            prop_assert_eq!(Entry::unmarshal(&bytes).unwrap(), entry);
        }
    }
}
