//! Identity chain entry formats.
//!
//! An identity chain starts with a creation entry:
//!
//! ```text
//! ext_ids: ["IdentityChain", name_part_1, name_part_2, ...]
//! content: {"version": 1, "keys": ["idpub...", "idpub...", ...]}
//! ```
//!
//! Keys are listed in order of decreasing authority. Later entries may
//! replace a key:
//!
//! ```text
//! ext_ids: ["ReplaceKey", old_idpub, new_idpub, signature(64 bytes), signer_idpub]
//! ```
//!
//! where the signature is over the UTF-8 bytes of
//! `chain_id_hex || old_idpub || new_idpub`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use factom_client_core::{
    Address, AddressType, Chain, ChainId, Ed25519Signature, Entry, ValidationError,
};

use crate::error::{EntryRejection, IdentityError, Result};

/// First external id of a creation entry.
pub const IDENTITY_CHAIN_MARKER: &[u8] = b"IdentityChain";

/// First external id of a key replacement entry.
pub const REPLACE_KEY_MARKER: &[u8] = b"ReplaceKey";

/// Creation content version understood by this crate.
pub const IDENTITY_CONTENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CreationContent {
    version: u32,
    keys: Vec<String>,
}

/// Decoded creation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCreation {
    /// External ids after the marker.
    pub name: Vec<Bytes>,
    /// Initial keys, highest authority first.
    pub keys: Vec<Address>,
}

impl IdentityCreation {
    pub fn new(name: Vec<Bytes>, keys: Vec<Address>) -> Result<Self> {
        let creation = Self { name, keys };
        creation.check_keys()?;
        Ok(creation)
    }

    /// Decode a chain's first entry.
    pub fn decode(entry: &Entry) -> Result<Self> {
        if entry.ext_id(0) != Some(IDENTITY_CHAIN_MARKER) {
            return Err(IdentityError::MalformedIdentityChain(
                "first entry is not an IdentityChain entry".into(),
            ));
        }

        let content: CreationContent = serde_json::from_slice(entry.content())
            .map_err(|e| IdentityError::MalformedIdentityChain(format!("content: {e}")))?;
        if content.version != IDENTITY_CONTENT_VERSION {
            return Err(IdentityError::MalformedIdentityChain(format!(
                "unsupported identity version {}",
                content.version
            )));
        }

        let keys = content
            .keys
            .iter()
            .map(|k| parse_identity_key(k))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| IdentityError::MalformedIdentityChain(e.to_string()))?;

        let creation = Self {
            name: entry.ext_ids()[1..].to_vec(),
            keys,
        };
        creation
            .check_keys()
            .map_err(|e| IdentityError::MalformedIdentityChain(e.to_string()))?;
        Ok(creation)
    }

    /// Build the identity chain whose first entry is this creation entry.
    pub fn to_chain(&self) -> Result<Chain> {
        let content = CreationContent {
            version: IDENTITY_CONTENT_VERSION,
            keys: self.keys.iter().map(|k| k.as_str().to_owned()).collect(),
        };
        let content = serde_json::to_vec(&content)
            .map_err(|e| ValidationError::MalformedEntry(e.to_string()))?;

        let mut ext_ids = Vec::with_capacity(self.name.len() + 1);
        ext_ids.push(Bytes::from_static(IDENTITY_CHAIN_MARKER));
        ext_ids.extend(self.name.iter().cloned());
        Ok(Chain::new(ext_ids, content)?)
    }

    fn check_keys(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(IdentityError::InvalidKey("an identity needs at least one key".into()));
        }
        for (i, key) in self.keys.iter().enumerate() {
            key.assert_type(AddressType::IdentityPublic)?;
            if self.keys[..i].contains(key) {
                return Err(IdentityError::InvalidKey(format!("duplicate key {key}")));
            }
        }
        Ok(())
    }
}

/// Decoded key replacement entry. Keys are kept as text until the reducer
/// validates them against the active key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReplacement {
    pub old_key: String,
    pub new_key: String,
    pub signature: Ed25519Signature,
    pub signer_key: String,
}

impl KeyReplacement {
    fn decode(entry: &Entry) -> std::result::Result<Self, EntryRejection> {
        let ext_ids = entry.ext_ids();
        if ext_ids.len() != 5 {
            return Err(EntryRejection::Malformed(format!(
                "expected 5 external ids, got {}",
                ext_ids.len()
            )));
        }
        let text = |i: usize| {
            std::str::from_utf8(&ext_ids[i])
                .map(str::to_owned)
                .map_err(|_| EntryRejection::Malformed(format!("external id {i} is not UTF-8")))
        };
        let signature = Ed25519Signature::from_slice(&ext_ids[3])
            .map_err(|e| EntryRejection::Malformed(e.to_string()))?;

        Ok(Self {
            old_key: text(1)?,
            new_key: text(2)?,
            signature,
            signer_key: text(4)?,
        })
    }
}

/// Classification of an identity chain entry after the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEntry {
    KeyReplacement(KeyReplacement),
    /// Marked as a key replacement but structurally broken.
    MalformedReplacement(EntryRejection),
    /// Any other entry, including a repeated creation entry; ignored by
    /// the reducer.
    Unrecognized,
}

impl IdentityEntry {
    /// Classify an entry that is not the chain's first entry.
    pub fn decode_update(entry: &Entry) -> Self {
        if entry.ext_id(0) != Some(REPLACE_KEY_MARKER) {
            return Self::Unrecognized;
        }
        match KeyReplacement::decode(entry) {
            Ok(replacement) => Self::KeyReplacement(replacement),
            Err(rejection) => Self::MalformedReplacement(rejection),
        }
    }
}

/// Build a new identity chain from a name and its initial public keys.
pub fn creation_entry<I, E>(name: I, keys: Vec<Address>) -> Result<Chain>
where
    I: IntoIterator<Item = E>,
    E: Into<Bytes>,
{
    IdentityCreation::new(name.into_iter().map(Into::into).collect(), keys)?.to_chain()
}

/// Message signed by a key replacement.
pub fn replacement_message(chain_id: &ChainId, old_key: &str, new_key: &str) -> Vec<u8> {
    let mut message = chain_id.to_hex().into_bytes();
    message.extend_from_slice(old_key.as_bytes());
    message.extend_from_slice(new_key.as_bytes());
    message
}

/// Build a signed key replacement entry.
///
/// `signer` must be the `idsec` of a key that outranks `old_key`.
pub fn key_replacement_entry(
    chain_id: &ChainId,
    old_key: &Address,
    new_key: &Address,
    signer: &Address,
) -> Result<Entry> {
    old_key.assert_type(AddressType::IdentityPublic)?;
    new_key.assert_type(AddressType::IdentityPublic)?;
    signer.assert_type(AddressType::IdentitySecret)?;

    let message = replacement_message(chain_id, old_key.as_str(), new_key.as_str());
    let signature = signer.keypair()?.sign(&message);
    let signer_public = signer.public_address()?;

    Ok(Entry::new(
        *chain_id,
        [
            Bytes::from_static(REPLACE_KEY_MARKER),
            Bytes::from(old_key.as_str().to_owned()),
            Bytes::from(new_key.as_str().to_owned()),
            Bytes::copy_from_slice(signature.as_bytes()),
            Bytes::from(signer_public.as_str().to_owned()),
        ],
        Bytes::new(),
    ))
}

/// Parse text that must be an `idpub` address.
pub fn parse_identity_key(text: &str) -> std::result::Result<Address, EntryRejection> {
    let address =
        Address::parse(text).map_err(|_| EntryRejection::InvalidKey(text.to_owned()))?;
    address
        .assert_type(AddressType::IdentityPublic)
        .map_err(|_| EntryRejection::InvalidKey(text.to_owned()))?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use factom_client_core::{compute_chain_id, KeyFamily};

    fn identity_keys(n: usize) -> Vec<Address> {
        (0..n)
            .map(|_| Address::generate(KeyFamily::Identity).public_address().unwrap())
            .collect()
    }

    #[test]
    fn test_creation_roundtrip() {
        let creation =
            IdentityCreation::new(vec![Bytes::from_static(b"alice")], identity_keys(3)).unwrap();
        let chain = creation.to_chain().unwrap();

        assert_eq!(chain.first_entry().ext_id(0), Some(IDENTITY_CHAIN_MARKER));
        assert_eq!(
            chain.chain_id(),
            &compute_chain_id(&[&b"IdentityChain"[..], &b"alice"[..]])
        );
        assert_eq!(IdentityCreation::decode(chain.first_entry()).unwrap(), creation);
    }

    #[test]
    fn test_creation_entry_builder() {
        let keys = identity_keys(2);
        let chain = creation_entry([&b"bob"[..], &b"smith"[..]], keys.clone()).unwrap();
        let decoded = IdentityCreation::decode(chain.first_entry()).unwrap();
        assert_eq!(decoded.keys, keys);
        assert_eq!(decoded.name.len(), 2);
    }

    #[test]
    fn test_creation_rejects_secret_keys() {
        let secret = Address::generate(KeyFamily::Identity);
        assert!(IdentityCreation::new(vec![], vec![secret]).is_err());
    }

    #[test]
    fn test_creation_rejects_duplicates_and_empty() {
        let key = identity_keys(1).remove(0);
        assert!(IdentityCreation::new(vec![], vec![key.clone(), key]).is_err());
        assert!(IdentityCreation::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_decode_rejects_other_first_entry() {
        let chain = Chain::new([&b"NotAnIdentity"[..]], &b"{}"[..]).unwrap();
        assert!(matches!(
            IdentityCreation::decode(chain.first_entry()),
            Err(IdentityError::MalformedIdentityChain(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_content() {
        let contents: [&'static [u8]; 3] = [
            b"not json",
            br#"{"version":2,"keys":[]}"#,
            br#"{"version":1,"keys":["idpubnope"]}"#,
        ];
        for content in contents {
            let chain = Chain::new([IDENTITY_CHAIN_MARKER], content).unwrap();
            assert!(matches!(
                IdentityCreation::decode(chain.first_entry()),
                Err(IdentityError::MalformedIdentityChain(_))
            ));
        }
    }

    #[test]
    fn test_replacement_entry_signature() {
        let signer = Address::generate(KeyFamily::Identity);
        let keys = identity_keys(2);
        let chain_id = ChainId::from_bytes([3; 32]);

        let entry = key_replacement_entry(&chain_id, &keys[0], &keys[1], &signer).unwrap();
        let IdentityEntry::KeyReplacement(decoded) = IdentityEntry::decode_update(&entry) else {
            panic!("expected a key replacement");
        };

        assert_eq!(decoded.old_key, keys[0].as_str());
        assert_eq!(decoded.signer_key, signer.public_address().unwrap().as_str());
        let message = replacement_message(&chain_id, &decoded.old_key, &decoded.new_key);
        signer
            .public_key()
            .unwrap()
            .verify(&message, &decoded.signature)
            .expect("signature should verify");
    }

    #[test]
    fn test_update_classification() {
        let chain_id = ChainId::ZERO;
        let other = Entry::new(chain_id, [&b"Something"[..]], &b""[..]);
        assert_eq!(IdentityEntry::decode_update(&other), IdentityEntry::Unrecognized);

        // A second creation entry carries no authority.
        let again = creation_entry([&b"alice"[..]], identity_keys(2)).unwrap();
        assert_eq!(
            IdentityEntry::decode_update(again.first_entry()),
            IdentityEntry::Unrecognized
        );

        let short = Entry::new(chain_id, [REPLACE_KEY_MARKER, &b"a"[..]], &b""[..]);
        assert!(matches!(
            IdentityEntry::decode_update(&short),
            IdentityEntry::MalformedReplacement(EntryRejection::Malformed(_))
        ));
    }
}
