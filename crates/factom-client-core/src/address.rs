//! Human-facing addresses.
//!
//! Every address is `base58(prefix_bytes || key || checksum)` where the
//! checksum is the first four bytes of `doubleSHA256(prefix_bytes || key)`.
//! The prefix bytes are chosen so the Base58 text starts with a readable
//! marker:
//!
//! | type | text prefix | prefix bytes |
//! |---|---|---|
//! | Factoid public | `FA` | `5f b1` |
//! | Factoid secret | `Fs` | `64 78` |
//! | Entry Credit public | `EC` | `59 2a` |
//! | Entry Credit secret | `Es` | `5d b6` |
//! | Identity public | `idpub` | `03 45 ef 9d e0` |
//! | Identity secret | `idsec` | `03 45 f3 d0 d6` |
//!
//! The key material of a Factoid public address is the RCD-1 redeem hash of
//! the Ed25519 public key, not the key itself. All other types carry the
//! 32-byte key verbatim (the seed for secret types).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::{Ed25519PublicKey, Keypair};
use crate::encoding::{from_base58, from_hex, sha256d, to_base58};
use crate::error::CoreError;
use crate::rcd::Rcd;

/// Length of the key material carried by every address.
pub const KEY_LEN: usize = 32;

/// Length of the trailing checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Public or private half of a key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

/// The key family an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    Factoid,
    EntryCredit,
    Identity,
}

/// Every address shape the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    FactoidPublic,
    FactoidSecret,
    EntryCreditPublic,
    EntryCreditSecret,
    IdentityPublic,
    IdentitySecret,
}

impl AddressType {
    /// All address types.
    pub const ALL: [AddressType; 6] = [
        AddressType::FactoidPublic,
        AddressType::FactoidSecret,
        AddressType::EntryCreditPublic,
        AddressType::EntryCreditSecret,
        AddressType::IdentityPublic,
        AddressType::IdentitySecret,
    ];

    /// The readable prefix of the Base58 text.
    pub const fn human_prefix(self) -> &'static str {
        match self {
            Self::FactoidPublic => "FA",
            Self::FactoidSecret => "Fs",
            Self::EntryCreditPublic => "EC",
            Self::EntryCreditSecret => "Es",
            Self::IdentityPublic => "idpub",
            Self::IdentitySecret => "idsec",
        }
    }

    /// The raw prefix bytes prepended before Base58 encoding.
    pub const fn prefix_bytes(self) -> &'static [u8] {
        match self {
            Self::FactoidPublic => &[0x5f, 0xb1],
            Self::FactoidSecret => &[0x64, 0x78],
            Self::EntryCreditPublic => &[0x59, 0x2a],
            Self::EntryCreditSecret => &[0x5d, 0xb6],
            Self::IdentityPublic => &[0x03, 0x45, 0xef, 0x9d, 0xe0],
            Self::IdentitySecret => &[0x03, 0x45, 0xf3, 0xd0, 0xd6],
        }
    }

    /// Total length of the Base58-decoded address.
    pub const fn decoded_len(self) -> usize {
        self.prefix_bytes().len() + KEY_LEN + CHECKSUM_LEN
    }

    pub const fn family(self) -> KeyFamily {
        match self {
            Self::FactoidPublic | Self::FactoidSecret => KeyFamily::Factoid,
            Self::EntryCreditPublic | Self::EntryCreditSecret => KeyFamily::EntryCredit,
            Self::IdentityPublic | Self::IdentitySecret => KeyFamily::Identity,
        }
    }

    pub const fn visibility(self) -> Visibility {
        match self {
            Self::FactoidPublic | Self::EntryCreditPublic | Self::IdentityPublic => {
                Visibility::Public
            }
            Self::FactoidSecret | Self::EntryCreditSecret | Self::IdentitySecret => {
                Visibility::Private
            }
        }
    }

    /// The type for the same family with the given visibility.
    pub const fn with_visibility(self, visibility: Visibility) -> Self {
        match (self.family(), visibility) {
            (KeyFamily::Factoid, Visibility::Public) => Self::FactoidPublic,
            (KeyFamily::Factoid, Visibility::Private) => Self::FactoidSecret,
            (KeyFamily::EntryCredit, Visibility::Public) => Self::EntryCreditPublic,
            (KeyFamily::EntryCredit, Visibility::Private) => Self::EntryCreditSecret,
            (KeyFamily::Identity, Visibility::Public) => Self::IdentityPublic,
            (KeyFamily::Identity, Visibility::Private) => Self::IdentitySecret,
        }
    }

    /// Classify an address string by its readable prefix.
    ///
    /// Identity prefixes are checked first since they are longer.
    pub fn from_text(s: &str) -> Option<Self> {
        if s.starts_with(Self::IdentityPublic.human_prefix()) {
            return Some(Self::IdentityPublic);
        }
        if s.starts_with(Self::IdentitySecret.human_prefix()) {
            return Some(Self::IdentitySecret);
        }
        let prefix = s.get(..2)?;
        [
            Self::FactoidPublic,
            Self::FactoidSecret,
            Self::EntryCreditPublic,
            Self::EntryCreditSecret,
        ]
        .into_iter()
        .find(|t| t.human_prefix() == prefix)
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FactoidPublic => "FACTOID_PUBLIC",
            Self::FactoidSecret => "FACTOID_SECRET",
            Self::EntryCreditPublic => "ENTRY_CREDIT_PUBLIC",
            Self::EntryCreditSecret => "ENTRY_CREDIT_SECRET",
            Self::IdentityPublic => "IDENTITY_PUBLIC",
            Self::IdentitySecret => "IDENTITY_SECRET",
        };
        f.write_str(name)
    }
}

/// A validated address. Immutable once constructed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    text: String,
    address_type: AddressType,
    key: [u8; KEY_LEN],
}

impl Address {
    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (address_type, key) = decode_address(s)?;
        Ok(Self {
            text: s.to_owned(),
            address_type,
            key,
        })
    }

    /// Encode key bytes as an address of `address_type`.
    ///
    /// For `FactoidPublic` the input is an Ed25519 public key and the RCD-1
    /// redeem hash is what gets encoded.
    pub fn from_key(key: &[u8], address_type: AddressType) -> Result<Self, CoreError> {
        let public_or_seed = key_array(key)?;
        let payload = match address_type {
            AddressType::FactoidPublic => {
                Rcd::type1(Ed25519PublicKey::from_bytes(public_or_seed)).redeem_hash()
            }
            _ => public_or_seed,
        };
        Ok(Self::from_payload(payload, address_type))
    }

    /// Encode already-derived key material without any transformation.
    pub fn from_payload(payload: [u8; KEY_LEN], address_type: AddressType) -> Self {
        let prefix = address_type.prefix_bytes();
        let mut raw = Vec::with_capacity(address_type.decoded_len());
        raw.extend_from_slice(prefix);
        raw.extend_from_slice(&payload);
        let checksum = sha256d(&raw);
        raw.extend_from_slice(&checksum[..CHECKSUM_LEN]);

        Self {
            text: to_base58(&raw),
            address_type,
            key: payload,
        }
    }

    /// Generate a fresh random secret address for a key family.
    pub fn generate(family: KeyFamily) -> Self {
        let keypair = Keypair::generate();
        let address_type = match family {
            KeyFamily::Factoid => AddressType::FactoidSecret,
            KeyFamily::EntryCredit => AddressType::EntryCreditSecret,
            KeyFamily::Identity => AddressType::IdentitySecret,
        };
        Self::from_payload(keypair.seed(), address_type)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    pub fn visibility(&self) -> Visibility {
        self.address_type.visibility()
    }

    pub fn family(&self) -> KeyFamily {
        self.address_type.family()
    }

    /// The 32 bytes of key material the address encodes.
    pub fn key_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Signing key pair for a secret address.
    pub fn keypair(&self) -> Result<Keypair, CoreError> {
        self.assert_visibility(Visibility::Private)?;
        Ok(Keypair::from_seed(&self.key))
    }

    /// The Ed25519 public key behind this address.
    ///
    /// Unavailable for `FA` addresses, which only carry a redeem hash.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, CoreError> {
        match self.address_type {
            AddressType::FactoidPublic => Err(CoreError::AssertionError(
                "a factoid public address only carries the RCD hash".into(),
            )),
            t if t.visibility() == Visibility::Private => Ok(self.keypair()?.public_key()),
            _ => Ok(Ed25519PublicKey::from_bytes(self.key)),
        }
    }

    /// The public address of the same family.
    pub fn public_address(&self) -> Result<Address, CoreError> {
        if self.visibility() == Visibility::Public {
            return Ok(self.clone());
        }
        let public_key = self.keypair()?.public_key();
        Address::from_key(
            public_key.as_bytes(),
            self.address_type.with_visibility(Visibility::Public),
        )
    }

    /// Fails with `AssertionError` unless the address has the expected type.
    pub fn assert_type(&self, expected: AddressType) -> Result<(), CoreError> {
        if self.address_type != expected {
            return Err(CoreError::AssertionError(format!(
                "expected a {expected} address, got {}",
                self.address_type
            )));
        }
        Ok(())
    }

    /// Fails with `AssertionError` unless the address has the expected visibility.
    pub fn assert_visibility(&self, expected: Visibility) -> Result<(), CoreError> {
        if self.visibility() != expected {
            return Err(CoreError::AssertionError(format!(
                "expected a {expected:?} address, got {}",
                self.address_type
            )));
        }
        Ok(())
    }

    /// Fails with `AssertionError` unless the address belongs to `family`.
    pub fn assert_family(&self, expected: KeyFamily) -> Result<(), CoreError> {
        if self.family() != expected {
            return Err(CoreError::AssertionError(format!(
                "expected a {expected:?} address, got {}",
                self.address_type
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.visibility() {
            Visibility::Public => write!(f, "Address({})", self.text),
            Visibility::Private => write!(f, "Address({}…)", self.address_type.human_prefix()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.text
    }
}

/// Decode and validate an address string into its type and key material.
pub fn decode_address(s: &str) -> Result<(AddressType, [u8; KEY_LEN]), CoreError> {
    if s.is_empty() {
        return Err(CoreError::InvalidAddress("empty address".into()));
    }
    let address_type = AddressType::from_text(s)
        .ok_or_else(|| CoreError::InvalidAddress(format!("unrecognized prefix in {s:?}")))?;
    if s.len() <= address_type.human_prefix().len() {
        return Err(CoreError::InvalidAddress(format!("address {s:?} is too short")));
    }

    let raw = from_base58(s).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
    if raw.len() != address_type.decoded_len() {
        return Err(CoreError::InvalidAddress(format!(
            "{} address decodes to {} bytes, expected {}",
            address_type,
            raw.len(),
            address_type.decoded_len()
        )));
    }

    let prefix_len = address_type.prefix_bytes().len();
    if &raw[..prefix_len] != address_type.prefix_bytes() {
        return Err(CoreError::InvalidAddress(format!(
            "prefix bytes do not match {}",
            address_type.human_prefix()
        )));
    }

    let (body, checksum) = raw.split_at(prefix_len + KEY_LEN);
    if sha256d(body)[..CHECKSUM_LEN] != *checksum {
        return Err(CoreError::InvalidAddress("checksum mismatch".into()));
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&body[prefix_len..]);
    Ok((address_type, key))
}

/// Encode key bytes as an address string. See [`Address::from_key`].
pub fn encode_key(key: &[u8], address_type: AddressType) -> Result<String, CoreError> {
    Address::from_key(key, address_type).map(String::from)
}

/// Like [`encode_key`] but with the key given as hex.
pub fn encode_hex_key(key_hex: &str, address_type: AddressType) -> Result<String, CoreError> {
    let key = from_hex(key_hex).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
    encode_key(&key, address_type)
}

/// True when `s` decodes as any known address type.
pub fn is_valid_address(s: &str) -> bool {
    decode_address(s).is_ok()
}

/// Precondition guard on an address string's type.
pub fn assert_type(s: &str, expected: AddressType) -> Result<(), CoreError> {
    let (actual, _) = decode_address(s)?;
    if actual != expected {
        return Err(CoreError::AssertionError(format!(
            "expected a {expected} address, got {actual}"
        )));
    }
    Ok(())
}

/// Precondition guard on an address string's visibility.
pub fn assert_visibility(s: &str, expected: Visibility) -> Result<(), CoreError> {
    let (actual, _) = decode_address(s)?;
    if actual.visibility() != expected {
        return Err(CoreError::AssertionError(format!(
            "expected a {expected:?} address, got {actual}"
        )));
    }
    Ok(())
}

fn key_array(key: &[u8]) -> Result<[u8; KEY_LEN], CoreError> {
    <[u8; KEY_LEN]>::try_from(key)
        .map_err(|_| CoreError::InvalidKey(format!("expected 32 key bytes, got {}", key.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EC_PUBLIC: &str = "EC3cqLZPq5ypwRB5CLfXnud5vkWAV2sd235CFf9KcWcE3FH9GRxv";
    const EC_SECRET: &str = "Es3Y6U6H1Pfg4wYag8VMtRZEGuEJnfkJ2ZuSyCVcQKweB6y4WvGH";

    #[test]
    fn test_decode_entry_credit_pair() {
        let (public_type, public_key) = decode_address(EC_PUBLIC).unwrap();
        assert_eq!(public_type, AddressType::EntryCreditPublic);
        assert_eq!(
            hex::encode(public_key),
            "f48167f7f868d6163b4afb49a357829d9bdb2de092374d357424e2318c6f894a"
        );

        let (secret_type, _) = decode_address(EC_SECRET).unwrap();
        assert_eq!(secret_type, AddressType::EntryCreditSecret);
    }

    #[test]
    fn test_secret_derives_public() {
        let secret = Address::parse(EC_SECRET).unwrap();
        assert_eq!(secret.public_address().unwrap().as_str(), EC_PUBLIC);
    }

    #[test]
    fn test_factoid_public_uses_rcd_hash() {
        let secret = Address::parse("Fs2RwfEkFdhhrCmvpTK8WWLU1AZh7Hz8ssdyDFddG3bD6pieXKAw").unwrap();
        let public = secret.public_address().unwrap();
        assert_eq!(public.as_str(), "FA3WqDZkdiVkFxrnbHsoZ63dxHy1UA4fp8WkRA8H9gq4VqWMEcbp");

        let pk = secret.keypair().unwrap().public_key();
        assert_eq!(public.key_bytes(), &Rcd::type1(pk).redeem_hash());
        assert!(public.public_key().is_err());
    }

    #[test]
    fn test_identity_prefixes() {
        let secret = Address::parse("idsec2GRXnJwRm5uQCy23ZNWwPX3zo8Z17VYKG2ma1z2ssPDimnDBQt").unwrap();
        assert_eq!(secret.address_type(), AddressType::IdentitySecret);
        assert_eq!(
            secret.public_address().unwrap().as_str(),
            "idpub3cV27K4JgS7thw35xCg6EgKs1ithTfXg8ov85UqgfghNJJaxzn"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for bad in ["", "E", "EC", "XX3cqLZPq5ypwRB5CLfXnud5vkWAV2sd235CFf9KcWcE3FH9GRxv", "EC3cqLZPq5ypwRB5"] {
            assert!(
                matches!(decode_address(bad), Err(CoreError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_wrong_length_for_prefix() {
        let text = format!("EC{}", &EC_PUBLIC[2..40]);
        assert!(decode_address(&text).is_err());
    }

    #[test]
    fn test_encode_key_requires_32_bytes() {
        assert!(matches!(
            encode_key(&[1u8; 31], AddressType::EntryCreditPublic),
            Err(CoreError::InvalidKey(_))
        ));
        assert!(matches!(
            encode_hex_key("zz", AddressType::EntryCreditPublic),
            Err(CoreError::InvalidKey(_))
        ));
        assert_eq!(
            encode_hex_key(
                "f48167f7f868d6163b4afb49a357829d9bdb2de092374d357424e2318c6f894a",
                AddressType::EntryCreditPublic
            )
            .unwrap(),
            EC_PUBLIC
        );
    }

    #[test]
    fn test_assertions() {
        let public = Address::parse(EC_PUBLIC).unwrap();
        assert!(public.assert_type(AddressType::EntryCreditPublic).is_ok());
        assert!(matches!(
            public.assert_visibility(Visibility::Private),
            Err(CoreError::AssertionError(_))
        ));
        assert!(assert_type(EC_SECRET, AddressType::EntryCreditSecret).is_ok());
        assert!(matches!(
            assert_type(EC_SECRET, AddressType::EntryCreditPublic),
            Err(CoreError::AssertionError(_))
        ));
        assert!(assert_visibility(EC_PUBLIC, Visibility::Public).is_ok());
        assert!(public.keypair().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let secret = Address::parse(EC_SECRET).unwrap();
        assert_eq!(format!("{secret:?}"), "Address(Es…)");
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address::parse(EC_PUBLIC).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{EC_PUBLIC}\""));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
        assert!(serde_json::from_str::<Address>("\"EC123\"").is_err());
    }

    #[test]
    fn test_generate_families() {
        let ec = Address::generate(KeyFamily::EntryCredit);
        assert_eq!(ec.address_type(), AddressType::EntryCreditSecret);
        assert!(ec.public_address().unwrap().as_str().starts_with("EC"));
        let id = Address::generate(KeyFamily::Identity);
        assert!(id.as_str().starts_with("idsec"));
    }

    proptest! {
        #[test]
        fn test_roundtrip(key in any::<[u8; 32]>(), index in 0usize..6) {
            let address_type = AddressType::ALL[index];
            let address = Address::from_payload(key, address_type);
            let (decoded_type, decoded_key) = decode_address(address.as_str()).unwrap();
            prop_assert_eq!(decoded_type, address_type);
            prop_assert!(address.as_str().starts_with(address_type.human_prefix()));

            let reencoded = if address_type == AddressType::FactoidPublic {
                Address::from_payload(decoded_key, decoded_type).to_string()
            } else {
                encode_key(&decoded_key, decoded_type).unwrap()
            };
            prop_assert_eq!(reencoded, address.as_str());
        }

        #[test]
        fn test_checksum_bit_flip(key in any::<[u8; 32]>(), index in 0usize..6, bit in 0usize..32) {
            let address_type = AddressType::ALL[index];
            let address = Address::from_payload(key, address_type);
            let mut raw = from_base58(address.as_str()).unwrap();
            let at = raw.len() - CHECKSUM_LEN + bit / 8;
            raw[at] ^= 1 << (bit % 8);
            let tampered = to_base58(&raw);
            prop_assert!(matches!(decode_address(&tampered), Err(CoreError::InvalidAddress(_))));
        }

        #[test]
        fn test_encode_rejects_wrong_length(len in (0usize..64).prop_filter("not 32", |l| *l != 32)) {
            let key = vec![0u8; len];
            prop_assert!(matches!(
                encode_key(&key, AddressType::EntryCreditPublic),
                Err(CoreError::InvalidKey(_))
            ));
        }
    }
}
