//! Strong type definitions for 32-byte protocol hashes.
//!
//! All identifiers are newtypes to prevent misuse at compile time: a chain id
//! can never be passed where an entry hash is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let bytes = hex::decode(s)?;
                if bytes.len() != 32 {
                    return Err(hex::FromHexError::InvalidStringLength);
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; 32]);
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; 32] = slice.try_into()?;
                Ok(Self(arr))
            }
        }
    };
}

hash_newtype!(
    /// A chain identifier: `SHA256(SHA256(ext_id_1) || SHA256(ext_id_2) || ...)`
    /// of the chain's first entry.
    ChainId
);

hash_newtype!(
    /// An entry hash: `SHA256(SHA512(marshalled) || marshalled)`.
    EntryHash
);

hash_newtype!(
    /// A commit transaction id as reported by the node.
    TxId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_hex_roundtrip() {
        let id = ChainId::from_bytes([0x42; 32]);
        let recovered = ChainId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_display_is_full_hex() {
        let hash = EntryHash::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
    }

    #[test]
    fn test_debug_is_truncated() {
        let debug = format!("{:?}", TxId::from_bytes([0xcd; 32]));
        assert_eq!(debug, "TxId(cdcdcdcdcdcdcdcd)");
    }

    #[test]
    fn test_from_hex_rejects_short_input() {
        assert!(ChainId::from_hex("abcd").is_err());
    }
}
