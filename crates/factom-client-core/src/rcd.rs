//! Redeem Condition Datastructures.
//!
//! An RCD describes how a Factoid input is authorized. A Factoid public
//! address does not carry the public key itself but the hash of its RCD.

use crate::crypto::Ed25519PublicKey;
use crate::encoding::sha256d;

/// Type byte of the single-signature RCD.
pub const RCD_TYPE_1: u8 = 0x01;

/// A redeem condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcd {
    /// Type 1: a single Ed25519 key.
    Type1 { public_key: Ed25519PublicKey },
}

impl Rcd {
    /// Build a type 1 RCD for a public key.
    pub const fn type1(public_key: Ed25519PublicKey) -> Self {
        Self::Type1 { public_key }
    }

    /// The RCD type byte.
    pub const fn rcd_type(&self) -> u8 {
        match self {
            Self::Type1 { .. } => RCD_TYPE_1,
        }
    }

    /// Serialized form: `type || payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Type1 { public_key } => {
                let mut out = Vec::with_capacity(33);
                out.push(RCD_TYPE_1);
                out.extend_from_slice(public_key.as_bytes());
                out
            }
        }
    }

    /// `doubleSHA256(to_bytes())`, the key material of an `FA` address.
    pub fn redeem_hash(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_type1_layout() {
        let pk = Keypair::from_seed(&[7; 32]).public_key();
        let rcd = Rcd::type1(pk);
        let bytes = rcd.to_bytes();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..], pk.as_bytes());
        assert_eq!(rcd.rcd_type(), RCD_TYPE_1);
    }

    #[test]
    fn test_redeem_hash_differs_from_key() {
        let pk = Keypair::from_seed(&[7; 32]).public_key();
        let hash = Rcd::type1(pk).redeem_hash();
        assert_ne!(&hash, pk.as_bytes());
        assert_eq!(hash, sha256d(&Rcd::type1(pk).to_bytes()));
    }
}
