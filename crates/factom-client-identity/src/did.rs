//! Decentralized identifiers for identity chains.
//!
//! Accepted forms:
//!
//! ```text
//! did:factom:<64 hex chain id>
//! did:factom:<network>:<64 hex chain id>
//! <64 hex chain id>
//! ```

use std::fmt;
use std::str::FromStr;

use factom_client_core::ChainId;

use crate::error::{IdentityError, Result};

/// DID method prefix.
pub const DID_PREFIX: &str = "did:factom:";

/// An identifier that resolves to an identity chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    network: Option<String>,
    chain_id: ChainId,
}

impl Did {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            network: None,
            chain_id,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Parse a DID or a bare chain id.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(rest) = s.strip_prefix(DID_PREFIX) else {
            return Ok(Self::new(parse_chain_id(s, s)?));
        };

        match rest.rsplit_once(':') {
            None => Ok(Self::new(parse_chain_id(rest, s)?)),
            Some((network, id)) => {
                let valid_network = !network.is_empty()
                    && network
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !valid_network {
                    return Err(IdentityError::InvalidIdentifier(s.to_owned()));
                }
                Ok(Self::new(parse_chain_id(id, s)?).with_network(network))
            }
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }
}

fn parse_chain_id(hex: &str, original: &str) -> Result<ChainId> {
    if hex.len() != 64 {
        return Err(IdentityError::InvalidIdentifier(original.to_owned()));
    }
    ChainId::from_hex(hex).map_err(|_| IdentityError::InvalidIdentifier(original.to_owned()))
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.network {
            Some(network) => write!(f, "{DID_PREFIX}{network}:{}", self.chain_id),
            None => write!(f, "{DID_PREFIX}{}", self.chain_id),
        }
    }
}

impl FromStr for Did {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<ChainId> for Did {
    fn from(chain_id: ChainId) -> Self {
        Self::new(chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "3b69dabe22c014af9a9bc9dfa7917ce4602a03579597ddf184d8de56702512ae";

    #[test]
    fn test_parse_forms() {
        let bare = Did::parse(HEX).unwrap();
        let did = Did::parse(&format!("did:factom:{HEX}")).unwrap();
        let testnet = Did::parse(&format!("did:factom:testnet:{HEX}")).unwrap();

        assert_eq!(bare, did);
        assert_eq!(bare.chain_id().to_hex(), HEX);
        assert_eq!(testnet.network(), Some("testnet"));
        assert_eq!(testnet.chain_id(), did.chain_id());
    }

    #[test]
    fn test_display_roundtrip() {
        let did = Did::parse(&format!("did:factom:mainnet:{HEX}")).unwrap();
        assert_eq!(did.to_string(), format!("did:factom:mainnet:{HEX}"));
        assert_eq!(did.to_string().parse::<Did>().unwrap(), did);
        assert_eq!(Did::parse(HEX).unwrap().to_string(), format!("did:factom:{HEX}"));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "did:factom:",
            "did:factom:abc",
            "did:other:3b69dabe22c014af9a9bc9dfa7917ce4602a03579597ddf184d8de56702512ae",
            "did:factom::3b69dabe22c014af9a9bc9dfa7917ce4602a03579597ddf184d8de56702512ae",
            "zz69dabe22c014af9a9bc9dfa7917ce4602a03579597ddf184d8de56702512ae",
        ] {
            assert!(
                matches!(Did::parse(bad), Err(IdentityError::InvalidIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
