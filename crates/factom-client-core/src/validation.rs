//! Structural checks for caller supplied entries and chains.

use crate::entry::{compute_chain_id, Chain, Entry, MAX_ENTRY_PAYLOAD};
use crate::error::ValidationError;

/// Validate an entry's structure.
///
/// This performs:
/// - External id length check (each must fit a 2-byte length prefix)
/// - Payload size check against the 10 KiB limit
pub fn validate_entry(entry: &Entry) -> Result<(), ValidationError> {
    for ext_id in entry.ext_ids() {
        if ext_id.len() > u16::MAX as usize {
            return Err(ValidationError::ExtIdTooLong(ext_id.len()));
        }
    }

    let size = entry.payload_len();
    if size > MAX_ENTRY_PAYLOAD {
        return Err(ValidationError::PayloadTooLarge {
            size,
            max: MAX_ENTRY_PAYLOAD,
        });
    }

    Ok(())
}

/// Validate a chain's first entry, including its id derivation.
pub fn validate_chain(chain: &Chain) -> Result<(), ValidationError> {
    let entry = chain.first_entry();
    if entry.ext_ids().is_empty() {
        return Err(ValidationError::MissingChainExtIds);
    }

    let derived = compute_chain_id(entry.ext_ids());
    if &derived != chain.chain_id() {
        return Err(ValidationError::ChainIdMismatch {
            expected: chain.chain_id().to_hex(),
            derived: derived.to_hex(),
        });
    }

    validate_entry(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChainId;

    #[test]
    fn test_valid_entry() {
        let entry = Entry::new(ChainId::ZERO, [&b"a"[..]], &b"b"[..]);
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_payload_limit_counts_ext_id_prefixes() {
        // 10238 bytes of content + one empty ext id (2 byte prefix) = exactly 10240.
        let at_limit = Entry::new(ChainId::ZERO, [&b""[..]], vec![0u8; MAX_ENTRY_PAYLOAD - 2]);
        assert!(validate_entry(&at_limit).is_ok());

        let over = Entry::new(ChainId::ZERO, [&b"x"[..]], vec![0u8; MAX_ENTRY_PAYLOAD - 2]);
        assert!(matches!(
            validate_entry(&over),
            Err(ValidationError::PayloadTooLarge { size, .. }) if size == MAX_ENTRY_PAYLOAD + 1
        ));
    }

    #[test]
    fn test_valid_chain() {
        let chain = Chain::new([&b"x"[..], &b"y"[..]], &b"z"[..]).unwrap();
        assert!(validate_chain(&chain).is_ok());
    }

    #[test]
    fn test_oversized_ext_id() {
        let entry = Entry::new(ChainId::ZERO, [vec![0u8; 70_000]], &b""[..]);
        assert!(matches!(
            validate_entry(&entry),
            Err(ValidationError::ExtIdTooLong(70_000))
        ));
    }
}
