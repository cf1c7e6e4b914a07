//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the address encoding and entry hashing to values other
//! Factom implementations produce for the same inputs.

use factom_client_core::{Address, AddressType, Chain, Entry};

/// A secret address and the public address derived from it.
#[derive(Debug, Clone)]
pub struct AddressVector {
    pub name: &'static str,
    pub secret: &'static str,
    pub public: &'static str,
}

/// An entry and its derived identifiers.
#[derive(Debug, Clone)]
pub struct EntryVector {
    pub name: &'static str,
    pub ext_ids: &'static [&'static [u8]],
    pub content: &'static [u8],
    /// Expected chain id (hex) of a chain created with these external ids.
    pub chain_id: &'static str,
    /// Expected marshalled first entry (hex).
    pub marshalled: &'static str,
    /// Expected entry hash (hex) of the first entry.
    pub entry_hash: &'static str,
}

/// Secret/public address pairs.
pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            name: "entry credit pair",
            secret: "Es3Y6U6H1Pfg4wYag8VMtRZEGuEJnfkJ2ZuSyCVcQKweB6y4WvGH",
            public: "EC3cqLZPq5ypwRB5CLfXnud5vkWAV2sd235CFf9KcWcE3FH9GRxv",
        },
        AddressVector {
            name: "factoid pair through the RCD-1 hash",
            secret: "Fs2RwfEkFdhhrCmvpTK8WWLU1AZh7Hz8ssdyDFddG3bD6pieXKAw",
            public: "FA3WqDZkdiVkFxrnbHsoZ63dxHy1UA4fp8WkRA8H9gq4VqWMEcbp",
        },
        AddressVector {
            name: "identity pair",
            secret: "idsec2GRXnJwRm5uQCy23ZNWwPX3zo8Z17VYKG2ma1z2ssPDimnDBQt",
            public: "idpub3cV27K4JgS7thw35xCg6EgKs1ithTfXg8ov85UqgfghNJJaxzn",
        },
        AddressVector {
            name: "entry credit seed 0x42",
            secret: "Es2vqcHrMCYfUVxoSvM32GoyyH9MWL3XG9bqn5yrimjXhBk5RyNu",
            public: "EC21pzYnwFosvK4ZvdJdGeWx4qfGVtuHuUyLuHuQnZs3ME5L6NDu",
        },
        AddressVector {
            name: "factoid seed 0x42",
            secret: "Fs1pgoSKbSahFmC9bFAoeMbDhYUjpxHN7TLN297saVP6cuXmduzw",
            public: "FA2jvHuGvTuvVpk849Yob2Dtr6M7VFCpwcJc7M99GBzSrHb1ux8g",
        },
        AddressVector {
            name: "identity seed 0x42",
            secret: "idsec1fAfytHEe5JxdBnqR3eneGkNiBGfQimtxRaTWEMKfGjoaN4ZLf",
            public: "idpub21Ug6iAUWV6nbRmNbJ9q8YTxApuZVLR82xZkqa1jvW1MD4QS6V",
        },
    ]
}

/// Entries with known chain ids and hashes.
pub fn entry_vectors() -> Vec<EntryVector> {
    vec![EntryVector {
        name: "two external ids with hello content",
        ext_ids: &[b"factom-client", b"golden"],
        content: b"hello",
        chain_id: "fd4efba0c9d0b7b3c0e7d75a1f8fcbf484a3dd97cc881119ccf5b26bb9b54bb2",
        marshalled: "00fd4efba0c9d0b7b3c0e7d75a1f8fcbf484a3dd97cc881119ccf5b26bb9b54bb2\
                     0017000d666163746f6d2d636c69656e740006676f6c64656e68656c6c6f",
        entry_hash: "1dd9ec14c26b55211a12fd9a3a827a0b9444b45cedfdeba1a053d6ccd680999a",
    }]
}

/// A follow-up entry on the chain of the first [`entry_vectors`] vector,
/// with external id `second`, content `payload`, and its expected hash.
pub const FOLLOW_UP_ENTRY_HASH: &str =
    "25490f67bdfb2f3ff6c5ed07167693d2c38cb3fdd050e7f130884d15a96b500e";

/// Build the chain described by a vector.
pub fn chain_from_vector(vector: &EntryVector) -> Chain {
    Chain::new(vector.ext_ids.iter().copied(), vector.content).expect("vector chain is valid")
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, actual)` for every check.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mut results = Vec::new();

    for v in address_vectors() {
        let actual = Address::parse(v.secret)
            .and_then(|secret| secret.public_address())
            .map(|public| public.as_str().to_owned())
            .unwrap_or_else(|e| e.to_string());
        results.push((v.name.to_string(), actual == v.public, actual));
    }

    for v in entry_vectors() {
        let chain = chain_from_vector(&v);
        let entry: &Entry = chain.first_entry();
        let actual_id = chain.chain_id().to_hex();
        let actual_bytes = entry.marshal().map(hex::encode).unwrap_or_default();
        let actual_hash = entry.hash().map(|h| h.to_hex()).unwrap_or_default();

        results.push((format!("{}: chain id", v.name), actual_id == v.chain_id, actual_id));
        results.push((
            format!("{}: marshal", v.name),
            actual_bytes == v.marshalled,
            actual_bytes,
        ));
        results.push((format!("{}: entry hash", v.name), actual_hash == v.entry_hash, actual_hash));
    }

    results
}

/// The address type a vector's secret parses to.
pub fn secret_type(vector: &AddressVector) -> Option<AddressType> {
    Address::parse(vector.secret).ok().map(|a| a.address_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use factom_client_core::{ChainId, Visibility};

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{name}' produced {actual}");
        }
    }

    #[test]
    fn test_secrets_are_private() {
        for vector in address_vectors() {
            let ty = secret_type(&vector).unwrap();
            assert_eq!(ty.visibility(), Visibility::Private, "{}", vector.name);
        }
    }

    #[test]
    fn test_follow_up_entry() {
        let chain = chain_from_vector(&entry_vectors()[0]);
        let entry = Entry::new(*chain.chain_id(), [&b"second"[..]], &b"payload"[..]);
        assert_eq!(entry.hash().unwrap().to_hex(), FOLLOW_UP_ENTRY_HASH);
        assert_ne!(*chain.chain_id(), ChainId::ZERO);
    }
}
