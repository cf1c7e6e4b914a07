//! Proptest generators for property-based testing.

use proptest::prelude::*;

use factom_client_core::{Address, AddressType, Chain, ChainId, Entry, EntryHash, MAX_ENTRY_PAYLOAD};

/// Generate a random ChainId.
pub fn chain_id() -> impl Strategy<Value = ChainId> {
    any::<[u8; 32]>().prop_map(ChainId::from_bytes)
}

/// Generate a random EntryHash.
pub fn entry_hash() -> impl Strategy<Value = EntryHash> {
    any::<[u8; 32]>().prop_map(EntryHash::from_bytes)
}

/// Generate an address type.
pub fn address_type() -> impl Strategy<Value = AddressType> {
    prop_oneof![
        Just(AddressType::FactoidPublic),
        Just(AddressType::FactoidSecret),
        Just(AddressType::EntryCreditPublic),
        Just(AddressType::EntryCreditSecret),
        Just(AddressType::IdentityPublic),
        Just(AddressType::IdentitySecret),
    ]
}

/// Generate an address of any type from a random 32-byte payload.
pub fn address() -> impl Strategy<Value = Address> {
    (any::<[u8; 32]>(), address_type()).prop_map(|(payload, ty)| Address::from_payload(payload, ty))
}

/// Generate an address of the given type.
pub fn address_of(address_type: AddressType) -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(move |payload| Address::from_payload(payload, address_type))
}

/// Generate bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a list of external ids.
pub fn ext_ids(max_count: usize, max_len: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload(max_len), 0..=max_count)
}

/// Parameters for generating an entry that fits the payload limit.
#[derive(Debug, Clone)]
pub struct EntryParams {
    pub chain_id: ChainId,
    pub ext_ids: Vec<Vec<u8>>,
    pub content: Vec<u8>,
}

impl EntryParams {
    pub fn entry(&self) -> Entry {
        Entry::new(self.chain_id, self.ext_ids.clone(), self.content.clone())
    }

    /// Bytes counted against [`MAX_ENTRY_PAYLOAD`].
    pub fn payload_len(&self) -> usize {
        self.ext_ids.iter().map(|e| 2 + e.len()).sum::<usize>() + self.content.len()
    }
}

impl Arbitrary for EntryParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (chain_id(), ext_ids(8, 64), payload(4096))
            .prop_map(|(chain_id, ext_ids, content)| EntryParams {
                chain_id,
                ext_ids,
                content,
            })
            .prop_filter("fits the payload limit", |p| p.payload_len() <= MAX_ENTRY_PAYLOAD)
            .boxed()
    }
}

/// Generate a valid chain: at least one external id, within the payload limit.
pub fn chain() -> impl Strategy<Value = Chain> {
    (
        prop::collection::vec(payload(64), 1..=8),
        payload(4096),
    )
        .prop_filter_map("valid chain", |(ext_ids, content)| {
            Chain::new(ext_ids, content).ok()
        })
}
