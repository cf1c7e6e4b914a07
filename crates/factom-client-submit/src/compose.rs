//! Producing commit and reveal payloads.

use std::sync::Arc;

use factom_client_core::{
    build_chain_commit, build_entry_commit, validate_chain, validate_entry, Address, Chain, Clock,
    Entry, SystemClock,
};

use crate::backend::ComposeBackend;
use crate::error::{Result, SubmitError};
use crate::responses::ComposedPayloads;

/// How payloads are composed.
#[derive(Clone)]
pub enum Composer {
    /// Ask a wallet backend, which holds the payer's key.
    Online(Arc<dyn ComposeBackend>),
    /// Sign locally with the payer's `Es` secret address.
    Offline(Arc<dyn Clock>),
}

impl Composer {
    pub fn online(backend: Arc<dyn ComposeBackend>) -> Self {
        Self::Online(backend)
    }

    /// Local composer on the wall clock.
    pub fn offline() -> Self {
        Self::Offline(Arc::new(SystemClock))
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline(_))
    }

    pub async fn compose_chain(&self, chain: &Chain, payer: &Address) -> Result<ComposedPayloads> {
        match self {
            Self::Online(backend) => backend
                .compose_chain(chain, payer)
                .await
                .map_err(SubmitError::Compose),
            Self::Offline(clock) => {
                validate_chain(chain)?;
                let commit = build_chain_commit(chain, payer, clock.as_ref())?;
                let reveal = chain.first_entry().marshal()?;
                Ok(ComposedPayloads::new(commit, reveal))
            }
        }
    }

    pub async fn compose_entry(&self, entry: &Entry, payer: &Address) -> Result<ComposedPayloads> {
        match self {
            Self::Online(backend) => backend
                .compose_entry(entry, payer)
                .await
                .map_err(SubmitError::Compose),
            Self::Offline(clock) => {
                validate_entry(entry)?;
                let commit = build_entry_commit(entry, payer, clock.as_ref())?;
                let reveal = entry.marshal()?;
                Ok(ComposedPayloads::new(commit, reveal))
            }
        }
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online(_) => f.write_str("Composer::Online"),
            Self::Offline(_) => f.write_str("Composer::Offline"),
        }
    }
}
