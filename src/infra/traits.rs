//! Collaborator traits consumed by the validation engine
//!
//! The engine never talks to a ledger or auditor service directly; it goes
//! through these seams so transports, key provisioning and payload storage
//! can be swapped without touching the verification logic.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::crypto::PartyVerifyingKey;
use crate::domain::Party;

use super::{KeyNotFoundError, SourceError};

/// Read path to one party's proofs.
///
/// Returns raw wire records; decoding is the engine's job so that a party
/// cannot bypass structural validation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProofSource: Send + Sync {
    /// Party whose history this source serves
    fn party(&self) -> Party;

    /// Fetch the proof record for one age, `None` if the party has none
    async fn fetch_proof(&self, asset_id: &str, age: u64) -> Result<Option<Vec<u8>>, SourceError>;

    /// Latest age the party holds for the asset, `None` if unknown
    async fn latest_age(&self, asset_id: &str) -> Result<Option<u64>, SourceError>;
}

/// Public key lookup by party identity.
#[cfg_attr(test, automock)]
pub trait KeyRegistry: Send + Sync {
    fn public_key_of(&self, party: Party) -> Result<PartyVerifyingKey, KeyNotFoundError>;
}

/// Supplies the payload reference bound into each age's proof hash.
///
/// The bytes are opaque to the engine.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PayloadReferences: Send + Sync {
    async fn payload_reference(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
    ) -> Result<Option<Vec<u8>>, SourceError>;
}
