//! In-memory collaborators
//!
//! Backs offline validation from a proof archive and the test suites. Each
//! party's records are kept in a separate map so the two histories stay
//! independent exactly as they would on two services.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::crypto::PartyVerifyingKey;
use crate::domain::{AssetProof, Party};
use crate::validation::codec;

use super::{KeyNotFoundError, KeyRegistry, PayloadReferences, ProofSource, SourceError};

type AgeMap = BTreeMap<u64, Vec<u8>>;

#[derive(Debug, Default)]
struct PartyHistory {
    /// Raw proof records by asset id, then age
    records: HashMap<String, AgeMap>,
    /// Payload references by asset id, then age
    payloads: HashMap<String, AgeMap>,
}

/// Both parties' proof records and payload references, held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProofStore {
    inner: Arc<RwLock<HashMap<Party, PartyHistory>>>,
}

impl InMemoryProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `ProofSource` view onto one party's history
    pub fn source(&self, party: Party) -> InMemoryProofSource {
        InMemoryProofSource {
            party,
            store: self.clone(),
        }
    }

    /// Store a raw wire record as-is, well-formed or not
    pub async fn insert_record(&self, party: Party, asset_id: &str, age: u64, record: Vec<u8>) {
        let mut inner = self.inner.write().await;
        inner
            .entry(party)
            .or_default()
            .records
            .entry(asset_id.to_string())
            .or_default()
            .insert(age, record);
    }

    /// Encode and store a proof
    pub async fn insert_proof(&self, party: Party, proof: &AssetProof) {
        self.insert_record(party, &proof.id, proof.age, codec::encode(proof))
            .await;
    }

    pub async fn insert_payload_reference(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
        reference: Vec<u8>,
    ) {
        let mut inner = self.inner.write().await;
        inner
            .entry(party)
            .or_default()
            .payloads
            .entry(asset_id.to_string())
            .or_default()
            .insert(age, reference);
    }

    /// Drop one party's record for an age, returning whether it existed
    pub async fn remove_record(&self, party: Party, asset_id: &str, age: u64) -> bool {
        let mut inner = self.inner.write().await;
        inner
            .get_mut(&party)
            .and_then(|h| h.records.get_mut(asset_id))
            .and_then(|ages| ages.remove(&age))
            .is_some()
    }

    /// Number of records held for a party across all assets
    pub async fn record_count(&self, party: Party) -> usize {
        let inner = self.inner.read().await;
        inner
            .get(&party)
            .map(|h| h.records.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    async fn record(&self, party: Party, asset_id: &str, age: u64) -> Option<Vec<u8>> {
        let inner = self.inner.read().await;
        inner
            .get(&party)?
            .records
            .get(asset_id)?
            .get(&age)
            .cloned()
    }

    async fn latest(&self, party: Party, asset_id: &str) -> Option<u64> {
        let inner = self.inner.read().await;
        inner
            .get(&party)?
            .records
            .get(asset_id)?
            .keys()
            .next_back()
            .copied()
    }

    async fn payload(&self, party: Party, asset_id: &str, age: u64) -> Option<Vec<u8>> {
        let inner = self.inner.read().await;
        inner
            .get(&party)?
            .payloads
            .get(asset_id)?
            .get(&age)
            .cloned()
    }
}

#[async_trait]
impl PayloadReferences for InMemoryProofStore {
    async fn payload_reference(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
    ) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.payload(party, asset_id, age).await)
    }
}

/// One party's view of an [`InMemoryProofStore`]
#[derive(Clone)]
pub struct InMemoryProofSource {
    party: Party,
    store: InMemoryProofStore,
}

#[async_trait]
impl ProofSource for InMemoryProofSource {
    fn party(&self) -> Party {
        self.party
    }

    async fn fetch_proof(&self, asset_id: &str, age: u64) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.store.record(self.party, asset_id, age).await)
    }

    async fn latest_age(&self, asset_id: &str) -> Result<Option<u64>, SourceError> {
        Ok(self.store.latest(self.party, asset_id).await)
    }
}

/// Fixed party-to-key mapping
#[derive(Debug, Clone, Default)]
pub struct StaticKeyRegistry {
    keys: HashMap<Party, PartyVerifyingKey>,
}

impl StaticKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, party: Party, key: PartyVerifyingKey) -> Self {
        self.keys.insert(party, key);
        self
    }

    pub fn register(&mut self, party: Party, key: PartyVerifyingKey) {
        self.keys.insert(party, key);
    }
}

impl KeyRegistry for StaticKeyRegistry {
    fn public_key_of(&self, party: Party) -> Result<PartyVerifyingKey, KeyNotFoundError> {
        self.keys.get(&party).cloned().ok_or(KeyNotFoundError(party))
    }
}
