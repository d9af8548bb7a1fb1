//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use ledger_validator::crypto::{
    compute_proof_hash, Hash256, PartySigningKey, ProofHashParams, GENESIS_PREV_HASH,
};
use ledger_validator::infra::{InMemoryProofStore, RetryConfig, StaticKeyRegistry};
use ledger_validator::{AssetProof, LedgerValidationEngine, Party, ValidatorConfig};

/// One link of a party's hash chain, before signing
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub age: u64,
    pub nonce: String,
    pub payload: Vec<u8>,
    pub hash: Hash256,
}

/// Default payload reference for an age
pub fn payload_for(asset_id: &str, age: u64) -> Vec<u8> {
    format!("{asset_id}/payload/{age}").into_bytes()
}

/// Build a correctly linked chain of `len` ages from genesis
pub fn chain(asset_id: &str, len: u64) -> Vec<ChainEntry> {
    chain_with(len, |age| payload_for(asset_id, age))
}

/// Build a correctly linked chain with caller-chosen payload references
pub fn chain_with(len: u64, payload: impl Fn(u64) -> Vec<u8>) -> Vec<ChainEntry> {
    let mut prev = GENESIS_PREV_HASH;
    (0..len)
        .map(|age| {
            let payload = payload(age);
            let nonce = format!("nonce-{age}");
            let hash = compute_proof_hash(&ProofHashParams {
                prev_hash: &prev,
                payload_reference: &payload,
                nonce: &nonce,
                age,
            });
            prev = hash;
            ChainEntry {
                age,
                nonce,
                payload,
                hash,
            }
        })
        .collect()
}

/// Retry policy that keeps tests fast
pub fn test_config() -> ValidatorConfig {
    ValidatorConfig::default().with_retry(RetryConfig::fast())
}

/// Two parties with their own keys, sharing one in-memory store
pub struct TestParties {
    pub store: InMemoryProofStore,
    pub ledger_key: PartySigningKey,
    pub auditor_key: PartySigningKey,
}

impl TestParties {
    pub fn new() -> Self {
        Self {
            store: InMemoryProofStore::new(),
            ledger_key: PartySigningKey::generate(),
            auditor_key: PartySigningKey::generate(),
        }
    }

    pub fn key(&self, party: Party) -> &PartySigningKey {
        match party {
            Party::Ledger => &self.ledger_key,
            Party::Auditor => &self.auditor_key,
        }
    }

    /// Proof for an entry signed by the party's own key
    pub fn sign(&self, party: Party, asset_id: &str, entry: &ChainEntry) -> AssetProof {
        AssetProof::new(
            asset_id,
            entry.age,
            entry.nonce.clone(),
            entry.hash,
            self.key(party).sign(&entry.hash),
        )
    }

    /// Store a proof and its payload reference for one party
    pub async fn put(&self, party: Party, asset_id: &str, entry: &ChainEntry, proof: &AssetProof) {
        self.store.insert_proof(party, proof).await;
        self.store
            .insert_payload_reference(party, asset_id, entry.age, entry.payload.clone())
            .await;
    }

    /// Record a whole chain for one party
    pub async fn record(&self, party: Party, asset_id: &str, entries: &[ChainEntry]) {
        for entry in entries {
            let proof = self.sign(party, asset_id, entry);
            self.put(party, asset_id, entry, &proof).await;
        }
    }

    /// Both parties record the same honest history
    pub async fn record_both(&self, asset_id: &str, len: u64) -> Vec<ChainEntry> {
        let entries = chain(asset_id, len);
        self.record(Party::Ledger, asset_id, &entries).await;
        self.record(Party::Auditor, asset_id, &entries).await;
        entries
    }

    /// Overwrite one party's stored hash at an age, re-signed so only the
    /// chain link is wrong
    pub async fn tamper_hash(&self, party: Party, asset_id: &str, entry: &ChainEntry) {
        let mut forged = entry.clone();
        forged.hash[0] ^= 0xff;
        let proof = self.sign(party, asset_id, &forged);
        self.store.insert_proof(party, &proof).await;
    }

    /// Overwrite one party's signature at an age with a stranger's
    pub async fn forge_signature(&self, party: Party, asset_id: &str, entry: &ChainEntry) {
        let stranger = PartySigningKey::generate();
        let mut proof = self.sign(party, asset_id, entry);
        proof.signature = stranger.sign(&entry.hash);
        self.store.insert_proof(party, &proof).await;
    }

    pub fn registry(&self) -> StaticKeyRegistry {
        StaticKeyRegistry::new()
            .with_key(Party::Ledger, self.ledger_key.public_key())
            .with_key(Party::Auditor, self.auditor_key.public_key())
    }

    pub fn engine(&self) -> LedgerValidationEngine {
        self.engine_with(test_config())
    }

    pub fn engine_with(&self, config: ValidatorConfig) -> LedgerValidationEngine {
        LedgerValidationEngine::new(
            Arc::new(self.store.source(Party::Ledger)),
            Arc::new(self.store.source(Party::Auditor)),
            Arc::new(self.registry()),
            Arc::new(self.store.clone()),
            config,
        )
        .unwrap()
    }
}

impl Default for TestParties {
    fn default() -> Self {
        Self::new()
    }
}
