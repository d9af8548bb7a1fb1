//! Proof archive: both parties' histories in one JSON file
//!
//! ```json
//! {
//!   "keys": { "ledger": "0x<hex>", "auditor": "0x<hex>" },
//!   "ledger": {
//!     "proofs": [ { "id": "...", "age": 0, "nonce": "...", "hash": "<b64>", "signature": "<b64>" } ],
//!     "payloads": [ { "id": "...", "age": 0, "reference": "<b64>" } ]
//!   },
//!   "auditor": { "proofs": [], "payloads": [] }
//! }
//! ```
//!
//! Proof entries are kept as raw JSON and handed to the engine unparsed, so a
//! malformed entry is caught by the proof codec rather than by the loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{public_key_from_hex, PartyVerifyingKey};
use crate::domain::{bytes_base64, Party};

use super::{InMemoryProofStore, StaticKeyRegistry};

/// Errors loading a proof archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid public key for {party}")]
    InvalidKey { party: Party },

    #[error("{party} proof entry {index} has no usable id/age")]
    UnindexableEntry { party: Party, index: usize },
}

/// Payload reference for one age
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadEntry {
    pub id: String,
    pub age: u64,
    #[serde(with = "bytes_base64")]
    pub reference: Vec<u8>,
}

/// One party's section of the archive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyArchive {
    #[serde(default)]
    pub proofs: Vec<serde_json::Value>,
    #[serde(default)]
    pub payloads: Vec<PayloadEntry>,
}

/// Offline snapshot of both parties' proofs and keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProofArchive {
    #[serde(default)]
    pub keys: BTreeMap<Party, String>,
    #[serde(default)]
    pub ledger: PartyArchive,
    #[serde(default)]
    pub auditor: PartyArchive,
}

impl ProofArchive {
    /// Read and parse an archive file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ArchiveError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ArchiveError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn party(&self, party: Party) -> &PartyArchive {
        match party {
            Party::Ledger => &self.ledger,
            Party::Auditor => &self.auditor,
        }
    }

    /// Build the key registry from the `keys` section.
    ///
    /// A party without a key is left unregistered; the engine reports that
    /// as a fault when it first needs the key.
    pub fn key_registry(&self) -> Result<StaticKeyRegistry, ArchiveError> {
        let mut registry = StaticKeyRegistry::new();
        for (party, hex_key) in &self.keys {
            let key = public_key_from_hex(hex_key)
                .and_then(|bytes| PartyVerifyingKey::from_bytes(&bytes))
                .map_err(|_| ArchiveError::InvalidKey { party: *party })?;
            registry.register(*party, key);
        }
        Ok(registry)
    }

    /// Populate an in-memory store with both parties' records
    pub async fn proof_store(&self) -> Result<InMemoryProofStore, ArchiveError> {
        let store = InMemoryProofStore::new();

        for party in Party::ALL {
            let section = self.party(party);

            for (index, entry) in section.proofs.iter().enumerate() {
                let id = entry.get("id").and_then(|v| v.as_str());
                let age = entry.get("age").and_then(|v| v.as_u64());
                let (Some(id), Some(age)) = (id, age) else {
                    return Err(ArchiveError::UnindexableEntry { party, index });
                };
                let record = serde_json::to_vec(entry)?;
                store.insert_record(party, id, age, record).await;
            }

            for payload in &section.payloads {
                store
                    .insert_payload_reference(party, &payload.id, payload.age, payload.reference.clone())
                    .await;
            }
        }

        tracing::debug!(
            ledger_records = self.ledger.proofs.len(),
            auditor_records = self.auditor.proofs.len(),
            "Loaded proof archive"
        );

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{public_key_to_hex, PartySigningKey};
    use crate::infra::{KeyRegistry, PayloadReferences, ProofSource};
    use serde_json::json;

    #[tokio::test]
    async fn test_loads_records_payloads_and_keys() {
        let key = PartySigningKey::generate();
        let archive = ProofArchive::from_json(
            &json!({
                "keys": { "ledger": public_key_to_hex(&key.public_key_bytes()) },
                "ledger": {
                    "proofs": [ { "id": "asset-1", "age": 0, "nonce": "n", "hash": "", "signature": "" } ],
                    "payloads": [ { "id": "asset-1", "age": 0, "reference": "cmVm" } ]
                }
            })
            .to_string(),
        )
        .unwrap();

        let store = archive.proof_store().await.unwrap();
        let ledger = store.source(Party::Ledger);
        assert!(ledger.fetch_proof("asset-1", 0).await.unwrap().is_some());
        assert_eq!(
            store
                .payload_reference(Party::Ledger, "asset-1", 0)
                .await
                .unwrap()
                .as_deref(),
            Some(&b"ref"[..])
        );

        let registry = archive.key_registry().unwrap();
        assert_eq!(registry.public_key_of(Party::Ledger).unwrap(), key.public_key());
        assert!(registry.public_key_of(Party::Auditor).is_err());
    }

    #[tokio::test]
    async fn test_rejects_entry_without_age() {
        let archive = ProofArchive::from_json(
            &json!({ "auditor": { "proofs": [ { "id": "asset-1", "age": -1 } ] } }).to_string(),
        )
        .unwrap();

        let err = archive.proof_store().await.unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::UnindexableEntry {
                party: Party::Auditor,
                index: 0
            }
        ));
    }

    #[test]
    fn test_rejects_bad_key() {
        let archive =
            ProofArchive::from_json(&json!({ "keys": { "auditor": "0x1234" } }).to_string()).unwrap();
        assert!(matches!(
            archive.key_registry(),
            Err(ArchiveError::InvalidKey {
                party: Party::Auditor
            })
        ));
    }
}
