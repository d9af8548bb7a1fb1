//! Offline validation from an archive file on disk

mod common;

use std::io::Write;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{chain, TestParties};
use ledger_validator::crypto::public_key_to_hex;
use ledger_validator::infra::{ArchiveError, ProofArchive};
use ledger_validator::{LedgerValidationEngine, Party, StatusCode, ValidatorConfig};
use serde_json::json;

/// Serialize both parties' histories the way the archive stores them
fn archive_json(parties: &TestParties, asset_id: &str, len: u64, skip_auditor_age: Option<u64>) -> String {
    let entries = chain(asset_id, len);
    let section = |party: Party| {
        let kept: Vec<_> = entries
            .iter()
            .filter(|e| !(party == Party::Auditor && Some(e.age) == skip_auditor_age))
            .collect();
        json!({
            "proofs": kept
                .iter()
                .map(|e| serde_json::to_value(parties.sign(party, asset_id, e)).unwrap())
                .collect::<Vec<_>>(),
            "payloads": kept
                .iter()
                .map(|e| json!({
                    "id": asset_id,
                    "age": e.age,
                    "reference": STANDARD.encode(&e.payload),
                }))
                .collect::<Vec<_>>(),
        })
    };

    json!({
        "keys": {
            "ledger": public_key_to_hex(&parties.ledger_key.public_key_bytes()),
            "auditor": public_key_to_hex(&parties.auditor_key.public_key_bytes()),
        },
        "ledger": section(Party::Ledger),
        "auditor": section(Party::Auditor),
    })
    .to_string()
}

async fn engine_for(archive: &ProofArchive) -> LedgerValidationEngine {
    let store = archive.proof_store().await.unwrap();
    LedgerValidationEngine::new(
        Arc::new(store.source(Party::Ledger)),
        Arc::new(store.source(Party::Auditor)),
        Arc::new(archive.key_registry().unwrap()),
        Arc::new(store),
        ValidatorConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_validate_from_archive_file() {
    let parties = TestParties::new();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(archive_json(&parties, "asset-1", 5, Some(4)).as_bytes())
        .unwrap();

    let archive = ProofArchive::load(file.path()).await.unwrap();
    let engine = engine_for(&archive).await;

    let result = engine.validate_range("asset-1", 0, 3).await.unwrap();
    assert_eq!(result.code, StatusCode::Ok);

    let result = engine.validate("asset-1").await.unwrap();
    assert_eq!(result.code, StatusCode::OneSideMissing);
    assert_eq!(result.ledger_proof.unwrap().age, 4);
}

#[tokio::test]
async fn test_missing_archive_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProofArchive::load(dir.path().join("absent.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Io { .. }));
}

#[test]
fn test_invalid_key_is_rejected() {
    let archive = ProofArchive::from_json(r#"{"keys": {"auditor": "0xzz"}}"#).unwrap();
    assert!(matches!(
        archive.key_registry(),
        Err(ArchiveError::InvalidKey {
            party: Party::Auditor
        })
    ));
}
