//! Asset proof: one party's signed attestation of one asset version

use serde::{Deserialize, Serialize};

use super::{hash256_base64, signature64_base64, Hash256, Signature64};

/// Immutable attestation binding an asset's hash at a given age.
///
/// Serialized as `{id, age, nonce, hash, signature}` with `hash` and
/// `signature` in standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetProof {
    /// Opaque asset identifier
    pub id: String,

    /// Version number of the asset
    pub age: u64,

    /// Token bound into the hash
    pub nonce: String,

    /// SHA-256 over (previous hash, payload reference, nonce, age)
    #[serde(with = "hash256_base64")]
    pub hash: Hash256,

    /// Ed25519 signature over `hash` by the issuing party
    #[serde(with = "signature64_base64")]
    pub signature: Signature64,
}

impl AssetProof {
    pub fn new(
        id: impl Into<String>,
        age: u64,
        nonce: impl Into<String>,
        hash: Hash256,
        signature: Signature64,
    ) -> Self {
        Self {
            id: id.into(),
            age,
            nonce: nonce.into(),
            hash,
            signature,
        }
    }

    /// Hex-encoded hash, for log fields
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Whether both proofs attest the same digest
    pub fn same_hash(&self, other: &AssetProof) -> bool {
        self.hash == other.hash
    }
}
