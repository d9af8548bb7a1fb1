//! Signature verification of a single proof against its party's key

use crate::crypto::PartyVerifyingKey;
use crate::domain::{AssetProof, Party};
use crate::infra::{KeyNotFoundError, KeyRegistry};

/// Whether `proof.signature` is a valid signature over `proof.hash`.
///
/// Cryptographic mismatch is `false`, never an error.
pub fn verify(proof: &AssetProof, key: &PartyVerifyingKey) -> bool {
    key.verify(&proof.hash, &proof.signature).is_ok()
}

/// Verify using the key registered for `party`.
///
/// Fails only when the registry has no key for the party, which is an
/// environment fault rather than a finding about the proof.
pub fn verify_for(
    proof: &AssetProof,
    party: Party,
    registry: &dyn KeyRegistry,
) -> Result<bool, KeyNotFoundError> {
    let key = registry.public_key_of(party)?;
    Ok(verify(proof, &key))
}
