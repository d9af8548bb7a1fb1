//! Party signing and verification
//!
//! Provides Ed25519 signature operations over asset proof hashes. Each
//! attesting party signs `proof.hash` with its own key.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

pub use crate::domain::{PublicKey32, Signature64};
use crate::crypto::hash::Hash256;

/// Ed25519 secret key (32 bytes)
pub type SecretKey32 = [u8; SECRET_KEY_LENGTH];

/// Error type for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid public key format")]
    InvalidPublicKeyFormat,

    #[error("signature verification failed")]
    VerificationFailed,
}

// ============================================================================
// Party Signing Key
// ============================================================================

/// Party signing keypair for Ed25519 signatures
#[derive(Clone)]
pub struct PartySigningKey {
    signing_key: SigningKey,
}

impl PartySigningKey {
    /// Generate a new random signing key
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create from secret key bytes
    pub fn from_bytes(bytes: &SecretKey32) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Get the secret key bytes
    pub fn to_bytes(&self) -> SecretKey32 {
        self.signing_key.to_bytes()
    }

    /// Get the public key for this signing key
    pub fn public_key(&self) -> PartyVerifyingKey {
        PartyVerifyingKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> PublicKey32 {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a proof hash
    pub fn sign(&self, proof_hash: &Hash256) -> Signature64 {
        self.signing_key.sign(proof_hash).to_bytes()
    }
}

impl std::fmt::Debug for PartySigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartySigningKey")
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Party Verifying Key
// ============================================================================

/// Party public key for Ed25519 signature verification
#[derive(Clone, PartialEq, Eq)]
pub struct PartyVerifyingKey {
    verifying_key: VerifyingKey,
}

impl PartyVerifyingKey {
    /// Create from public key bytes
    pub fn from_bytes(bytes: &PublicKey32) -> Result<Self, SigningError> {
        let verifying_key =
            VerifyingKey::from_bytes(bytes).map_err(|_| SigningError::InvalidPublicKeyFormat)?;
        Ok(Self { verifying_key })
    }

    /// Get the public key bytes
    pub fn to_bytes(&self) -> PublicKey32 {
        self.verifying_key.to_bytes()
    }

    /// Verify a signature over a proof hash
    pub fn verify(&self, proof_hash: &Hash256, signature: &Signature64) -> Result<(), SigningError> {
        let sig = Signature::from_bytes(signature);
        self.verifying_key
            .verify(proof_hash, &sig)
            .map_err(|_| SigningError::VerificationFailed)
    }
}

impl std::fmt::Debug for PartyVerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartyVerifyingKey")
            .field("public_key", &hex::encode(self.to_bytes()))
            .finish()
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Convert public key bytes to hex string with 0x prefix
pub fn public_key_to_hex(public_key: &PublicKey32) -> String {
    format!("0x{}", hex::encode(public_key))
}

/// Parse public key from hex string (with or without 0x prefix)
pub fn public_key_from_hex(hex_str: &str) -> Result<PublicKey32, SigningError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(hex_str).map_err(|_| SigningError::InvalidPublicKeyFormat)?;
    bytes
        .try_into()
        .map_err(|_| SigningError::InvalidPublicKeyFormat)
}

// ============================================================================
// Tests
// ============================================================================
