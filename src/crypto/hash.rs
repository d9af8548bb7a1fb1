//! Asset proof hashing with domain separation
//!
//! Every age of an asset is hashed over its predecessor's hash, forming a
//! per-party hash chain:
//!
//! ```text
//! proof_preimage =
//!   b"LEDGER_ASSET_PROOF_V1" ||
//!   prev_hash(32) ||
//!   ENC_BYTES(payload_reference) ||
//!   ENC_STR(nonce) ||
//!   U64_BE(age)
//!
//! proof_hash = SHA256(proof_preimage)
//! ```
//!
//! Age 0 links to [`GENESIS_PREV_HASH`].

use sha2::{Digest, Sha256};

pub use crate::domain::Hash256;

/// Domain prefix for asset proof hashing
pub const DOMAIN_ASSET_PROOF: &[u8] = b"LEDGER_ASSET_PROOF_V1";

/// Predecessor hash used by the first age of every asset
pub const GENESIS_PREV_HASH: Hash256 = [0u8; 32];

// ============================================================================
// Binary Encoding Helpers
// ============================================================================

/// Encode a u32 as 4 bytes big-endian
#[inline]
pub fn u32_be(n: u32) -> [u8; 4] {
    n.to_be_bytes()
}

/// Encode a u64 as 8 bytes big-endian
#[inline]
pub fn u64_be(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

/// Encode bytes with a length prefix
/// Format: U32_BE(len) || bytes
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(4 + bytes.len());
    result.extend_from_slice(&u32_be(bytes.len() as u32));
    result.extend_from_slice(bytes);
    result
}

/// Encode a string as length-prefixed UTF-8 bytes
pub fn encode_string(s: &str) -> Vec<u8> {
    encode_bytes(s.as_bytes())
}

// ============================================================================
// Proof Hash
// ============================================================================

/// Inputs bound into one age's proof hash
pub struct ProofHashParams<'a> {
    pub prev_hash: &'a Hash256,
    pub payload_reference: &'a [u8],
    pub nonce: &'a str,
    pub age: u64,
}

/// Compute the chain hash for one age of an asset
pub fn compute_proof_hash(params: &ProofHashParams) -> Hash256 {
    let mut hasher = Sha256::new();

    hasher.update(DOMAIN_ASSET_PROOF);
    hasher.update(params.prev_hash);

    // Length prefixes keep (payload, nonce) boundaries unambiguous
    hasher.update(encode_bytes(params.payload_reference));
    hasher.update(encode_string(params.nonce));

    hasher.update(u64_be(params.age));

    hasher.finalize().into()
}
