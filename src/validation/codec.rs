//! Proof codec: wire record <-> `AssetProof`
//!
//! A wire record is a UTF-8 JSON object
//! `{"id", "age", "nonce", "hash", "signature"}` with `hash` and `signature`
//! in standard base64. Decoding is strict: anything that cannot be a valid
//! proof under SHA-256 / Ed25519 is rejected before verification starts.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{AssetProof, Hash256, Signature64, HASH_LENGTH, SIGNATURE_LENGTH};

/// Structural defect in a proof record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedProofError {
    #[error("record is not a JSON proof object: {0}")]
    NotAnObject(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("asset id is empty")]
    EmptyId,

    #[error("age must be non-negative, got {0}")]
    NegativeAge(i64),

    #[error("field `{field}` is not valid base64")]
    InvalidEncoding { field: &'static str },

    #[error("field `{field}` has {actual} bytes, expected {expected}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Lenient mirror of the wire shape; presence and ranges are checked by hand
#[derive(Deserialize)]
struct WireProof {
    id: Option<String>,
    age: Option<i64>,
    nonce: Option<String>,
    hash: Option<String>,
    signature: Option<String>,
}

/// Decode and structurally validate a proof record
pub fn decode(raw: &[u8]) -> Result<AssetProof, MalformedProofError> {
    let wire: WireProof =
        serde_json::from_slice(raw).map_err(|e| MalformedProofError::NotAnObject(e.to_string()))?;

    let id = wire.id.ok_or(MalformedProofError::MissingField("id"))?;
    if id.is_empty() {
        return Err(MalformedProofError::EmptyId);
    }

    let age = wire.age.ok_or(MalformedProofError::MissingField("age"))?;
    let age = u64::try_from(age).map_err(|_| MalformedProofError::NegativeAge(age))?;

    let nonce = wire.nonce.ok_or(MalformedProofError::MissingField("nonce"))?;

    let hash: Hash256 = decode_fixed::<HASH_LENGTH>("hash", wire.hash.as_deref())?;
    let signature: Signature64 =
        decode_fixed::<SIGNATURE_LENGTH>("signature", wire.signature.as_deref())?;

    Ok(AssetProof {
        id,
        age,
        nonce,
        hash,
        signature,
    })
}

/// Encode a proof as a wire record
///
/// # Panics
///
/// Never in practice: `AssetProof` has only string, integer and byte-array
/// fields, all of which serialize infallibly.
pub fn encode(proof: &AssetProof) -> Vec<u8> {
    serde_json::to_vec(proof).expect("AssetProof serialization is infallible")
}

fn decode_fixed<const N: usize>(
    field: &'static str,
    value: Option<&str>,
) -> Result<[u8; N], MalformedProofError> {
    let value = value.ok_or(MalformedProofError::MissingField(field))?;
    let bytes = STANDARD
        .decode(value)
        .map_err(|_| MalformedProofError::InvalidEncoding { field })?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| MalformedProofError::InvalidLength {
            field,
            expected: N,
            actual,
        })
}
