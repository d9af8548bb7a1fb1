//! Core type definitions for the ledger validator
//!
//! Fixed-size digest and signature aliases, the attesting party identity,
//! and serde helpers that encode binary fields as base64 on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte hash (SHA-256)
pub type Hash256 = [u8; 32];

/// 64-byte Ed25519 signature
pub type Signature64 = [u8; 64];

/// 32-byte Ed25519 public key
pub type PublicKey32 = [u8; 32];

/// Length of a proof hash in bytes
pub const HASH_LENGTH: usize = 32;

/// Length of a proof signature in bytes
pub const SIGNATURE_LENGTH: usize = 64;

/// One of the two independent parties attesting to an asset's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    /// The primary ledger service
    Ledger,
    /// The independent auditor service
    Auditor,
}

impl Party {
    pub const ALL: [Party; 2] = [Party::Ledger, Party::Auditor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Ledger => "ledger",
            Party::Auditor => "auditor",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde module for serializing Hash256 as standard base64
pub mod hash256_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes for Hash256"))
    }
}

/// Serde module for serializing Signature64 as standard base64
pub mod signature64_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64 bytes for Signature64"))
    }
}

/// Serde module for arbitrary byte strings as standard base64
pub mod bytes_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
