//! Infrastructure layer for the ledger validator
//!
//! Contains:
//! - Error types (faults, as opposed to tamper findings)
//! - Collaborator traits (proof retrieval, key registry, payload references)
//! - In-memory collaborator implementations
//! - Proof archive loading for offline validation
//! - Retry with backoff for transport failures

mod archive;
mod error;
mod memory;
mod retry;
mod traits;

pub use archive::{ArchiveError, PartyArchive, PayloadEntry, ProofArchive};
pub use error::*;
pub use memory::{InMemoryProofSource, InMemoryProofStore, StaticKeyRegistry};
pub use retry::{Retry, RetryConfig, RetryResult};
pub use traits::*;
