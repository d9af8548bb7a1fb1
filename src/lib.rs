//! Ledger Validator Library
//!
//! Tamper detection for assets whose history is recorded independently by a
//! primary ledger and an auditor. Each party's proof for each age is checked
//! for structure, signature and hash-chain linkage, the two parties are
//! compared, and the worst finding over the requested range is reported.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (proofs, parties, status codes)
//! - [`crypto`] - Proof hash chaining and Ed25519 signatures
//! - [`validation`] - Codec, verifier, linker, reconciler and engine
//! - [`infra`] - Collaborator traits, in-memory store, archive, retry, errors
//! - [`config`] - Engine configuration
//! - [`telemetry`] - Tracing subscriber setup

pub mod config;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::ValidatorConfig;
pub use domain::{AssetProof, LedgerValidationResult, Party, StatusCode, ValidationReport};
pub use infra::{Result, ValidationError};
pub use validation::LedgerValidationEngine;
