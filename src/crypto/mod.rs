//! Cryptographic utilities for the ledger validator
//!
//! Provides:
//! - Domain-separated proof hash chaining (SHA-256)
//! - Party signing and verification (Ed25519)

mod hash;
mod signing;

pub use hash::*;
pub use signing::*;
