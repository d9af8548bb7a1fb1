//! Asset proof validation
//!
//! - [`codec`] - wire record decoding and structural checks
//! - [`signature`] - per-party signature verification
//! - [`chain`] - hash-chain linkage within one party's history
//! - [`reconcile`] - cross-party classification of one age
//! - [`engine`] - range orchestration and severity fold

pub mod chain;
pub mod codec;
pub mod engine;
pub mod reconcile;
pub mod signature;

pub use chain::check_link;
pub use codec::MalformedProofError;
pub use engine::LedgerValidationEngine;
pub use reconcile::{reconcile, SideCheck};
