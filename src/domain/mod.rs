//! Domain models for the ledger validator
//!
//! Asset proofs, attesting parties, status codes and validation reports.

mod proof;
mod result;
mod types;

pub use proof::*;
pub use result::*;
pub use types::*;
