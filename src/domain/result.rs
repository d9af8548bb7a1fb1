//! Validation outcomes: status codes, the folded result, and per-age reports

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AssetProof;

/// Classification of a validation outcome.
///
/// Every variant other than `Ok` is a tamper or availability finding. These
/// are results, not faults; faults are `ValidationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    /// Both parties present, individually valid, and in agreement
    Ok,
    /// Neither party has a proof for the age
    AssetNotFound,
    /// Exactly one party has a proof for the age
    OneSideMissing,
    /// A proof's signature does not verify under its party's key
    InvalidSignature,
    /// A proof does not link to its predecessor in the same party's history
    InvalidContent,
    /// Both proofs are individually valid but attest different hashes
    InconsistentStates,
}

impl StatusCode {
    /// Rank used to fold per-age verdicts; higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::AssetNotFound => 1,
            StatusCode::OneSideMissing => 2,
            StatusCode::InvalidSignature => 3,
            StatusCode::InvalidContent => 4,
            StatusCode::InconsistentStates => 5,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::AssetNotFound => "ASSET_NOT_FOUND",
            StatusCode::OneSideMissing => "ONE_SIDE_MISSING",
            StatusCode::InvalidSignature => "INVALID_SIGNATURE",
            StatusCode::InvalidContent => "INVALID_CONTENT",
            StatusCode::InconsistentStates => "INCONSISTENT_STATES",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a hash-chain link check for one proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Recomputed hash matches the stored hash
    Ok,
    /// Recomputed hash differs, or the predecessor is out of order
    Broken,
    /// Nothing to link against (genesis or no predecessor available)
    Start,
}

impl LinkStatus {
    pub fn is_broken(&self) -> bool {
        matches!(self, LinkStatus::Broken)
    }
}

/// Outcome of validating one asset, possibly over a range of ages.
///
/// Invariant: `code == Ok` implies both proofs are present, attest the
/// same hash, and carry valid signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerValidationResult {
    pub code: StatusCode,
    pub ledger_proof: Option<AssetProof>,
    pub auditor_proof: Option<AssetProof>,
}

impl LedgerValidationResult {
    pub fn new(
        code: StatusCode,
        ledger_proof: Option<AssetProof>,
        auditor_proof: Option<AssetProof>,
    ) -> Self {
        Self {
            code,
            ledger_proof,
            auditor_proof,
        }
    }

    /// Result for an asset neither party knows about
    pub fn not_found() -> Self {
        Self::new(StatusCode::AssetNotFound, None, None)
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

/// Independent checks of one party's proof at one age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideReport {
    pub signature_valid: bool,
    pub link: LinkStatus,
}

/// Verdict for a single age within a validated range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeReport {
    pub age: u64,
    pub code: StatusCode,
    pub ledger: Option<SideReport>,
    pub auditor: Option<SideReport>,
}

/// Verbose outcome of a range validation: every age's verdict plus the fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub asset_id: String,
    pub ages: Vec<AgeReport>,
    pub result: LedgerValidationResult,
}

impl ValidationReport {
    /// Ages whose verdict is not `Ok`
    pub fn failing_ages(&self) -> impl Iterator<Item = &AgeReport> {
        self.ages.iter().filter(|a| !a.code.is_ok())
    }
}
