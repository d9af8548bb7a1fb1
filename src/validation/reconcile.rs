//! Cross-party reconciliation of one age

use crate::domain::{AssetProof, LinkStatus, SideReport, StatusCode};

/// One party's proof at one age together with its independent checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideCheck {
    pub proof: AssetProof,
    pub signature_valid: bool,
    pub link: LinkStatus,
}

impl SideCheck {
    /// Whether the proof passes both of its own checks
    pub fn is_self_consistent(&self) -> bool {
        self.signature_valid && !self.link.is_broken()
    }

    pub fn report(&self) -> SideReport {
        SideReport {
            signature_valid: self.signature_valid,
            link: self.link,
        }
    }
}

/// Classify one age from both parties' checks.
///
/// First match wins:
/// 1. both absent: `AssetNotFound`
/// 2. one absent: `OneSideMissing`
/// 3. a signature fails: `InvalidSignature`
/// 4. a link is broken: `InvalidContent`
/// 5. hashes differ: `InconsistentStates`
/// 6. otherwise `Ok`
///
/// Single-party defects outrank disagreement because they name the party at
/// fault.
pub fn reconcile(ledger: Option<&SideCheck>, auditor: Option<&SideCheck>) -> StatusCode {
    match (ledger, auditor) {
        (None, None) => StatusCode::AssetNotFound,
        (Some(_), None) | (None, Some(_)) => StatusCode::OneSideMissing,
        (Some(l), Some(a)) => {
            if !l.signature_valid || !a.signature_valid {
                StatusCode::InvalidSignature
            } else if l.link.is_broken() || a.link.is_broken() {
                StatusCode::InvalidContent
            } else if !l.proof.same_hash(&a.proof) {
                StatusCode::InconsistentStates
            } else {
                StatusCode::Ok
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(hash: u8, signature_valid: bool, link: LinkStatus) -> SideCheck {
        SideCheck {
            proof: AssetProof::new("asset-1", 5, "n5", [hash; 32], [0u8; 64]),
            signature_valid,
            link,
        }
    }

    fn good(hash: u8) -> SideCheck {
        side(hash, true, LinkStatus::Ok)
    }

    #[test]
    fn test_both_absent() {
        assert_eq!(reconcile(None, None), StatusCode::AssetNotFound);
    }

    #[test]
    fn test_one_absent_even_if_present_side_is_invalid() {
        let bad = side(1, false, LinkStatus::Broken);
        assert_eq!(reconcile(Some(&good(1)), None), StatusCode::OneSideMissing);
        assert_eq!(reconcile(None, Some(&bad)), StatusCode::OneSideMissing);
    }

    #[test]
    fn test_signature_outranks_link_and_disagreement() {
        let bad_sig = side(2, false, LinkStatus::Ok);
        let broken = side(1, true, LinkStatus::Broken);
        assert_eq!(
            reconcile(Some(&broken), Some(&bad_sig)),
            StatusCode::InvalidSignature
        );
    }

    #[test]
    fn test_link_outranks_disagreement() {
        let broken = side(2, true, LinkStatus::Broken);
        assert_eq!(
            reconcile(Some(&good(1)), Some(&broken)),
            StatusCode::InvalidContent
        );
    }

    #[test]
    fn test_disagreement() {
        assert_eq!(
            reconcile(Some(&good(1)), Some(&good(2))),
            StatusCode::InconsistentStates
        );
    }

    #[test]
    fn test_agreement_with_start_links() {
        let a = side(1, true, LinkStatus::Start);
        let b = side(1, true, LinkStatus::Start);
        assert_eq!(reconcile(Some(&a), Some(&b)), StatusCode::Ok);
        assert!(a.is_self_consistent());
    }
}
