//! Hash-chain linkage between consecutive ages of one party's history
//!
//! This is the tamper signal for a single party, independent of what the
//! other party holds: rewriting any age changes its hash, which no longer
//! matches what the next age was chained over.

use crate::crypto::{compute_proof_hash, ProofHashParams};
use crate::domain::{AssetProof, LinkStatus};

/// Check `current` against its predecessor in the same party's history.
///
/// `payload_reference` is the opaque payload reference for `current`.
pub fn check_link(
    previous: Option<&AssetProof>,
    current: &AssetProof,
    payload_reference: &[u8],
) -> LinkStatus {
    if current.age == 0 {
        return LinkStatus::Start;
    }
    let Some(previous) = previous else {
        return LinkStatus::Start;
    };

    // A predecessor from another asset or another age is a reordering
    if previous.id != current.id || previous.age.checked_add(1) != Some(current.age) {
        return LinkStatus::Broken;
    }

    let expected = compute_proof_hash(&ProofHashParams {
        prev_hash: &previous.hash,
        payload_reference,
        nonce: &current.nonce,
        age: current.age,
    });

    if expected == current.hash {
        LinkStatus::Ok
    } else {
        LinkStatus::Broken
    }
}
