//! Ledger validation engine
//!
//! Drives an age range through decode, signature, link and reconciliation
//! checks for both parties and folds the per-age verdicts into the single
//! worst one.
//!
//! ```text
//!  age:        a-1 (anchor)     a            a+1          ...   b
//!  ledger:       P ──link──▶   P ──link──▶   P ──link──▶        P
//!  auditor:      P ──link──▶   P ──link──▶   P ──link──▶        P
//!                              │             │                  │
//!                          reconcile     reconcile          reconcile
//!                              └──────── fold by severity ──────┘
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::ValidatorConfig;
use crate::domain::{
    AgeReport, AssetProof, LedgerValidationResult, LinkStatus, Party, StatusCode, ValidationReport,
};
use crate::infra::{
    KeyRegistry, PayloadReferences, ProofSource, Result, Retry, SourceError, ValidationError,
};

use super::chain::check_link;
use super::codec;
use super::reconcile::{reconcile, SideCheck};
use super::signature::verify_for;

/// Upper bound on the per-age report buffer reserved up front
const MAX_PREALLOCATED_AGES: u64 = 1024;

/// Worst verdict seen so far and the proofs that evidence it
struct Fold {
    code: StatusCode,
    ledger_proof: Option<AssetProof>,
    auditor_proof: Option<AssetProof>,
}

impl Fold {
    /// Keep the first age at which the highest severity occurs
    fn observe(
        slot: &mut Option<Fold>,
        code: StatusCode,
        ledger: Option<&SideCheck>,
        auditor: Option<&SideCheck>,
    ) {
        let worse = slot
            .as_ref()
            .map_or(true, |worst| code.severity() > worst.code.severity());
        if worse {
            *slot = Some(Fold {
                code,
                ledger_proof: ledger.map(|s| s.proof.clone()),
                auditor_proof: auditor.map(|s| s.proof.clone()),
            });
        }
    }

    fn into_result(self) -> LedgerValidationResult {
        LedgerValidationResult::new(self.code, self.ledger_proof, self.auditor_proof)
    }
}

/// Validates an asset's history as recorded by the ledger and the auditor.
///
/// Holds no per-call state; one engine can serve concurrent validations.
pub struct LedgerValidationEngine {
    ledger: Arc<dyn ProofSource>,
    auditor: Arc<dyn ProofSource>,
    keys: Arc<dyn KeyRegistry>,
    payloads: Arc<dyn PayloadReferences>,
    config: ValidatorConfig,
    retry: Retry,
}

impl LedgerValidationEngine {
    /// Wire the engine to its collaborators.
    ///
    /// Fails if the sources are swapped, since every finding would then be
    /// attributed to the wrong party.
    pub fn new(
        ledger: Arc<dyn ProofSource>,
        auditor: Arc<dyn ProofSource>,
        keys: Arc<dyn KeyRegistry>,
        payloads: Arc<dyn PayloadReferences>,
        config: ValidatorConfig,
    ) -> Result<Self> {
        for (expected, source) in [(Party::Ledger, &ledger), (Party::Auditor, &auditor)] {
            if source.party() != expected {
                return Err(ValidationError::Configuration(format!(
                    "{expected} slot was given a source for {}",
                    source.party()
                )));
            }
        }

        let retry = Retry::new(config.retry.clone());
        Ok(Self {
            ledger,
            auditor,
            keys,
            payloads,
            config,
            retry,
        })
    }

    /// Validate the latest age either party knows for the asset
    pub async fn validate(&self, asset_id: &str) -> Result<LedgerValidationResult> {
        Ok(self.validate_latest_detailed(asset_id).await?.result)
    }

    /// Validate the latest known age, keeping its per-age verdict
    #[instrument(skip_all, fields(asset_id = %asset_id))]
    pub async fn validate_latest_detailed(&self, asset_id: &str) -> Result<ValidationReport> {
        check_asset_id(asset_id)?;

        let (ledger_latest, auditor_latest) = tokio::join!(
            self.latest_age(Party::Ledger, asset_id),
            self.latest_age(Party::Auditor, asset_id),
        );
        let latest = match (ledger_latest?, auditor_latest?) {
            (None, None) => {
                info!(code = %StatusCode::AssetNotFound, "Asset unknown to both parties");
                return Ok(ValidationReport {
                    asset_id: asset_id.to_string(),
                    ages: Vec::new(),
                    result: LedgerValidationResult::not_found(),
                });
            }
            (l, a) => l.max(a).unwrap_or_default(),
        };

        self.validate_detailed(asset_id, latest, latest).await
    }

    /// Validate every age in `start..=end` and return the worst verdict
    pub async fn validate_range(
        &self,
        asset_id: &str,
        start: u64,
        end: u64,
    ) -> Result<LedgerValidationResult> {
        Ok(self.validate_detailed(asset_id, start, end).await?.result)
    }

    /// Validate every age in `start..=end`, keeping each age's verdict
    #[instrument(skip_all, fields(asset_id = %asset_id, start, end))]
    pub async fn validate_detailed(
        &self,
        asset_id: &str,
        start: u64,
        end: u64,
    ) -> Result<ValidationReport> {
        check_asset_id(asset_id)?;
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        if end - start >= self.config.max_range_len {
            return Err(ValidationError::RangeTooLarge {
                start,
                end,
                max: self.config.max_range_len,
            });
        }

        // Predecessors of `start`, used only to link-check the first age
        let (mut prev_ledger, mut prev_auditor) = if start > 0 {
            let (l, a) = tokio::join!(
                self.fetch_anchor(Party::Ledger, asset_id, start - 1),
                self.fetch_anchor(Party::Auditor, asset_id, start - 1),
            );
            (l?, a?)
        } else {
            (None, None)
        };

        let mut ages = Vec::with_capacity(initial_capacity(start, end));
        let mut worst: Option<Fold> = None;

        for age in start..=end {
            let (ledger, auditor) = tokio::join!(
                self.observe(Party::Ledger, asset_id, age, prev_ledger.as_ref()),
                self.observe(Party::Auditor, asset_id, age, prev_auditor.as_ref()),
            );
            let (ledger, auditor) = (ledger?, auditor?);

            let code = reconcile(ledger.as_ref(), auditor.as_ref());
            let lone = match (&ledger, &auditor) {
                (Some(l), None) => Some((Party::Ledger, l)),
                (None, Some(a)) => Some((Party::Auditor, a)),
                _ => None,
            };
            if let Some((party, present)) = lone {
                if !present.is_self_consistent() {
                    warn!(
                        age,
                        %party,
                        signature_valid = present.signature_valid,
                        link = ?present.link,
                        "Lone proof also fails its own checks"
                    );
                }
            }
            debug!(age, code = %code, "Age reconciled");

            Fold::observe(&mut worst, code, ledger.as_ref(), auditor.as_ref());
            ages.push(AgeReport {
                age,
                code,
                ledger: ledger.as_ref().map(SideCheck::report),
                auditor: auditor.as_ref().map(SideCheck::report),
            });

            prev_ledger = ledger.map(|s| s.proof);
            prev_auditor = auditor.map(|s| s.proof);
        }

        let result = worst
            .map(Fold::into_result)
            .unwrap_or_else(LedgerValidationResult::not_found);

        info!(
            ages = ages.len(),
            failing = ages.iter().filter(|a| !a.code.is_ok()).count(),
            code = %result.code,
            "Validation complete"
        );

        Ok(ValidationReport {
            asset_id: asset_id.to_string(),
            ages,
            result,
        })
    }

    /// Fetch, decode and self-check one party's proof at one age
    async fn observe(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
        previous: Option<&AssetProof>,
    ) -> Result<Option<SideCheck>> {
        let Some(proof) = self.fetch_decoded(party, asset_id, age).await? else {
            return Ok(None);
        };

        let link = if proof.id != asset_id || proof.age != age {
            // Served a proof for something other than what was asked
            warn!(
                %party,
                age,
                served_id = %proof.id,
                served_age = proof.age,
                "Party served a mismatched proof"
            );
            LinkStatus::Broken
        } else if age > 0 && previous.is_some() {
            let payload = self.payload_reference(party, asset_id, age).await?;
            check_link(previous, &proof, &payload)
        } else {
            LinkStatus::Start
        };

        let signature_valid = verify_for(&proof, party, self.keys.as_ref())?;

        if !signature_valid || link.is_broken() {
            debug!(
                %party,
                age,
                signature_valid,
                link = ?link,
                hash = %proof.hash_hex(),
                "Proof failed self-check"
            );
        }

        Ok(Some(SideCheck {
            proof,
            signature_valid,
            link,
        }))
    }

    /// Predecessor proof for the first requested age.
    ///
    /// The anchor lies outside the requested range, so a missing or
    /// unreadable one only means the first age is checked as a start.
    async fn fetch_anchor(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
    ) -> Result<Option<AssetProof>> {
        match self.fetch_decoded(party, asset_id, age).await {
            Ok(anchor) => Ok(anchor.filter(|p| p.id == asset_id && p.age == age)),
            Err(ValidationError::MalformedProof { source, .. }) => {
                warn!(%party, age, error = %source, "Unreadable anchor proof, linking from start");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_decoded(
        &self,
        party: Party,
        asset_id: &str,
        age: u64,
    ) -> Result<Option<AssetProof>> {
        let source = self.source(party);
        let context = format!("fetch {party} proof {asset_id}@{age}");
        let outcome = self
            .call_source(&context, || source.fetch_proof(asset_id, age))
            .await;

        let Some(raw) = self.absent_or_fault(party, age, outcome)?.flatten() else {
            return Ok(None);
        };

        codec::decode(&raw)
            .map(Some)
            .map_err(|source| ValidationError::MalformedProof { party, age, source })
    }

    async fn latest_age(&self, party: Party, asset_id: &str) -> Result<Option<u64>> {
        let source = self.source(party);
        let context = format!("latest {party} age {asset_id}");
        let outcome = self
            .call_source(&context, || source.latest_age(asset_id))
            .await;
        Ok(self.absent_or_fault(party, 0, outcome)?.flatten())
    }

    async fn payload_reference(&self, party: Party, asset_id: &str, age: u64) -> Result<Vec<u8>> {
        let context = format!("payload {party} {asset_id}@{age}");
        let outcome = self
            .call_source(&context, || self.payloads.payload_reference(party, asset_id, age))
            .await;

        match outcome {
            Ok(Some(reference)) => Ok(reference),
            Ok(None) => Err(ValidationError::PayloadReferenceUnavailable {
                party,
                age,
                message: "no payload reference recorded".into(),
            }),
            Err(e) => Err(ValidationError::PayloadReferenceUnavailable {
                party,
                age,
                message: e.to_string(),
            }),
        }
    }

    /// Run a collaborator call under the fetch timeout and retry policy
    async fn call_source<T, F, Fut>(
        &self,
        context: &str,
        op: F,
    ) -> std::result::Result<T, SourceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, SourceError>>,
    {
        let timeout = self.config.fetch_timeout;
        self.retry
            .run_with_predicate(
                context,
                || {
                    let call = op();
                    async move {
                        tokio::time::timeout(timeout, call)
                            .await
                            .unwrap_or(Err(SourceError::Timeout))
                    }
                },
                SourceError::is_retryable,
            )
            .await
            .into_result()
    }

    /// Timeouts become absence; transport failures abort unless configured
    /// to count as absence too.
    fn absent_or_fault<T>(
        &self,
        party: Party,
        age: u64,
        outcome: std::result::Result<T, SourceError>,
    ) -> Result<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(SourceError::Timeout) => {
                warn!(%party, age, "Party did not respond in time, treating as absent");
                Ok(None)
            }
            Err(SourceError::Transport(message)) if self.config.transport_failure_as_absent => {
                warn!(%party, age, error = %message, "Transport failure, treating as absent");
                Ok(None)
            }
            Err(SourceError::Transport(message)) => {
                Err(ValidationError::Transport { party, age, message })
            }
        }
    }

    fn source(&self, party: Party) -> &dyn ProofSource {
        match party {
            Party::Ledger => self.ledger.as_ref(),
            Party::Auditor => self.auditor.as_ref(),
        }
    }
}

/// Reserve room for the whole range only when it is small
fn initial_capacity(start: u64, end: u64) -> usize {
    let len = (end - start).saturating_add(1);
    len.min(MAX_PREALLOCATED_AGES) as usize
}

fn check_asset_id(asset_id: &str) -> Result<()> {
    if asset_id.trim().is_empty() {
        return Err(ValidationError::InvalidAssetId(asset_id.to_string()));
    }
    Ok(())
}
