//! Error types for the ledger validator
//!
//! Only faults live here. Tamper findings are `StatusCode`s carried in a
//! normal `LedgerValidationResult`.

use thiserror::Error;

use crate::domain::Party;
use crate::validation::MalformedProofError;

/// Failure reported by a proof retrieval or payload collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport-level failure; eligible for retry
    #[error("transport error: {0}")]
    Transport(String),

    /// The party did not answer in time; treated as absent
    #[error("request timed out")]
    Timeout,
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

/// No public key is registered for a party
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no public key registered for {0}")]
pub struct KeyNotFoundError(pub Party);

/// Faults that abort a validation call without producing a verdict
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Requested age range is empty or inverted
    #[error("invalid age range: start {start} > end {end}")]
    InvalidRange { start: u64, end: u64 },

    /// Requested age range exceeds the configured bound
    #[error("age range {start}..={end} spans more than {max} ages")]
    RangeTooLarge { start: u64, end: u64, max: u64 },

    /// Asset identifier is empty
    #[error("invalid asset id: {0:?}")]
    InvalidAssetId(String),

    /// Key registry has no key for a party
    #[error(transparent)]
    KeyNotFound(#[from] KeyNotFoundError),

    /// A party returned a record that is not a well-formed proof
    #[error("malformed proof from {party} at age {age}: {source}")]
    MalformedProof {
        party: Party,
        age: u64,
        #[source]
        source: MalformedProofError,
    },

    /// Transport failure persisted past the retry budget
    #[error("transport failure fetching {party} proof at age {age}: {message}")]
    Transport {
        party: Party,
        age: u64,
        message: String,
    },

    /// Payload reference needed for hash recomputation could not be obtained
    #[error("payload reference unavailable for {party} at age {age}: {message}")]
    PayloadReferenceUnavailable {
        party: Party,
        age: u64,
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ValidationError {
    /// Whether the fault stems from the request itself rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidRange { .. }
                | ValidationError::RangeTooLarge { .. }
                | ValidationError::InvalidAssetId(_)
        )
    }
}

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_distinguished() {
        assert!(ValidationError::InvalidRange { start: 3, end: 1 }.is_input_error());
        assert!(ValidationError::InvalidAssetId(String::new()).is_input_error());
        assert!(!ValidationError::KeyNotFound(KeyNotFoundError(Party::Auditor)).is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::from(KeyNotFoundError(Party::Ledger));
        assert_eq!(err.to_string(), "no public key registered for ledger");

        let err = ValidationError::Transport {
            party: Party::Auditor,
            age: 7,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "transport failure fetching auditor proof at age 7: connection refused"
        );
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(SourceError::Transport("reset".into()).is_retryable());
        assert!(!SourceError::Timeout.is_retryable());
    }
}
