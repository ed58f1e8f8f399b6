//! Errors that abort an evaluation run.

use crate::core::ValidationFailure;
use thiserror::Error;

/// Fault raised by a check's own logic.
pub type CheckError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a validation run.
///
/// Validation failures are never reported through this type; they are
/// collected on the `ValidationContext`.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Check '{check}' faulted while validating '{property}': {source}")]
    CheckFaulted {
        property: String,
        check: String,
        #[source]
        source: CheckError,
    },

    #[error("Validation was cancelled")]
    Cancelled,
}

impl EvaluationError {
    pub(crate) fn check_faulted(property: &str, check: &str, source: CheckError) -> Self {
        Self::CheckFaulted {
            property: property.to_string(),
            check: check.to_string(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A nested validator run that aborted after recording failures.
///
/// Returned as a [`CheckError`] so the invoker can keep the nested failures
/// and re-raise the nested run's own error.
#[derive(Debug, Error)]
#[error("Nested validation aborted after {} failure(s): {source}", .failures.len())]
pub(crate) struct NestedAbort {
    pub(crate) failures: Vec<ValidationFailure>,
    #[source]
    pub(crate) source: EvaluationError,
}
