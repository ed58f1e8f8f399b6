//! Build errors for rule and validator builders.

use thiserror::Error;

/// Errors that can occur while defining rules and validators.
///
/// Raised immediately by the builder call that misuses the API, never
/// deferred to evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Property name must not be empty. Use a model-level rule instead")]
    EmptyPropertyName,

    #[error("Rule set names must not be empty")]
    EmptyRuleSetName,

    #[error("Check name must not be empty")]
    EmptyCheckName,

    #[error("A transformer is already attached to this rule")]
    TransformerAlreadyAttached,

    #[error("Transformers must be attached before checks, filters or index builders")]
    TransformAfterChecks,

    #[error("No rules defined. Add at least one rule")]
    NoRules,
}
