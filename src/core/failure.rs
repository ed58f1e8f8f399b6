//! Validation failures and the result of a validation run.
//!
//! Failures are data, never errors: a failed check appends a
//! `ValidationFailure` to the run's failure list and evaluation carries on.

use serde::{Deserialize, Serialize};
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// How serious a failure is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

/// A single failed check against a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Full dotted/indexed property name, e.g. `Order.Lines[2].Sku`
    pub property_name: String,

    /// Human-readable message
    pub error_message: String,

    /// The value the check saw, after any transformation
    pub attempted_value: Option<serde_json::Value>,

    /// Machine-readable error code
    pub error_code: Option<String>,

    pub severity: Severity,
}

impl ValidationFailure {
    pub fn new(property_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
            attempted_value: None,
            error_code: None,
            severity: Severity::Error,
        }
    }

    pub fn with_attempted_value(mut self, value: serde_json::Value) -> Self {
        self.attempted_value = Some(value);
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_message)
    }
}

/// Ordered failures collected by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn new(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    /// True when no failure of any severity was recorded.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    /// Failures reported against exactly `property_name`.
    pub fn failures_for<'a>(
        &'a self,
        property_name: &'a str,
    ) -> impl Iterator<Item = &'a ValidationFailure> + 'a {
        self.failures
            .iter()
            .filter(move |failure| failure.property_name == property_name)
    }

    /// Convert into a `Validation`, accumulating every failure.
    pub fn into_validation(self) -> Validation<(), NonEmptyVec<ValidationFailure>> {
        let checks: Vec<Validation<(), NonEmptyVec<ValidationFailure>>> =
            self.failures.into_iter().map(Validation::fail).collect();

        Validation::all_vec(checks).map(|_| ())
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, failure) in self.failures.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
