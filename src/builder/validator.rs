//! Builder for validators.

use crate::builder::capture::{try_with_capture, RuleSink};
use crate::builder::error::BuildError;
use crate::engine::{Validator, ValidatorConfig};
use crate::rules::{CascadeMode, ValidationRule};

/// Builder for a [`Validator`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::{RuleBuilder, ValidatorBuilder};
/// use rulebook::rules::Check;
///
/// struct Signup {
///     email: String,
///     age: u32,
/// }
///
/// let validator = ValidatorBuilder::new()
///     .rules(|sink| {
///         sink.add(
///             RuleBuilder::for_property("Email", |s: &Signup| s.email.clone())?
///                 .check(Check::must("required", |e: &String| !e.is_empty(), "'{PropertyName}' is required"))?
///                 .build(),
///         );
///         sink.add(
///             RuleBuilder::for_property("Age", |s: &Signup| s.age)?
///                 .check(Check::must("adult", |a: &u32| *a >= 18, "must be an adult"))?
///                 .build(),
///         );
///         Ok(())
///     })
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let result = validator.validate(&Signup { email: String::new(), age: 30 }).unwrap();
/// assert_eq!(result.to_string(), "'Email' is required");
/// ```
pub struct ValidatorBuilder<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
    config: ValidatorConfig,
}

impl<T> ValidatorBuilder<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            config: ValidatorConfig::default(),
        }
    }

    /// Add a top-level rule after every existing one.
    pub fn rule<R>(mut self, rule: R) -> Self
    where
        R: ValidationRule<T> + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Add every rule `body` declares, in declaration order.
    pub fn rules<F>(mut self, body: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&mut RuleSink<T>) -> Result<(), BuildError>,
    {
        self.rules.extend(try_with_capture(body)?);
        Ok(self)
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Validator-level cascade applied across top-level rules.
    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.config.cascade = mode;
        self
    }

    /// Select `rule_set` in the convenience `validate` entry points.
    pub fn rule_set(mut self, rule_set: impl Into<String>) -> Result<Self, BuildError> {
        let rule_set = rule_set.into();
        if rule_set.trim().is_empty() {
            return Err(BuildError::EmptyRuleSetName);
        }
        self.config.rule_sets.push(rule_set);
        Ok(self)
    }

    /// Build the validator.
    /// Returns an error if no rules were added.
    pub fn build(self) -> Result<Validator<T>, BuildError> {
        if self.rules.is_empty() {
            return Err(BuildError::NoRules);
        }
        Ok(Validator::new(self.rules, self.config))
    }
}

impl<T> Default for ValidatorBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RuleBuilder;
    use crate::rules::Check;

    #[derive(Debug)]
    struct Ticket {
        seat: String,
        row: u32,
    }

    fn seat_rule() -> crate::rules::PropertyRule<Ticket, String> {
        RuleBuilder::for_property("Seat", |t: &Ticket| t.seat.clone())
            .unwrap()
            .check(Check::must("required", |s: &String| !s.is_empty(), "required"))
            .unwrap()
            .build()
    }

    #[test]
    fn builder_requires_rules() {
        let result = ValidatorBuilder::<Ticket>::new().build();

        assert!(matches!(result, Err(BuildError::NoRules)));
    }

    #[test]
    fn builder_rejects_empty_rule_set() {
        let result = ValidatorBuilder::<Ticket>::new().rule_set(" ");

        assert!(matches!(result, Err(BuildError::EmptyRuleSetName)));
    }

    #[test]
    fn rules_keep_declaration_order() {
        let validator = ValidatorBuilder::new()
            .rule(seat_rule())
            .rules(|sink| {
                sink.add(
                    RuleBuilder::for_property("Row", |t: &Ticket| t.row)?
                        .check(Check::must("positive", |r: &u32| *r > 0, "row"))?
                        .build(),
                );
                Ok(())
            })
            .unwrap()
            .build()
            .unwrap();

        let names: Vec<_> = validator
            .rules()
            .iter()
            .filter_map(|rule| rule.meta().property_name())
            .collect();
        assert_eq!(names, vec!["Seat", "Row"]);
    }

    #[test]
    fn failing_rules_body_is_reported() {
        let result = ValidatorBuilder::new().rule(seat_rule()).rules(|sink| {
            sink.add(
                RuleBuilder::for_property("Row", |t: &Ticket| t.row)?
                    .in_rule_set("")?
                    .build(),
            );
            Ok(())
        });

        assert!(matches!(result, Err(BuildError::EmptyRuleSetName)));
    }

    #[test]
    fn rule_sets_select_tagged_rules() {
        let validator = ValidatorBuilder::new()
            .rule(seat_rule())
            .rule(
                RuleBuilder::for_property("Row", |t: &Ticket| t.row)
                    .unwrap()
                    .in_rule_set("seating")
                    .unwrap()
                    .check(Check::must("positive", |r: &u32| *r > 0, "row"))
                    .unwrap()
                    .build(),
            )
            .rule_set("seating")
            .unwrap()
            .build()
            .unwrap();

        let ticket = Ticket {
            seat: String::new(),
            row: 0,
        };
        let result = validator.validate(&ticket).unwrap();

        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].property_name, "Row");
    }
}
