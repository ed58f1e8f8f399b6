//! Builder for property and model-level rules.

use crate::builder::error::BuildError;
use crate::builder::parts::RuleParts;
use crate::rules::{Check, CheckInvoker, PropertyRule, Transformer, ValueFn};
use std::sync::Arc;

/// Builder for a rule validating one value read from the instance.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::RuleBuilder;
/// use rulebook::rules::{CascadeMode, Check, ValidationRule};
///
/// struct Customer {
///     email: String,
/// }
///
/// let rule = RuleBuilder::for_property("Email", |c: &Customer| c.email.clone())
///     .unwrap()
///     .cascade(CascadeMode::Stop)
///     .check(Check::must("required", |e: &String| !e.is_empty(), "'{PropertyName}' is required"))
///     .unwrap()
///     .check(Check::must("shape", |e: &String| e.contains('@'), "'{PropertyName}' is not an email"))
///     .unwrap()
///     .build();
///
/// assert_eq!(rule.meta().property_name(), Some("Email"));
/// assert_eq!(rule.checks().len(), 2);
/// ```
pub struct RuleBuilder<T, P> {
    parts: RuleParts<T>,
    value: ValueFn<T, P>,
    transformed: bool,
    invoker: CheckInvoker<T, P>,
}

impl<T, P> RuleBuilder<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Start a rule for the member `name`, read by `accessor`.
    pub fn for_property<F>(name: impl Into<String>, accessor: F) -> Result<Self, BuildError>
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        Ok(Self::with_parts(RuleParts::property(name)?, Arc::new(accessor)))
    }

    /// Start a model-level rule; failures are reported under the display
    /// name, or under the enclosing path when there is none.
    pub fn for_model<F>(accessor: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        Self::with_parts(RuleParts::model(), Arc::new(accessor))
    }

    fn with_parts(parts: RuleParts<T>, value: ValueFn<T, P>) -> Self {
        Self {
            parts,
            value,
            transformed: false,
            invoker: CheckInvoker::new(),
        }
    }

    rule_options!();

    /// Append a check after every existing one.
    pub fn check(mut self, check: Check<T, P>) -> Result<Self, BuildError> {
        if check.name().trim().is_empty() {
            return Err(BuildError::EmptyCheckName);
        }
        self.invoker.push(check);
        Ok(self)
    }

    /// Remove the first check named `name`, if any.
    pub fn remove_check(mut self, name: &str) -> Self {
        self.invoker.remove(name);
        self
    }

    /// Validate `transform(instance, raw)` instead of the raw value.
    ///
    /// Everything configured so far carries over to the returned builder.
    /// Must be called at most once, and before any check is added.
    pub fn transform<Q, F>(self, transform: F) -> Result<RuleBuilder<T, Q>, BuildError>
    where
        Q: Send + Sync + 'static,
        F: Fn(&T, P) -> Q + Send + Sync + 'static,
    {
        if self.transformed {
            return Err(BuildError::TransformerAlreadyAttached);
        }
        if !self.invoker.is_empty() {
            return Err(BuildError::TransformAfterChecks);
        }

        Ok(RuleBuilder {
            parts: self.parts,
            value: Transformer::new(transform).compose(self.value),
            transformed: true,
            invoker: CheckInvoker::new(),
        })
    }

    pub fn build(self) -> PropertyRule<T, P> {
        PropertyRule::new(self.parts.into_core(), self.value, self.invoker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RuleSetSelector, ValidationContext};
    use crate::rules::{CascadeMode, ValidationRule};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Shipment {
        reference: String,
        weight: u32,
        fragile: bool,
    }

    fn shipment(reference: &str, weight: u32) -> Shipment {
        Shipment {
            reference: reference.to_string(),
            weight,
            fragile: false,
        }
    }

    fn reference_rule() -> RuleBuilder<Shipment, String> {
        RuleBuilder::for_property("Reference", |s: &Shipment| s.reference.clone()).unwrap()
    }

    fn run(rule: &dyn ValidationRule<Shipment>, instance: &Shipment) -> Vec<String> {
        let mut ctx = ValidationContext::new(instance);
        rule.validate(&mut ctx).unwrap();
        ctx.into_failures()
            .into_iter()
            .map(|f| format!("{}: {}", f.property_name, f.error_message))
            .collect()
    }

    #[test]
    fn empty_property_name_is_rejected() {
        let result = RuleBuilder::for_property("  ", |s: &Shipment| s.weight);

        assert!(matches!(result, Err(BuildError::EmptyPropertyName)));
    }

    #[test]
    fn empty_check_name_is_rejected() {
        let result = reference_rule().check(Check::must("", |_r: &String| true, "never"));

        assert!(matches!(result, Err(BuildError::EmptyCheckName)));
    }

    #[test]
    fn empty_rule_set_is_rejected() {
        let result = reference_rule().in_rule_set("");

        assert!(matches!(result, Err(BuildError::EmptyRuleSetName)));
    }

    #[test]
    fn transform_twice_is_rejected() {
        let result = reference_rule()
            .transform(|_s: &Shipment, r: String| r.len())
            .unwrap()
            .transform(|_s: &Shipment, n: usize| n * 2);

        assert!(matches!(result, Err(BuildError::TransformerAlreadyAttached)));
    }

    #[test]
    fn transform_after_checks_is_rejected() {
        let result = reference_rule()
            .check(Check::must("x", |_r: &String| true, "never"))
            .unwrap()
            .transform(|_s: &Shipment, r: String| r.len());

        assert!(matches!(result, Err(BuildError::TransformAfterChecks)));
    }

    #[test]
    fn transform_keeps_rule_identity() {
        let rule = reference_rule()
            .cascade(CascadeMode::Stop)
            .in_rule_set("dispatch")
            .unwrap()
            .transform(|_s: &Shipment, r: String| r.len())
            .unwrap()
            .check(Check::must("long", |n: &usize| *n > 5, "too short: {PropertyValue}"))
            .unwrap()
            .build();

        assert_eq!(rule.meta().property_name(), Some("Reference"));
        assert_eq!(rule.meta().cascade(), CascadeMode::Stop);
        assert_eq!(rule.meta().rule_sets(), ["dispatch".to_string()]);

        let instance = shipment("hello", 1);
        let mut ctx = ValidationContext::new(&instance)
            .with_selector(RuleSetSelector::new(["dispatch"]));
        rule.validate(&mut ctx).unwrap();
        assert_eq!(ctx.failures()[0].property_name, "Reference");
        assert_eq!(ctx.failures()[0].error_message, "too short: 5");
    }

    #[test]
    fn accessor_and_transform_run_once_per_evaluation() {
        let reads = Arc::new(AtomicUsize::new(0));
        let transforms = Arc::new(AtomicUsize::new(0));
        let (r, t) = (Arc::clone(&reads), Arc::clone(&transforms));

        let rule = RuleBuilder::for_property("Reference", move |s: &Shipment| {
            r.fetch_add(1, Ordering::SeqCst);
            s.reference.clone()
        })
        .unwrap()
        .transform(move |_s: &Shipment, reference: String| {
            t.fetch_add(1, Ordering::SeqCst);
            reference.len()
        })
        .unwrap()
        .check(Check::must("a", |n: &usize| *n > 10, "a"))
        .unwrap()
        .check(Check::must("b", |n: &usize| *n > 20, "b"))
        .unwrap()
        .check(Check::must("c", |n: &usize| *n > 30, "c"))
        .unwrap()
        .build();

        assert_eq!(run(&rule, &shipment("abc", 1)).len(), 3);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(transforms.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remove_check_drops_named_check() {
        let rule = reference_rule()
            .check(Check::must("required", |r: &String| !r.is_empty(), "required"))
            .unwrap()
            .check(Check::must("prefixed", |r: &String| r.starts_with("SH"), "prefix"))
            .unwrap()
            .remove_check("required")
            .build();

        assert_eq!(rule.checks().len(), 1);
        assert_eq!(run(&rule, &shipment("", 1)), vec!["Reference: prefix"]);
    }

    #[test]
    fn when_conditions_combine() {
        let rule = RuleBuilder::for_property("Weight", |s: &Shipment| s.weight)
            .unwrap()
            .when(|s: &Shipment| s.fragile)
            .when(|s: &Shipment| s.weight > 0)
            .check(Check::must("light", |w: &u32| *w < 10, "too heavy"))
            .unwrap()
            .build();

        let mut heavy = shipment("SH1", 50);
        assert!(run(&rule, &heavy).is_empty());

        heavy.fragile = true;
        assert_eq!(run(&rule, &heavy), vec!["Weight: too heavy"]);
    }

    #[test]
    fn display_name_feeds_messages_and_model_leaf() {
        let named = reference_rule()
            .display_name("Shipment reference")
            .check(Check::must("required", |r: &String| !r.is_empty(), "'{PropertyName}' is required"))
            .unwrap()
            .build();
        assert_eq!(
            run(&named, &shipment("", 1)),
            vec!["Reference: 'Shipment reference' is required"]
        );

        let model = RuleBuilder::for_model(|s: &Shipment| s.weight)
            .display_name_with(|s: &Shipment| Some(format!("Shipment {}", s.reference)))
            .check(Check::must("positive", |w: &u32| *w > 0, "empty"))
            .unwrap()
            .build();
        assert_eq!(run(&model, &shipment("SH1", 0)), vec!["Shipment SH1: empty"]);
    }

    #[test]
    fn on_failure_receives_only_this_rules_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let rule = reference_rule()
            .check(Check::must("required", |r: &String| !r.is_empty(), "required"))
            .unwrap()
            .on_failure(move |_s: &Shipment, failures| {
                sink.lock()
                    .unwrap()
                    .extend(failures.iter().map(|f| f.error_message.clone()));
            })
            .build();

        let instance = shipment("", 1);
        let mut ctx = ValidationContext::new(&instance);
        ctx.add_failure(crate::core::ValidationFailure::new("Earlier", "earlier"));
        rule.validate(&mut ctx).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["required".to_string()]);
        assert_eq!(ctx.failure_count(), 2);
    }

    #[test]
    fn untagged_dependents_inherit_rule_sets() {
        let rule = reference_rule()
            .in_rule_set("dispatch")
            .unwrap()
            .dependent_rules(|sink| {
                sink.add(
                    RuleBuilder::for_property("Weight", |s: &Shipment| s.weight)?
                        .dependent_rules(|nested| {
                            nested.add(RuleBuilder::for_model(|s: &Shipment| s.fragile).build());
                            Ok(())
                        })?
                        .build(),
                );
                sink.add(
                    RuleBuilder::for_property("Fragile", |s: &Shipment| s.fragile)?
                        .in_rule_set("handling")?
                        .build(),
                );
                Ok(())
            })
            .unwrap()
            .build();

        let dependents = rule.dependents();
        assert_eq!(dependents[0].meta().rule_sets(), ["dispatch".to_string()]);
        assert_eq!(
            dependents[0].dependents()[0].meta().rule_sets(),
            ["dispatch".to_string()]
        );
        assert_eq!(dependents[1].meta().rule_sets(), ["handling".to_string()]);
    }

    #[test]
    fn dependents_run_only_after_clean_parent() {
        let rule = reference_rule()
            .check(Check::must("required", |r: &String| !r.is_empty(), "required"))
            .unwrap()
            .dependent_rules(|sink| {
                sink.add(
                    RuleBuilder::for_property("Weight", |s: &Shipment| s.weight)?
                        .check(Check::must("light", |w: &u32| *w < 10, "too heavy"))?
                        .build(),
                );
                Ok(())
            })
            .unwrap()
            .build();

        assert_eq!(run(&rule, &shipment("", 50)), vec!["Reference: required"]);
        assert_eq!(run(&rule, &shipment("SH1", 50)), vec!["Weight: too heavy"]);
    }
}
