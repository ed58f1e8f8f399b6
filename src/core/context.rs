//! Per-run validation state.

use crate::core::chain::PropertyChain;
use crate::core::failure::{ValidationFailure, ValidationResult};
use crate::core::selector::{DefaultSelector, Selector};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Key/value data supplied by the caller for the whole run, including nested
/// validators.
pub type RootData = HashMap<String, serde_json::Value>;

/// Shared state of one validation run.
///
/// Created fresh for every top-level validation and discarded afterwards.
/// The failure list only ever grows during a run.
///
/// # Example
///
/// ```rust
/// use rulebook::core::{RuleSetSelector, ValidationContext};
/// use serde_json::json;
///
/// struct Invoice {
///     total: u64,
/// }
///
/// let invoice = Invoice { total: 120 };
/// let context = ValidationContext::new(&invoice)
///     .with_selector(RuleSetSelector::new(["billing"]))
///     .with_root_data("currency", json!("EUR"));
///
/// assert_eq!(context.instance().total, 120);
/// assert_eq!(context.failure_count(), 0);
/// assert_eq!(context.root_data()["currency"], json!("EUR"));
/// ```
pub struct ValidationContext<'i, T> {
    instance: &'i T,
    failures: Vec<ValidationFailure>,
    chain: PropertyChain,
    selector: Arc<dyn Selector>,
    root_data: RootData,
    is_async: bool,
}

impl<'i, T> ValidationContext<'i, T> {
    /// Create a context for `instance` using the default rule-set selector.
    pub fn new(instance: &'i T) -> Self {
        Self {
            instance,
            failures: Vec::new(),
            chain: PropertyChain::new(),
            selector: Arc::new(DefaultSelector),
            root_data: RootData::new(),
            is_async: false,
        }
    }

    pub fn with_selector<S>(self, selector: S) -> Self
    where
        S: Selector + 'static,
    {
        self.with_shared_selector(Arc::new(selector))
    }

    pub fn with_shared_selector(mut self, selector: Arc<dyn Selector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_root_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.root_data.insert(key.into(), value);
        self
    }

    /// Start the run beneath an existing property path.
    pub fn with_chain(mut self, chain: PropertyChain) -> Self {
        self.chain = chain;
        self
    }

    /// The instance under validation.
    ///
    /// The returned reference borrows the instance, not the context, so it
    /// stays usable while the context records failures.
    pub fn instance(&self) -> &'i T {
        self.instance
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn add_failure(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn extend_failures(&mut self, failures: impl IntoIterator<Item = ValidationFailure>) {
        self.failures.extend(failures);
    }

    /// Failures recorded at or after `baseline`.
    pub(crate) fn failures_since(&self, baseline: usize) -> &[ValidationFailure] {
        &self.failures[baseline.min(self.failures.len())..]
    }

    pub fn chain(&self) -> &PropertyChain {
        &self.chain
    }

    pub(crate) fn chain_mut(&mut self) -> &mut PropertyChain {
        &mut self.chain
    }

    pub fn selector(&self) -> &dyn Selector {
        self.selector.as_ref()
    }

    pub fn root_data(&self) -> &RootData {
        &self.root_data
    }

    /// Whether this run is executing through the asynchronous entry point.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub(crate) fn set_async(&mut self, is_async: bool) {
        self.is_async = is_async;
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    pub fn into_result(self) -> ValidationResult {
        ValidationResult::new(self.failures)
    }
}

/// What a single check sees while it runs.
///
/// Built per rule and check invocation. `value` is the rule's memoized value
/// (after transformation) or the current collection element.
pub struct PropertyContext<'a, T, P> {
    instance: &'a T,
    value: &'a P,
    property_path: &'a str,
    display_name: &'a str,
    root_data: &'a RootData,
    selector: &'a Arc<dyn Selector>,
    is_async: bool,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, T, P> PropertyContext<'a, T, P> {
    pub(crate) fn new(
        instance: &'a T,
        value: &'a P,
        property_path: &'a str,
        display_name: &'a str,
        parent: &'a ValidationContext<'_, T>,
    ) -> Self {
        Self {
            instance,
            value,
            property_path,
            display_name,
            root_data: &parent.root_data,
            selector: &parent.selector,
            is_async: parent.is_async,
            cancel: None,
        }
    }

    /// Attach the cancellation token of the asynchronous run.
    pub(crate) fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn instance(&self) -> &'a T {
        self.instance
    }

    pub fn value(&self) -> &'a P {
        self.value
    }

    /// Full property name failures are reported under.
    pub fn property_path(&self) -> &'a str {
        self.property_path
    }

    pub fn display_name(&self) -> &'a str {
        self.display_name
    }

    pub fn root_data(&self) -> &'a RootData {
        self.root_data
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Cancellation token of the asynchronous run, if any.
    ///
    /// `None` on the synchronous path.
    pub fn cancellation(&self) -> Option<&'a CancellationToken> {
        self.cancel
    }

    /// Build a failure for this property without recording the value.
    ///
    /// `{PropertyName}` in `message` is replaced with the display name.
    pub fn failure_without_value(&self, message: &str) -> ValidationFailure {
        let message = message.replace("{PropertyName}", self.display_name);
        ValidationFailure::new(self.property_path, message)
    }

    /// Build a nested context that validates the property value itself,
    /// sharing this run's selector and root data.
    pub fn child_context(&self) -> ValidationContext<'a, P> {
        ValidationContext {
            instance: self.value,
            failures: Vec::new(),
            chain: PropertyChain::from_path(self.property_path),
            selector: Arc::clone(self.selector),
            root_data: self.root_data.clone(),
            is_async: self.is_async,
        }
    }
}

impl<T, P: Serialize> PropertyContext<'_, T, P> {
    /// Build a failure for this property, recording the attempted value.
    ///
    /// `{PropertyName}` and `{PropertyValue}` in `message` are substituted.
    pub fn failure(&self, message: &str) -> ValidationFailure {
        let attempted = serde_json::to_value(self.value).ok();
        let rendered = match &attempted {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let mut failure =
            self.failure_without_value(&message.replace("{PropertyValue}", &rendered));
        failure.attempted_value = attempted;
        failure
    }
}

impl<T, P> Clone for PropertyContext<'_, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for PropertyContext<'_, T, P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::RuleSetSelector;
    use serde_json::json;

    struct Profile {
        nickname: String,
    }

    #[test]
    fn new_context_starts_empty() {
        let profile = Profile {
            nickname: "ada".to_string(),
        };
        let context = ValidationContext::new(&profile);

        assert_eq!(context.failure_count(), 0);
        assert!(context.chain().is_empty());
        assert!(!context.is_async());
        assert_eq!(context.instance().nickname, "ada");
    }

    #[test]
    fn failures_since_returns_only_new_failures() {
        let profile = Profile {
            nickname: String::new(),
        };
        let mut context = ValidationContext::new(&profile);
        context.add_failure(ValidationFailure::new("A", "first"));
        let baseline = context.failure_count();
        context.add_failure(ValidationFailure::new("B", "second"));

        let added = context.failures_since(baseline);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].property_name, "B");
    }

    #[test]
    fn property_context_formats_placeholders() {
        let profile = Profile {
            nickname: "x".to_string(),
        };
        let context = ValidationContext::new(&profile);
        let value = profile.nickname.clone();
        let property = PropertyContext::new(&profile, &value, "Nickname", "Nickname", &context);

        let failure = property.failure("'{PropertyName}' is too short: {PropertyValue}");

        assert_eq!(failure.property_name, "Nickname");
        assert_eq!(failure.error_message, "'Nickname' is too short: x");
        assert_eq!(failure.attempted_value, Some(json!("x")));
    }

    #[test]
    fn child_context_shares_run_state() {
        let profile = Profile {
            nickname: "x".to_string(),
        };
        let context = ValidationContext::new(&profile)
            .with_selector(RuleSetSelector::new(["audit"]))
            .with_root_data("tenant", json!(7));
        let value = 42_u32;
        let property = PropertyContext::new(&profile, &value, "Owner", "Owner", &context);

        let child = property.child_context();

        assert_eq!(*child.instance(), 42);
        assert_eq!(child.chain().build_property_name("Id"), "Owner.Id");
        assert_eq!(child.root_data()["tenant"], json!(7));
        assert_eq!(child.failure_count(), 0);
    }

    #[test]
    fn cancellation_is_only_present_when_attached() {
        let profile = Profile {
            nickname: "x".to_string(),
        };
        let context = ValidationContext::new(&profile);
        let value = profile.nickname.clone();
        let cancel = CancellationToken::new();

        let plain = PropertyContext::new(&profile, &value, "Nickname", "Nickname", &context);
        let attached = plain.with_cancellation(&cancel);

        assert!(plain.cancellation().is_none());
        cancel.cancel();
        assert!(attached.cancellation().is_some_and(|token| token.is_cancelled()));
    }
}
