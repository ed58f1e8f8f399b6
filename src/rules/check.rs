//! Single validation checks bound to a rule.

use crate::core::{AsyncCondition, Condition, PropertyContext, Severity, ValidationFailure};
use crate::engine::Validator;
use crate::rules::error::{CheckError, EvaluationError, NestedAbort};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a check produces: zero or more failures, or a fault that aborts the
/// run.
pub type CheckOutput = Result<Vec<ValidationFailure>, CheckError>;

/// Synchronous validate operation.
pub type SyncValidate<T, P> =
    Arc<dyn Fn(&PropertyContext<'_, T, P>) -> CheckOutput + Send + Sync>;

/// Asynchronous validate operation.
pub type AsyncValidate<T, P> =
    Arc<dyn for<'a> Fn(PropertyContext<'a, T, P>) -> BoxFuture<'a, CheckOutput> + Send + Sync>;

/// Declared execution capability of a check.
///
/// The invoker dispatches on this tag alone: an `Async` check is awaited on
/// the asynchronous path and blocked on from the synchronous path, while a
/// `Sync` check always runs inline.
pub enum CheckKind<T, P> {
    Sync(SyncValidate<T, P>),
    Async(AsyncValidate<T, P>),
}

impl<T, P> Clone for CheckKind<T, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(validate) => Self::Sync(Arc::clone(validate)),
            Self::Async(validate) => Self::Async(Arc::clone(validate)),
        }
    }
}

/// A single validation predicate over a property value.
///
/// Checks carry their own conditions, evaluated in addition to the owning
/// rule's conditions.
///
/// # Example
///
/// ```rust
/// use rulebook::rules::Check;
///
/// struct User;
///
/// let not_empty: Check<User, String> =
///     Check::must("not_empty", |name: &String| !name.is_empty(), "'{PropertyName}' must not be empty")
///         .with_error_code("not_empty");
///
/// assert_eq!(not_empty.name(), "not_empty");
/// assert!(!not_empty.runs_async());
/// ```
pub struct Check<T, P> {
    name: String,
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
    kind: CheckKind<T, P>,
    error_code: Option<String>,
    severity: Option<Severity>,
}

impl<T, P> Check<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Create a synchronous check from a validate operation.
    pub fn new<F>(name: impl Into<String>, validate: F) -> Self
    where
        F: Fn(&PropertyContext<'_, T, P>) -> CheckOutput + Send + Sync + 'static,
    {
        Self::from_kind(name, CheckKind::Sync(Arc::new(validate)))
    }

    /// Create an asynchronous check from a validate operation.
    pub fn new_async<F>(name: impl Into<String>, validate: F) -> Self
    where
        F: for<'a> Fn(PropertyContext<'a, T, P>) -> BoxFuture<'a, CheckOutput>
            + Send
            + Sync
            + 'static,
    {
        Self::from_kind(name, CheckKind::Async(Arc::new(validate)))
    }

    fn from_kind(name: impl Into<String>, kind: CheckKind<T, P>) -> Self {
        Self {
            name: name.into(),
            condition: None,
            async_condition: None,
            kind,
            error_code: None,
            severity: None,
        }
    }

    /// Run a nested validator against the property value.
    ///
    /// The nested failures are reported beneath this property's path in the
    /// same flat failure list. Failures recorded before a nested fault are
    /// kept.
    pub fn child(name: impl Into<String>, validator: Arc<Validator<P>>) -> Self {
        Self::new(name, move |ctx| {
            let mut child = ctx.child_context();
            let outcome = validator.evaluate(&mut child);
            match outcome {
                Ok(()) => Ok(child.into_failures()),
                Err(source) => Err(nested_abort(child.into_failures(), source)),
            }
        })
    }

    /// Run a nested validator asynchronously against the property value.
    ///
    /// The nested run observes the parent run's cancellation token; when
    /// blocked on from the synchronous path it cannot be cancelled.
    pub fn child_async(name: impl Into<String>, validator: Arc<Validator<P>>) -> Self {
        Self::new_async(name, move |ctx| {
            let validator = Arc::clone(&validator);
            let cancel = ctx
                .cancellation()
                .cloned()
                .unwrap_or_else(CancellationToken::new);
            async move {
                let mut child = ctx.child_context();
                let outcome = validator.evaluate_async(&mut child, &cancel).await;
                match outcome {
                    Ok(()) => Ok(child.into_failures()),
                    Err(source) => Err(nested_abort(child.into_failures(), source)),
                }
            }
            .boxed()
        })
    }

    /// Add a condition; the check is skipped when it does not hold.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let condition = Condition::new(predicate);
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Add an asynchronous condition; the check is skipped when it does not
    /// hold.
    pub fn when_async<F>(mut self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        let condition = AsyncCondition::new(predicate);
        self.async_condition = Some(match self.async_condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Error code attached to failures this check reports without one.
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Severity applied to every failure this check reports.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub(crate) fn applies(&self, instance: &T) -> bool {
        if let Some(condition) = &self.condition {
            if !condition.check(instance) {
                return false;
            }
        }
        match &self.async_condition {
            Some(condition) => condition.check_blocking(instance),
            None => true,
        }
    }

    pub(crate) async fn applies_async(&self, instance: &T) -> bool {
        if let Some(condition) = &self.condition {
            if !condition.check(instance) {
                return false;
            }
        }
        match &self.async_condition {
            Some(condition) => condition.check(instance).await,
            None => true,
        }
    }
}

impl<T, P> Check<T, P>
where
    T: Send + Sync + 'static,
    P: Serialize + Send + Sync + 'static,
{
    /// Fail with `message` when `predicate` rejects the value.
    pub fn must<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(name, move |ctx| {
            Ok(if predicate(ctx.value()) {
                Vec::new()
            } else {
                vec![ctx.failure(&message)]
            })
        })
    }

    /// Fail with `message` when `predicate` rejects the value, given the
    /// whole instance.
    pub fn must_with<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T, &P) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(name, move |ctx| {
            Ok(if predicate(ctx.instance(), ctx.value()) {
                Vec::new()
            } else {
                vec![ctx.failure(&message)]
            })
        })
    }

    /// Asynchronous form of [`Check::must`].
    pub fn must_async<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: for<'a> Fn(&'a P) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new_async(name, move |ctx| {
            let valid = predicate(ctx.value());
            let message = message.clone();
            async move {
                Ok(if valid.await {
                    Vec::new()
                } else {
                    vec![ctx.failure(&message)]
                })
            }
            .boxed()
        })
    }
}

fn nested_abort(failures: Vec<ValidationFailure>, source: EvaluationError) -> CheckError {
    Box::new(NestedAbort { failures, source })
}

impl<T, P> Check<T, P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &CheckKind<T, P> {
        &self.kind
    }

    /// Whether this check declares asynchronous execution.
    pub fn runs_async(&self) -> bool {
        matches!(self.kind, CheckKind::Async(_))
    }

    pub(crate) fn decorate(&self, mut failures: Vec<ValidationFailure>) -> Vec<ValidationFailure> {
        for failure in &mut failures {
            if failure.error_code.is_none() {
                failure.error_code.clone_from(&self.error_code);
            }
            if let Some(severity) = self.severity {
                failure.severity = severity;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationContext;

    struct Signup {
        invited: bool,
    }

    fn run_sync(check: &Check<Signup, String>, signup: &Signup, value: &String) -> CheckOutput {
        let context = ValidationContext::new(signup);
        let property = PropertyContext::new(signup, value, "Email", "Email", &context);
        match check.kind() {
            CheckKind::Sync(validate) => validate(&property),
            CheckKind::Async(validate) => futures::executor::block_on(validate(property)),
        }
    }

    #[test]
    fn must_reports_failure_with_message() {
        let check = Check::must(
            "not_empty",
            |v: &String| !v.is_empty(),
            "'{PropertyName}' must not be empty",
        );

        let failures = run_sync(&check, &Signup { invited: false }, &String::new()).unwrap();

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].property_name, "Email");
        assert_eq!(failures[0].error_message, "'Email' must not be empty");
    }

    #[test]
    fn must_passes_valid_values() {
        let check = Check::must("not_empty", |v: &String| !v.is_empty(), "empty");

        let failures = run_sync(&check, &Signup { invited: false }, &"a@b.c".to_string()).unwrap();

        assert!(failures.is_empty());
    }

    #[test]
    fn must_with_sees_instance() {
        let check = Check::must_with(
            "invite_only",
            |s: &Signup, _v: &String| s.invited,
            "invite required",
        );

        let value = "a@b.c".to_string();
        assert!(run_sync(&check, &Signup { invited: true }, &value)
            .unwrap()
            .is_empty());
        assert_eq!(
            run_sync(&check, &Signup { invited: false }, &value)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn must_async_is_declared_async() {
        let check: Check<Signup, String> = Check::must_async(
            "available",
            |v: &String| {
                let taken = v == "taken@b.c";
                async move { !taken }.boxed()
            },
            "already registered",
        );

        assert!(check.runs_async());
        let failures = run_sync(&check, &Signup { invited: false }, &"taken@b.c".to_string())
            .unwrap();
        assert_eq!(failures[0].error_message, "already registered");
    }

    #[test]
    fn conditions_gate_application() {
        let check: Check<Signup, String> = Check::must("x", |_v: &String| true, "never")
            .when(|s: &Signup| s.invited)
            .when_async(|_s: &Signup| async { true }.boxed());

        assert!(check.applies(&Signup { invited: true }));
        assert!(!check.applies(&Signup { invited: false }));
    }

    #[test]
    fn decorate_fills_code_and_severity() {
        let check: Check<Signup, String> = Check::must("x", |_v: &String| false, "bad")
            .with_error_code("bad_value")
            .with_severity(Severity::Warning);

        let decorated = check.decorate(vec![
            ValidationFailure::new("A", "one"),
            ValidationFailure::new("B", "two").with_error_code("custom"),
        ]);

        assert_eq!(decorated[0].error_code.as_deref(), Some("bad_value"));
        assert_eq!(decorated[1].error_code.as_deref(), Some("custom"));
        assert!(decorated.iter().all(|f| f.severity == Severity::Warning));
    }

    #[test]
    fn faults_are_returned_as_errors() {
        let check: Check<Signup, String> =
            Check::new("lookup", |_ctx| Err("directory unavailable".into()));

        let result = run_sync(&check, &Signup { invited: false }, &String::new());
        assert!(result.is_err());
    }
}
