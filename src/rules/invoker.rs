//! Ordered execution of a rule's checks.

use crate::core::{PropertyContext, ValidationContext};
use crate::rules::check::{Check, CheckKind, CheckOutput};
use crate::rules::error::{EvaluationError, NestedAbort};
use crate::rules::transform::ValueFn;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Whether remaining checks run after one adds failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeMode {
    /// Run every check regardless of earlier failures
    #[default]
    Continue,

    /// Stop at the first check that adds a failure
    Stop,
}

/// Names a rule reports its failures under.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'n> {
    pub(crate) path: &'n str,
    pub(crate) display_name: &'n str,
}

/// A rule's value for the duration of one evaluation.
///
/// `Deferred` computes the value on first read and keeps it for every later
/// check of the same evaluation. The cell lives on the evaluating stack frame
/// and is never stored on the rule, so runs never share it.
pub(crate) enum LazyValue<'v, T, P> {
    Deferred {
        cell: OnceLock<P>,
        source: &'v ValueFn<T, P>,
        instance: &'v T,
    },
    Ready(&'v P),
}

impl<'v, T, P> LazyValue<'v, T, P> {
    pub(crate) fn deferred(source: &'v ValueFn<T, P>, instance: &'v T) -> Self {
        Self::Deferred {
            cell: OnceLock::new(),
            source,
            instance,
        }
    }

    pub(crate) fn ready(value: &'v P) -> Self {
        Self::Ready(value)
    }

    pub(crate) fn get(&self) -> &P {
        match self {
            Self::Deferred {
                cell,
                source,
                instance,
            } => cell.get_or_init(|| (*source)(*instance)),
            Self::Ready(value) => *value,
        }
    }
}

/// Ordered checks owned by one rule.
///
/// Declaration order is evaluation order. Only narrow add/remove operations
/// are exposed.
pub struct CheckInvoker<T, P> {
    checks: Vec<Check<T, P>>,
}

impl<T, P> CheckInvoker<T, P> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check after every existing one.
    pub fn push(&mut self, check: Check<T, P>) {
        self.checks.push(check);
    }

    /// Remove the first check named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Check<T, P>> {
        let position = self.checks.iter().position(|c| c.name() == name)?;
        Some(self.checks.remove(position))
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Check<T, P>> {
        self.checks.iter()
    }
}

impl<T, P> Default for CheckInvoker<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> CheckInvoker<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Run every applicable check in order on the synchronous path.
    ///
    /// Async-declared checks and async conditions are resolved by blocking.
    pub(crate) fn run(
        &self,
        ctx: &mut ValidationContext<'_, T>,
        target: Target<'_>,
        value: &LazyValue<'_, T, P>,
        cascade: CascadeMode,
    ) -> Result<(), EvaluationError> {
        let instance = ctx.instance();

        for check in &self.checks {
            if !check.applies(instance) {
                trace!(check = check.name(), property = target.path, "check condition not met");
                continue;
            }

            let before = ctx.failure_count();
            let property = PropertyContext::new(
                instance,
                value.get(),
                target.path,
                target.display_name,
                ctx,
            );
            let output = match check.kind() {
                CheckKind::Sync(validate) => validate(&property),
                CheckKind::Async(validate) => futures::executor::block_on(validate(property)),
            };
            record(ctx, check, target, output)?;

            if cascade == CascadeMode::Stop && ctx.failure_count() > before {
                debug!(check = check.name(), property = target.path, "cascade stopped remaining checks");
                break;
            }
        }

        Ok(())
    }

    /// Run every applicable check in order on the asynchronous path.
    ///
    /// Cancellation is observed before each check.
    pub(crate) async fn run_async(
        &self,
        ctx: &mut ValidationContext<'_, T>,
        target: Target<'_>,
        value: &LazyValue<'_, T, P>,
        cascade: CascadeMode,
        cancel: &CancellationToken,
    ) -> Result<(), EvaluationError> {
        let instance = ctx.instance();

        for check in &self.checks {
            if cancel.is_cancelled() {
                debug!(check = check.name(), property = target.path, "validation cancelled");
                return Err(EvaluationError::Cancelled);
            }
            if !check.applies_async(instance).await {
                trace!(check = check.name(), property = target.path, "check condition not met");
                continue;
            }

            let before = ctx.failure_count();
            let output = {
                let property = PropertyContext::new(
                    instance,
                    value.get(),
                    target.path,
                    target.display_name,
                    ctx,
                )
                .with_cancellation(cancel);
                match check.kind() {
                    CheckKind::Sync(validate) => validate(&property),
                    CheckKind::Async(validate) => validate(property).await,
                }
            };
            record(ctx, check, target, output)?;

            if cascade == CascadeMode::Stop && ctx.failure_count() > before {
                debug!(check = check.name(), property = target.path, "cascade stopped remaining checks");
                break;
            }
        }

        Ok(())
    }
}

/// Append a check's failures to the run, or turn its fault into the run's
/// error.
///
/// A nested run that aborted still contributes the failures it recorded, and
/// its own error is raised unchanged.
fn record<T, P>(
    ctx: &mut ValidationContext<'_, T>,
    check: &Check<T, P>,
    target: Target<'_>,
    output: CheckOutput,
) -> Result<(), EvaluationError> {
    match output {
        Ok(failures) => {
            ctx.extend_failures(check.decorate(failures));
            Ok(())
        }
        Err(fault) => match fault.downcast::<NestedAbort>() {
            Ok(nested) => {
                let NestedAbort { failures, source } = *nested;
                debug!(
                    check = check.name(),
                    property = target.path,
                    retained = failures.len(),
                    "nested validation aborted"
                );
                ctx.extend_failures(check.decorate(failures));
                Err(source)
            }
            Err(source) => Err(EvaluationError::check_faulted(
                target.path,
                check.name(),
                source,
            )),
        },
    }
}
