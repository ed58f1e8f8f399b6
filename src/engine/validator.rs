//! Validator that evaluates an ordered set of top-level rules.

use crate::core::{Selector, ValidationContext, ValidationResult};
use crate::engine::config::ValidatorConfig;
use crate::rules::{CascadeMode, EvaluationError, ValidationRule};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Top-level rules for one instance type.
///
/// The rule graph is immutable once built, so a validator can be shared
/// (for example behind an `Arc`) and evaluated by many runs concurrently.
pub struct Validator<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
    config: ValidatorConfig,
    selector: Arc<dyn Selector>,
}

impl<T> Validator<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(rules: Vec<Box<dyn ValidationRule<T>>>, config: ValidatorConfig) -> Self {
        let selector = config.selector();
        Self {
            rules,
            config,
            selector,
        }
    }

    /// Top-level rules in evaluation order (pure).
    pub fn rules(&self) -> &[Box<dyn ValidationRule<T>>] {
        &self.rules
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// A fresh context for `instance` using the configured rule sets.
    pub fn context<'i>(&self, instance: &'i T) -> ValidationContext<'i, T> {
        ValidationContext::new(instance).with_shared_selector(Arc::clone(&self.selector))
    }

    /// Run every top-level rule against `ctx` on the synchronous path.
    ///
    /// Failures accumulate on `ctx`. The first check fault aborts the run
    /// and leaves the failures recorded so far in place.
    pub fn evaluate(&self, ctx: &mut ValidationContext<'_, T>) -> Result<(), EvaluationError> {
        debug!(rules = self.rules.len(), path = %ctx.chain(), "evaluating validator");

        for rule in &self.rules {
            let before = ctx.failure_count();
            rule.validate(ctx)?;
            if self.stops_after(ctx, before) {
                break;
            }
        }

        debug!(failures = ctx.failure_count(), "validator finished");
        Ok(())
    }

    /// Run every top-level rule against `ctx` on the asynchronous path.
    ///
    /// Cancellation is observed between rules, before each check and before
    /// each dependent rule.
    pub fn evaluate_async<'a>(
        &'a self,
        ctx: &'a mut ValidationContext<'_, T>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), EvaluationError>> {
        async move {
            ctx.set_async(true);
            debug!(rules = self.rules.len(), path = %ctx.chain(), "evaluating validator asynchronously");

            for rule in &self.rules {
                if cancel.is_cancelled() {
                    debug!(failures = ctx.failure_count(), "validation cancelled");
                    return Err(EvaluationError::Cancelled);
                }
                let before = ctx.failure_count();
                rule.validate_async(ctx, cancel).await?;
                if self.stops_after(ctx, before) {
                    break;
                }
            }

            debug!(failures = ctx.failure_count(), "validator finished");
            Ok(())
        }
        .boxed()
    }

    /// Validate `instance` synchronously with a fresh context.
    pub fn validate(&self, instance: &T) -> Result<ValidationResult, EvaluationError> {
        let mut ctx = self.context(instance);
        self.evaluate(&mut ctx)?;
        Ok(ctx.into_result())
    }

    /// Validate `instance` asynchronously with a fresh context.
    pub async fn validate_async(&self, instance: &T) -> Result<ValidationResult, EvaluationError> {
        self.validate_async_with(instance, &CancellationToken::new())
            .await
    }

    /// Validate `instance` asynchronously, aborting once `cancel` fires.
    pub async fn validate_async_with(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, EvaluationError> {
        let mut ctx = self.context(instance);
        self.evaluate_async(&mut ctx, cancel).await?;
        Ok(ctx.into_result())
    }

    fn stops_after(&self, ctx: &ValidationContext<'_, T>, before: usize) -> bool {
        let stop = self.config.cascade == CascadeMode::Stop && ctx.failure_count() > before;
        if stop {
            debug!("validator cascade stopped remaining rules");
        }
        stop
    }
}
