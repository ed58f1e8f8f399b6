//! Rules and their evaluation contract.

use crate::core::{AsyncCondition, Condition, ValidationContext, ValidationFailure};
use crate::rules::error::EvaluationError;
use crate::rules::invoker::{CheckInvoker, LazyValue, Target};
use crate::rules::meta::RuleMeta;
use crate::rules::transform::ValueFn;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Callback receiving exactly the failures one rule evaluation added.
pub type OnFailure<T> = Arc<dyn Fn(&T, &[ValidationFailure]) + Send + Sync>;

/// Human-readable name of a rule.
pub enum DisplayName<T> {
    Static(String),
    Resolved(Arc<dyn Fn(&T) -> Option<String> + Send + Sync>),
}

impl<T> DisplayName<T> {
    pub fn resolve(&self, instance: &T) -> Option<String> {
        match self {
            Self::Static(name) => Some(name.clone()),
            Self::Resolved(resolve) => resolve(instance),
        }
    }
}

/// A validation unit evaluated against one instance.
///
/// The rule graph is read-only during evaluation, so one graph may serve
/// many concurrent runs, each with its own `ValidationContext`.
pub trait ValidationRule<T>: Send + Sync {
    fn meta(&self) -> &RuleMeta;

    /// Mutable access for the definition phase only.
    fn meta_mut(&mut self) -> &mut RuleMeta;

    fn dependents(&self) -> &[Box<dyn ValidationRule<T>>];

    /// Mutable access for the definition phase only.
    fn dependents_mut(&mut self) -> &mut [Box<dyn ValidationRule<T>>];

    /// Evaluate on the synchronous path.
    fn validate(&self, ctx: &mut ValidationContext<'_, T>) -> Result<(), EvaluationError>;

    /// Evaluate on the asynchronous path, honouring `cancel`.
    fn validate_async<'a>(
        &'a self,
        ctx: &'a mut ValidationContext<'_, T>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), EvaluationError>>;
}

/// Everything a rule owns besides its value source and checks.
pub(crate) struct RuleCore<T> {
    pub(crate) meta: RuleMeta,
    pub(crate) display_name: Option<DisplayName<T>>,
    pub(crate) condition: Option<Condition<T>>,
    pub(crate) async_condition: Option<AsyncCondition<T>>,
    pub(crate) dependents: Vec<Box<dyn ValidationRule<T>>>,
    pub(crate) on_failure: Option<OnFailure<T>>,
}

pub(crate) struct ResolvedNames {
    pub(crate) leaf: String,
    pub(crate) path: String,
    pub(crate) display: String,
}

impl ResolvedNames {
    pub(crate) fn target(&self) -> Target<'_> {
        Target {
            path: &self.path,
            display_name: &self.display,
        }
    }
}

impl<T> RuleCore<T>
where
    T: Send + Sync + 'static,
{
    /// Leaf is the property name, else the display name, else empty
    /// (model-level).
    pub(crate) fn resolve_names(&self, ctx: &ValidationContext<'_, T>) -> ResolvedNames {
        let display = self
            .display_name
            .as_ref()
            .and_then(|name| name.resolve(ctx.instance()));
        let leaf = match (self.meta.property_name(), &display) {
            (Some(name), _) => name.to_string(),
            (None, Some(display)) => display.clone(),
            (None, None) => String::new(),
        };
        let path = ctx.chain().build_property_name(&leaf);
        let display = display.unwrap_or_else(|| leaf.clone());

        ResolvedNames {
            leaf,
            path,
            display,
        }
    }

    /// Selector veto first, then the rule's own conditions.
    pub(crate) fn admits(&self, ctx: &ValidationContext<'_, T>, path: &str) -> bool {
        if !ctx.selector().can_execute(&self.meta, path, ctx.root_data()) {
            trace!(property = path, "rule vetoed by selector");
            return false;
        }
        if let Some(condition) = &self.condition {
            if !condition.check(ctx.instance()) {
                trace!(property = path, "rule condition not met");
                return false;
            }
        }
        if let Some(condition) = &self.async_condition {
            if !condition.check_blocking(ctx.instance()) {
                trace!(property = path, "rule async condition not met");
                return false;
            }
        }
        true
    }

    pub(crate) async fn admits_async(&self, ctx: &ValidationContext<'_, T>, path: &str) -> bool {
        if !ctx.selector().can_execute(&self.meta, path, ctx.root_data()) {
            trace!(property = path, "rule vetoed by selector");
            return false;
        }
        if let Some(condition) = &self.condition {
            if !condition.check(ctx.instance()) {
                trace!(property = path, "rule condition not met");
                return false;
            }
        }
        if let Some(condition) = &self.async_condition {
            if !condition.check(ctx.instance()).await {
                trace!(property = path, "rule async condition not met");
                return false;
            }
        }
        true
    }

    /// Hand new failures to the callback; returns whether any were added.
    fn report_failures(&self, ctx: &ValidationContext<'_, T>, baseline: usize, path: &str) -> bool {
        let added = ctx.failures_since(baseline);
        if added.is_empty() {
            return false;
        }
        if let Some(on_failure) = &self.on_failure {
            on_failure(ctx.instance(), added);
        }
        if !self.dependents.is_empty() {
            debug!(
                property = path,
                failures = added.len(),
                "rule failed, skipping dependent rules"
            );
        }
        true
    }

    /// Post-check bookkeeping: failure callback, or dependents on success.
    pub(crate) fn complete(
        &self,
        ctx: &mut ValidationContext<'_, T>,
        baseline: usize,
        path: &str,
    ) -> Result<(), EvaluationError> {
        if self.report_failures(ctx, baseline, path) {
            return Ok(());
        }
        for dependent in &self.dependents {
            dependent.validate(ctx)?;
        }
        Ok(())
    }

    pub(crate) async fn complete_async(
        &self,
        ctx: &mut ValidationContext<'_, T>,
        baseline: usize,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<(), EvaluationError> {
        if self.report_failures(ctx, baseline, path) {
            return Ok(());
        }
        for dependent in &self.dependents {
            if cancel.is_cancelled() {
                debug!(property = path, "validation cancelled before dependent rule");
                return Err(EvaluationError::Cancelled);
            }
            dependent.validate_async(ctx, cancel).await?;
        }
        Ok(())
    }
}

/// Rule validating a single value read from the instance.
pub struct PropertyRule<T, P> {
    core: RuleCore<T>,
    value: ValueFn<T, P>,
    invoker: CheckInvoker<T, P>,
}

impl<T, P> PropertyRule<T, P> {
    pub(crate) fn new(core: RuleCore<T>, value: ValueFn<T, P>, invoker: CheckInvoker<T, P>) -> Self {
        Self {
            core,
            value,
            invoker,
        }
    }

    pub fn checks(&self) -> &CheckInvoker<T, P> {
        &self.invoker
    }
}

impl<T, P> ValidationRule<T> for PropertyRule<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn meta(&self) -> &RuleMeta {
        &self.core.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.core.meta
    }

    fn dependents(&self) -> &[Box<dyn ValidationRule<T>>] {
        &self.core.dependents
    }

    fn dependents_mut(&mut self) -> &mut [Box<dyn ValidationRule<T>>] {
        &mut self.core.dependents
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, T>) -> Result<(), EvaluationError> {
        let names = self.core.resolve_names(ctx);
        if !self.core.admits(ctx, &names.path) {
            return Ok(());
        }

        let value = LazyValue::deferred(&self.value, ctx.instance());
        let baseline = ctx.failure_count();
        self.invoker
            .run(ctx, names.target(), &value, self.core.meta.cascade())?;
        self.core.complete(ctx, baseline, &names.path)
    }

    fn validate_async<'a>(
        &'a self,
        ctx: &'a mut ValidationContext<'_, T>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), EvaluationError>> {
        async move {
            let names = self.core.resolve_names(ctx);
            if !self.core.admits_async(ctx, &names.path).await {
                return Ok(());
            }

            let value = LazyValue::deferred(&self.value, ctx.instance());
            let baseline = ctx.failure_count();
            self.invoker
                .run_async(ctx, names.target(), &value, self.core.meta.cascade(), cancel)
                .await?;
            self.core
                .complete_async(ctx, baseline, &names.path, cancel)
                .await
        }
        .boxed()
    }
}
