//! Rules applied to every element of a sequence.

use crate::core::ValidationContext;
use crate::rules::error::EvaluationError;
use crate::rules::invoker::{CheckInvoker, LazyValue, Target};
use crate::rules::meta::RuleMeta;
use crate::rules::rule::{ResolvedNames, RuleCore, ValidationRule};
use crate::rules::transform::ValueFn;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Decides whether an element is validated at all.
pub type ElementFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Builds the name segment for an element:
/// `(instance, sequence, element, original position) -> segment`.
pub type IndexBuilder<T, E> = Arc<dyn Fn(&T, &[E], &E, usize) -> String + Send + Sync>;

/// The default `[position]` index segment.
pub fn default_index_builder<T: 'static, E: 'static>() -> IndexBuilder<T, E> {
    Arc::new(|_instance: &T, _items: &[E], _element: &E, position: usize| format!("[{position}]"))
}

/// Rule whose checks run once per element of a sequence.
///
/// Elements keep their original enumeration position in failure names even
/// when a filter skips earlier elements.
pub struct CollectionRule<T, E> {
    core: RuleCore<T>,
    items: ValueFn<T, Vec<E>>,
    filter: Option<ElementFilter<E>>,
    index_builder: IndexBuilder<T, E>,
    invoker: CheckInvoker<T, E>,
}

struct ElementNames {
    path: String,
    display: String,
}

impl ElementNames {
    fn target(&self) -> Target<'_> {
        Target {
            path: &self.path,
            display_name: &self.display,
        }
    }
}

impl<T, E> CollectionRule<T, E> {
    pub(crate) fn new(
        core: RuleCore<T>,
        items: ValueFn<T, Vec<E>>,
        filter: Option<ElementFilter<E>>,
        index_builder: IndexBuilder<T, E>,
        invoker: CheckInvoker<T, E>,
    ) -> Self {
        Self {
            core,
            items,
            filter,
            index_builder,
            invoker,
        }
    }

    pub fn checks(&self) -> &CheckInvoker<T, E> {
        &self.invoker
    }

    fn skips(&self, element: &E) -> bool {
        self.filter.as_ref().is_some_and(|filter| !filter(element))
    }

    /// Push the element's segment and name it; the caller pops.
    fn enter_element(
        &self,
        ctx: &mut ValidationContext<'_, T>,
        names: &ResolvedNames,
        items: &[E],
        element: &E,
        position: usize,
    ) -> ElementNames {
        let segment = (self.index_builder)(ctx.instance(), items, element, position);
        ctx.chain_mut().push(format!("{}{}", names.leaf, segment));
        ElementNames {
            path: ctx.chain().build_property_name(""),
            display: format!("{}{}", names.display, segment),
        }
    }
}

impl<T, E> ValidationRule<T> for CollectionRule<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
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

        let items = (self.items)(ctx.instance());
        for (position, element) in items.iter().enumerate() {
            if self.skips(element) {
                trace!(property = %names.path, position, "element filtered out");
                continue;
            }

            let element_names = self.enter_element(ctx, &names, &items, element, position);
            let baseline = ctx.failure_count();
            let outcome = self.invoker.run(
                ctx,
                element_names.target(),
                &LazyValue::ready(element),
                self.core.meta.cascade(),
            );
            ctx.chain_mut().pop();
            outcome?;

            self.core.complete(ctx, baseline, &element_names.path)?;
        }
        Ok(())
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

            let items = (self.items)(ctx.instance());
            for (position, element) in items.iter().enumerate() {
                if self.skips(element) {
                    trace!(property = %names.path, position, "element filtered out");
                    continue;
                }

                let element_names = self.enter_element(ctx, &names, &items, element, position);
                let baseline = ctx.failure_count();
                let outcome = self
                    .invoker
                    .run_async(
                        ctx,
                        element_names.target(),
                        &LazyValue::ready(element),
                        self.core.meta.cascade(),
                        cancel,
                    )
                    .await;
                ctx.chain_mut().pop();
                outcome?;

                self.core
                    .complete_async(ctx, baseline, &element_names.path, cancel)
                    .await?;
            }
            Ok(())
        }
        .boxed()
    }
}
