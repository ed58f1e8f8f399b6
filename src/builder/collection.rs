//! Builder for rules applied to each element of a sequence.

use crate::builder::error::BuildError;
use crate::builder::parts::RuleParts;
use crate::rules::{
    default_index_builder, Check, CheckInvoker, CollectionRule, ElementFilter, IndexBuilder,
    Transformer, ValueFn,
};
use std::sync::Arc;

/// Builder for a rule whose checks run once per sequence element.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::CollectionRuleBuilder;
/// use rulebook::core::ValidationContext;
/// use rulebook::rules::{Check, ValidationRule};
///
/// struct Article {
///     tags: Vec<String>,
/// }
///
/// let rule = CollectionRuleBuilder::for_each("Tags", |a: &Article| a.tags.clone())
///     .unwrap()
///     .check(Check::must("not_empty", |t: &String| !t.is_empty(), "'{PropertyName}' is empty"))
///     .unwrap()
///     .build();
///
/// let article = Article { tags: vec!["a".into(), "".into(), "c".into()] };
/// let mut ctx = ValidationContext::new(&article);
/// rule.validate(&mut ctx).unwrap();
///
/// assert_eq!(ctx.failures()[0].property_name, "Tags[1]");
/// assert_eq!(ctx.failures()[0].error_message, "'Tags[1]' is empty");
/// ```
pub struct CollectionRuleBuilder<T, E> {
    parts: RuleParts<T>,
    items: ValueFn<T, Vec<E>>,
    transformed: bool,
    filter: Option<ElementFilter<E>>,
    index_builder: Option<IndexBuilder<T, E>>,
    invoker: CheckInvoker<T, E>,
}

impl<T, E> CollectionRuleBuilder<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Start a rule over the sequence member `name`, read by `accessor`.
    pub fn for_each<F>(name: impl Into<String>, accessor: F) -> Result<Self, BuildError>
    where
        F: Fn(&T) -> Vec<E> + Send + Sync + 'static,
    {
        Ok(Self {
            parts: RuleParts::property(name)?,
            items: Arc::new(accessor),
            transformed: false,
            filter: None,
            index_builder: None,
            invoker: CheckInvoker::new(),
        })
    }

    rule_options!();

    /// Skip elements for which `predicate` is false.
    ///
    /// Skipped elements still count towards the positions of later ones.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Replace the default `[position]` element name segment.
    pub fn index_builder<F>(mut self, build: F) -> Self
    where
        F: Fn(&T, &[E], &E, usize) -> String + Send + Sync + 'static,
    {
        self.index_builder = Some(Arc::new(build));
        self
    }

    /// Append a check run against every element.
    pub fn check(mut self, check: Check<T, E>) -> Result<Self, BuildError> {
        if check.name().trim().is_empty() {
            return Err(BuildError::EmptyCheckName);
        }
        self.invoker.push(check);
        Ok(self)
    }

    pub fn remove_check(mut self, name: &str) -> Self {
        self.invoker.remove(name);
        self
    }

    /// Iterate `transform(instance, sequence)` instead of the raw sequence.
    ///
    /// Must be called at most once, before any check, filter or index
    /// builder.
    pub fn transform<Q, F>(self, transform: F) -> Result<CollectionRuleBuilder<T, Q>, BuildError>
    where
        Q: Send + Sync + 'static,
        F: Fn(&T, Vec<E>) -> Vec<Q> + Send + Sync + 'static,
    {
        if self.transformed {
            return Err(BuildError::TransformerAlreadyAttached);
        }
        if !self.invoker.is_empty() || self.filter.is_some() || self.index_builder.is_some() {
            return Err(BuildError::TransformAfterChecks);
        }

        Ok(CollectionRuleBuilder {
            parts: self.parts,
            items: Transformer::new(transform).compose(self.items),
            transformed: true,
            filter: None,
            index_builder: None,
            invoker: CheckInvoker::new(),
        })
    }

    pub fn build(self) -> CollectionRule<T, E> {
        CollectionRule::new(
            self.parts.into_core(),
            self.items,
            self.filter,
            self.index_builder.unwrap_or_else(default_index_builder),
            self.invoker,
        )
    }
}
