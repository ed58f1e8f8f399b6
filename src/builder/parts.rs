//! State shared by every rule builder.

use crate::builder::error::BuildError;
use crate::core::{AsyncCondition, Condition};
use crate::rules::{CascadeMode, DisplayName, OnFailure, RuleCore, RuleMeta, ValidationRule};

pub(crate) struct RuleParts<T> {
    pub(crate) meta: RuleMeta,
    pub(crate) display_name: Option<DisplayName<T>>,
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
    pub(crate) dependents: Vec<Box<dyn ValidationRule<T>>>,
    pub(crate) on_failure: Option<OnFailure<T>>,
}

impl<T> RuleParts<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn model() -> Self {
        Self {
            meta: RuleMeta::new(None, CascadeMode::default()),
            display_name: None,
            condition: None,
            async_condition: None,
            dependents: Vec::new(),
            on_failure: None,
        }
    }

    pub(crate) fn property(name: impl Into<String>) -> Result<Self, BuildError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::EmptyPropertyName);
        }
        let mut parts = Self::model();
        parts.meta = RuleMeta::new(Some(name), CascadeMode::default());
        Ok(parts)
    }

    pub(crate) fn add_condition(&mut self, condition: Condition<T>) {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
    }

    pub(crate) fn add_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.async_condition = Some(match self.async_condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
    }

    pub(crate) fn add_rule_set(&mut self, rule_set: String) -> Result<(), BuildError> {
        if rule_set.trim().is_empty() {
            return Err(BuildError::EmptyRuleSetName);
        }
        self.meta.add_rule_set(rule_set);
        Ok(())
    }

    /// Finish the definition; untagged dependents inherit this rule's sets.
    pub(crate) fn into_core(mut self) -> RuleCore<T> {
        inherit_rule_sets(&mut self.dependents, self.meta.rule_sets());
        RuleCore {
            meta: self.meta,
            display_name: self.display_name,
            condition: self.condition,
            async_condition: self.async_condition,
            dependents: self.dependents,
            on_failure: self.on_failure,
        }
    }
}

fn inherit_rule_sets<T>(rules: &mut [Box<dyn ValidationRule<T>>], rule_sets: &[String]) {
    if rule_sets.is_empty() {
        return;
    }
    for rule in rules {
        if !rule.meta().rule_sets().is_empty() {
            continue;
        }
        for rule_set in rule_sets {
            rule.meta_mut().add_rule_set(rule_set.clone());
        }
        inherit_rule_sets(rule.dependents_mut(), rule_sets);
    }
}
