//! Rule descriptors visible to selectors.

use crate::rules::invoker::CascadeMode;

/// Identity and policy of a rule, independent of its value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    property_name: Option<String>,
    rule_sets: Vec<String>,
    cascade: CascadeMode,
}

impl RuleMeta {
    pub fn new(property_name: Option<String>, cascade: CascadeMode) -> Self {
        Self {
            property_name,
            rule_sets: Vec::new(),
            cascade,
        }
    }

    /// Member the rule validates; `None` for model-level rules.
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    pub fn is_model_level(&self) -> bool {
        self.property_name.is_none()
    }

    pub fn rule_sets(&self) -> &[String] {
        &self.rule_sets
    }

    pub fn cascade(&self) -> CascadeMode {
        self.cascade
    }

    pub fn add_rule_set(&mut self, rule_set: impl Into<String>) {
        let rule_set = rule_set.into();
        if !self.rule_sets.contains(&rule_set) {
            self.rule_sets.push(rule_set);
        }
    }

    pub(crate) fn set_cascade(&mut self, cascade: CascadeMode) {
        self.cascade = cascade;
    }
}
