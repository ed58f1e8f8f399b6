//! Policies deciding which rules run in a validation run.

use crate::core::context::RootData;
use crate::rules::RuleMeta;
use std::collections::HashSet;

/// Name of the rule set untagged rules belong to.
pub const DEFAULT_RULE_SET: &str = "default";

/// Wildcard rule set name selecting every rule.
pub const ALL_RULE_SETS: &str = "*";

/// Decides whether a rule may execute in the current run.
///
/// Consulted before anything else about the rule is evaluated; a veto
/// skips the rule without evaluating its conditions or resolving its value.
pub trait Selector: Send + Sync {
    fn can_execute(&self, rule: &RuleMeta, property_path: &str, data: &RootData) -> bool;
}

/// Runs rules that carry no rule set, or the `default` rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSelector;

impl Selector for DefaultSelector {
    fn can_execute(&self, rule: &RuleMeta, _property_path: &str, _data: &RootData) -> bool {
        rule.rule_sets().is_empty() || rule.rule_sets().iter().any(|s| s == DEFAULT_RULE_SET)
    }
}

/// Runs rules belonging to any of the named rule sets.
///
/// `*` selects every rule, and `default` additionally selects untagged rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSetSelector {
    rule_sets: HashSet<String>,
}

impl RuleSetSelector {
    pub fn new<I, S>(rule_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule_sets: rule_sets.into_iter().map(Into::into).collect(),
        }
    }
}

impl Selector for RuleSetSelector {
    fn can_execute(&self, rule: &RuleMeta, _property_path: &str, _data: &RootData) -> bool {
        if self.rule_sets.contains(ALL_RULE_SETS) {
            return true;
        }
        if rule.rule_sets().is_empty() {
            return self.rule_sets.contains(DEFAULT_RULE_SET);
        }
        rule.rule_sets().iter().any(|s| self.rule_sets.contains(s))
    }
}

/// Runs rules whose property path is one of the listed members, or nested
/// beneath one of them.
#[derive(Debug, Clone, Default)]
pub struct MemberNameSelector {
    members: Vec<String>,
}

impl MemberNameSelector {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(member: &str, property_path: &str) -> bool {
        match property_path.strip_prefix(member) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
            None => false,
        }
    }
}

impl Selector for MemberNameSelector {
    fn can_execute(&self, _rule: &RuleMeta, property_path: &str, _data: &RootData) -> bool {
        self.members
            .iter()
            .any(|member| Self::matches(member, property_path))
    }
}
