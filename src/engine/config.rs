//! Validator-wide settings.

use crate::core::{DefaultSelector, RuleSetSelector, Selector};
use crate::rules::CascadeMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading a `ValidatorConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed validator configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Rule set names must not be empty")]
    EmptyRuleSetName,
}

/// Settings applied to a whole validator.
///
/// # Example
///
/// ```rust
/// use rulebook::engine::ValidatorConfig;
/// use rulebook::rules::CascadeMode;
///
/// let config = ValidatorConfig::from_json(r#"{ "cascade": "Stop", "rule_sets": ["billing"] }"#)
///     .unwrap();
///
/// assert_eq!(config.cascade, CascadeMode::Stop);
/// assert_eq!(config.rule_sets, vec!["billing".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Under `Stop`, the first top-level rule that adds failures ends the run.
    pub cascade: CascadeMode,

    /// Rule sets selected by `Validator::validate`; empty selects the
    /// default set.
    pub rule_sets: Vec<String>,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cascade(mut self, cascade: CascadeMode) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.rule_sets.push(rule_set.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.rule_sets.iter().any(|name| name.is_empty()) {
            return Err(ConfigError::EmptyRuleSetName);
        }
        Ok(config)
    }

    /// Selector the convenience entry points run with.
    pub(crate) fn selector(&self) -> Arc<dyn Selector> {
        if self.rule_sets.is_empty() {
            Arc::new(DefaultSelector)
        } else {
            Arc::new(RuleSetSelector::new(self.rule_sets.iter().cloned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleMeta;

    #[test]
    fn defaults_continue_with_default_selector() {
        let config = ValidatorConfig::default();

        assert_eq!(config.cascade, CascadeMode::Continue);
        assert!(config.rule_sets.is_empty());

        let untagged = RuleMeta::new(Some("Name".to_string()), CascadeMode::Continue);
        assert!(config
            .selector()
            .can_execute(&untagged, "Name", &Default::default()));
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = ValidatorConfig::from_json(r#"{ "rule_sets": ["audit"] }"#).unwrap();

        assert_eq!(config.cascade, CascadeMode::Continue);
        assert_eq!(config.rule_sets, vec!["audit".to_string()]);
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let result = ValidatorConfig::from_json("{ cascade: ");

        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn from_json_rejects_empty_rule_set() {
        let result = ValidatorConfig::from_json(r#"{ "rule_sets": [""] }"#);

        assert!(matches!(result, Err(ConfigError::EmptyRuleSetName)));
    }

    #[test]
    fn rule_sets_drive_the_selector() {
        let config = ValidatorConfig::new().with_rule_set("audit");
        let selector = config.selector();

        let untagged = RuleMeta::new(Some("Name".to_string()), CascadeMode::Continue);
        let mut audited = RuleMeta::new(Some("Name".to_string()), CascadeMode::Continue);
        audited.add_rule_set("audit");

        assert!(!selector.can_execute(&untagged, "Name", &Default::default()));
        assert!(selector.can_execute(&audited, "Name", &Default::default()));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ValidatorConfig::new()
            .with_cascade(CascadeMode::Stop)
            .with_rule_set("billing");

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ValidatorConfig::from_json(&json).unwrap(), config);
    }
}
