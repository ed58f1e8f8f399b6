//! Leaf types shared by the evaluation engine.
//!
//! This module contains the per-run state and the values a run produces:
//! - Property paths via `PropertyChain`
//! - Run state via `ValidationContext` and the per-check `PropertyContext`
//! - Failures and results
//! - Conditions and rule selectors

mod chain;
mod condition;
mod context;
mod failure;
mod selector;

pub use chain::PropertyChain;
pub use condition::{AsyncCondition, Condition};
pub use context::{PropertyContext, RootData, ValidationContext};
pub use failure::{Severity, ValidationFailure, ValidationResult};
pub use selector::{
    DefaultSelector, MemberNameSelector, RuleSetSelector, Selector, ALL_RULE_SETS,
    DEFAULT_RULE_SET,
};
