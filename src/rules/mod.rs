//! The rule evaluation engine.
//!
//! A rule resolves its property name, asks the run's selector whether it may
//! execute, evaluates its conditions, and then hands a lazily computed value
//! to its `CheckInvoker`. The invoker runs checks strictly in declaration
//! order and applies the rule's cascade mode. When the rule added no
//! failures, its dependent rules are evaluated in turn; otherwise its
//! failure callback receives exactly the failures it added.
//!
//! Every rule can be evaluated through a synchronous and an asynchronous
//! path with identical outcomes. Only the asynchronous path suspends and
//! observes cancellation.

mod check;
mod collection;
mod error;
mod invoker;
mod meta;
mod rule;
mod transform;

pub use check::{AsyncValidate, Check, CheckKind, CheckOutput, SyncValidate};
pub use collection::{default_index_builder, CollectionRule, ElementFilter, IndexBuilder};
pub use error::{CheckError, EvaluationError};
pub use invoker::{CascadeMode, CheckInvoker};
pub use meta::RuleMeta;
pub use rule::{DisplayName, OnFailure, PropertyRule, ValidationRule};
pub use transform::{Transformer, ValueFn};

pub(crate) use rule::RuleCore;
