//! Builder API for defining rules and validators.
//!
//! Builders validate their input as it is supplied and report misuse as a
//! `BuildError` from the offending call. Dependent rules and validator rule
//! lists are declared inside a capture scope that receives an explicit
//! `RuleSink`.

#[macro_use]
mod macros;

mod capture;
mod collection;
mod error;
mod parts;
mod rule;
mod validator;

pub use capture::{try_with_capture, with_capture, RuleSink};
pub use collection::CollectionRuleBuilder;
pub use error::BuildError;
pub use rule::RuleBuilder;
pub use validator::ValidatorBuilder;
