//! Rulebook: a rule-based object validation engine
//!
//! Rulebook evaluates a pre-built graph of validation rules against an
//! instance and produces an ordered list of validation failures. Rules are
//! defined once and evaluated many times, from one thread or many.
//!
//! # Core Concepts
//!
//! - **Rules**: A value read from the instance plus an ordered list of checks
//! - **Cascade**: Whether a rule keeps running checks after one fails
//! - **Dependent rules**: Rules that only run when their parent added no failures
//! - **Collection rules**: Checks run per element, named `Items[2]` by original position
//! - **Transformers**: Map a raw value to the value checks observe
//! - **Sync and async paths**: Identical outcomes; only the async path suspends
//!   and honours cancellation
//!
//! # Example
//!
//! ```rust
//! use rulebook::builder::{CollectionRuleBuilder, RuleBuilder, ValidatorBuilder};
//! use rulebook::rules::Check;
//!
//! struct Article {
//!     title: String,
//!     tags: Vec<String>,
//! }
//!
//! let validator = ValidatorBuilder::new()
//!     .rule(
//!         RuleBuilder::for_property("Title", |a: &Article| a.title.clone())
//!             .unwrap()
//!             .transform(|_a: &Article, title: String| title.chars().count())
//!             .unwrap()
//!             .check(Check::must("long_enough", |len: &usize| *len > 5, "'{PropertyName}' is too short"))
//!             .unwrap()
//!             .build(),
//!     )
//!     .rule(
//!         CollectionRuleBuilder::for_each("Tags", |a: &Article| a.tags.clone())
//!             .unwrap()
//!             .filter(|tag: &String| !tag.is_empty())
//!             .check(Check::must("lowercase", |tag: &String| tag.to_lowercase() == *tag, "'{PropertyName}' must be lowercase"))
//!             .unwrap()
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let article = Article {
//!     title: "hello".to_string(),
//!     tags: vec!["rust".to_string(), String::new(), "Async".to_string()],
//! };
//! let result = validator.validate(&article).unwrap();
//!
//! let names: Vec<_> = result.failures().iter().map(|f| f.property_name.as_str()).collect();
//! assert_eq!(names, vec!["Title", "Tags[2]"]);
//! assert_eq!(result.failures()[0].attempted_value, Some(serde_json::json!(5)));
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod rules;

// Re-export commonly used types
pub use self::builder::{BuildError, CollectionRuleBuilder, RuleBuilder, ValidatorBuilder};
pub use self::core::{ValidationContext, ValidationFailure, ValidationResult};
pub use self::engine::{Validator, ValidatorConfig};
pub use self::rules::{CascadeMode, Check, EvaluationError, ValidationRule};
