//! Top-level validators.
//!
//! A `Validator` owns the ordered top-level rules for one instance type and
//! evaluates them against a `ValidationContext`, either synchronously or
//! asynchronously. `ValidatorConfig` carries validator-wide settings.

mod config;
mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use validator::Validator;
