//! Scoped capture of rules declared inside a nested definition.

use crate::rules::ValidationRule;

/// Collects the rules declared inside one capture scope.
///
/// A sink is handed to the body of [`with_capture`] and lives only for that
/// call, so nested scopes never see each other's rules.
pub struct RuleSink<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
}

impl<T> RuleSink<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after every rule captured so far.
    pub fn add<R>(&mut self, rule: R)
    where
        R: ValidationRule<T> + 'static,
    {
        self.rules.push(Box::new(rule));
    }

    pub fn add_boxed(&mut self, rule: Box<dyn ValidationRule<T>>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_rules(self) -> Vec<Box<dyn ValidationRule<T>>> {
        self.rules
    }
}

impl<T> Default for RuleSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `body` with a fresh sink and return the rules it captured.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::{with_capture, RuleBuilder, RuleSink};
/// use rulebook::rules::Check;
///
/// struct Login {
///     user: String,
/// }
///
/// let captured = with_capture(|sink: &mut RuleSink<Login>| {
///     let rule = RuleBuilder::for_property("User", |l: &Login| l.user.clone())
///         .unwrap()
///         .check(Check::must("required", |u: &String| !u.is_empty(), "required"))
///         .unwrap()
///         .build();
///     sink.add(rule);
/// });
///
/// assert_eq!(captured.len(), 1);
/// ```
pub fn with_capture<T, F>(body: F) -> Vec<Box<dyn ValidationRule<T>>>
where
    F: FnOnce(&mut RuleSink<T>),
{
    let mut sink = RuleSink::new();
    body(&mut sink);
    sink.into_rules()
}

/// Fallible form of [`with_capture`].
///
/// When `body` fails, the rules it captured are discarded with the sink and
/// the error is returned.
pub fn try_with_capture<T, E, F>(body: F) -> Result<Vec<Box<dyn ValidationRule<T>>>, E>
where
    F: FnOnce(&mut RuleSink<T>) -> Result<(), E>,
{
    let mut sink = RuleSink::new();
    body(&mut sink)?;
    Ok(sink.into_rules())
}
