//! Macros shared by the rule builders.

/// Generate the rule options common to every rule builder.
///
/// The builder must hold its shared state in a `parts: RuleParts<T>` field.
macro_rules! rule_options {
    () => {
        /// Static display name, used for messages and as the leaf of rules
        /// without a property name.
        pub fn display_name(mut self, name: impl Into<String>) -> Self {
            self.parts.display_name = Some($crate::rules::DisplayName::Static(name.into()));
            self
        }

        /// Display name resolved from the instance at evaluation time.
        pub fn display_name_with<F>(mut self, resolve: F) -> Self
        where
            F: Fn(&T) -> Option<String> + Send + Sync + 'static,
        {
            self.parts.display_name = Some($crate::rules::DisplayName::Resolved(
                std::sync::Arc::new(resolve),
            ));
            self
        }

        /// Only run the rule when `predicate` holds. Repeated calls combine
        /// with AND.
        pub fn when<F>(mut self, predicate: F) -> Self
        where
            F: Fn(&T) -> bool + Send + Sync + 'static,
        {
            self.parts.add_condition($crate::core::Condition::new(predicate));
            self
        }

        /// Only run the rule when the asynchronous `predicate` holds.
        ///
        /// The synchronous path blocks on the predicate.
        pub fn when_async<F>(mut self, predicate: F) -> Self
        where
            F: for<'a> Fn(&'a T) -> futures::future::BoxFuture<'a, bool>
                + Send
                + Sync
                + 'static,
        {
            self.parts
                .add_async_condition($crate::core::AsyncCondition::new(predicate));
            self
        }

        pub fn cascade(mut self, mode: $crate::rules::CascadeMode) -> Self {
            self.parts.meta.set_cascade(mode);
            self
        }

        /// Tag the rule with a rule set.
        pub fn in_rule_set(
            mut self,
            rule_set: impl Into<String>,
        ) -> Result<Self, $crate::builder::BuildError> {
            self.parts.add_rule_set(rule_set.into())?;
            Ok(self)
        }

        /// Receive exactly the failures one evaluation of this rule added.
        pub fn on_failure<F>(mut self, callback: F) -> Self
        where
            F: Fn(&T, &[$crate::core::ValidationFailure]) + Send + Sync + 'static,
        {
            self.parts.on_failure = Some(std::sync::Arc::new(callback));
            self
        }

        /// Declare rules that only run when this rule adds no failures.
        ///
        /// Rules added to the sink inside `body` become dependents of this
        /// rule, in the order they were added.
        pub fn dependent_rules<F>(mut self, body: F) -> Result<Self, $crate::builder::BuildError>
        where
            F: FnOnce(&mut $crate::builder::RuleSink<T>) -> Result<(), $crate::builder::BuildError>,
        {
            let captured = $crate::builder::try_with_capture(body)?;
            self.parts.dependents.extend(captured);
            Ok(self)
        }
    };
}
