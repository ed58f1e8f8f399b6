//! Predicates that gate rules and checks.
//!
//! A `Condition` is a synchronous predicate over the instance being
//! validated. An `AsyncCondition` is its asynchronous counterpart; on the
//! synchronous evaluation path it is resolved by blocking.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type AsyncPredicate<T> = Arc<dyn for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync>;

/// Synchronous predicate deciding whether a rule or check applies.
///
/// # Example
///
/// ```rust
/// use rulebook::core::Condition;
///
/// struct Order {
///     express: bool,
/// }
///
/// let express_only = Condition::new(|order: &Order| order.express);
///
/// assert!(express_only.check(&Order { express: true }));
/// assert!(!express_only.check(&Order { express: false }));
/// ```
pub struct Condition<T> {
    predicate: Predicate<T>,
}

impl<T> Condition<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check(&self, instance: &T) -> bool {
        (self.predicate)(instance)
    }

    /// Combine with another condition; both must hold.
    pub fn and(self, other: Condition<T>) -> Self
    where
        T: 'static,
    {
        let (first, second) = (self.predicate, other.predicate);
        Self::new(move |instance: &T| first(instance) && second(instance))
    }
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

/// Asynchronous predicate deciding whether a rule or check applies.
pub struct AsyncCondition<T> {
    predicate: AsyncPredicate<T>,
}

impl<T: Sync> AsyncCondition<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check<'a>(&self, instance: &'a T) -> BoxFuture<'a, bool> {
        (self.predicate)(instance)
    }

    /// Resolve the predicate on the calling thread.
    ///
    /// Used by the synchronous evaluation path. Must not be called from
    /// inside an async runtime's worker when the predicate depends on that
    /// runtime making progress.
    pub fn check_blocking(&self, instance: &T) -> bool {
        futures::executor::block_on(self.check(instance))
    }

    /// Combine with another async condition; both must hold, in order.
    pub fn and(self, other: AsyncCondition<T>) -> Self
    where
        T: 'static,
    {
        let (first, second) = (self.predicate, other.predicate);
        Self::new(move |instance: &T| {
            let first = first(instance);
            let second = Arc::clone(&second);
            async move { first.await && second(instance).await }.boxed()
        })
    }
}

impl<T> Clone for AsyncCondition<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
