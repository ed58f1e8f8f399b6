//! Value sources and transformers.

use std::sync::Arc;

/// Pure accessor from the validated instance to a rule's value.
pub type ValueFn<T, P> = Arc<dyn Fn(&T) -> P + Send + Sync>;

/// Maps a rule's raw value to the value its checks observe.
///
/// Attached at most once per rule. The raw accessor and the transformer
/// each run once per evaluation of the rule.
///
/// # Example
///
/// ```rust
/// use rulebook::rules::Transformer;
///
/// struct Post {
///     title: String,
/// }
///
/// let length = Transformer::new(|_post: &Post, title: String| title.chars().count());
/// let post = Post { title: "hello".to_string() };
///
/// assert_eq!(length.apply(&post, post.title.clone()), 5);
/// ```
pub struct Transformer<T, R, P> {
    transform: Arc<dyn Fn(&T, R) -> P + Send + Sync>,
}

impl<T, R, P> Transformer<T, R, P>
where
    T: 'static,
    R: 'static,
    P: 'static,
{
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&T, R) -> P + Send + Sync + 'static,
    {
        Self {
            transform: Arc::new(transform),
        }
    }

    pub fn apply(&self, instance: &T, raw: R) -> P {
        (self.transform)(instance, raw)
    }

    /// Compose with a raw accessor into the value source checks read.
    pub fn compose(&self, source: ValueFn<T, R>) -> ValueFn<T, P> {
        let transform = Arc::clone(&self.transform);
        Arc::new(move |instance: &T| transform(instance, source(instance)))
    }
}

impl<T, R, P> Clone for Transformer<T, R, P> {
    fn clone(&self) -> Self {
        Self {
            transform: Arc::clone(&self.transform),
        }
    }
}
