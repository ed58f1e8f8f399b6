//! Property paths for failure names.
//!
//! A `PropertyChain` is the stack of name segments leading to the rule
//! currently being evaluated. Nested properties are joined with `.`, while
//! segments starting with `[` (collection indexers) attach directly to the
//! segment before them.

use std::fmt;

/// Ordered push/pop stack of property name segments.
///
/// # Example
///
/// ```rust
/// use rulebook::core::PropertyChain;
///
/// let mut chain = PropertyChain::new();
/// assert_eq!(chain.build_property_name("Name"), "Name");
///
/// chain.push("Customer");
/// assert_eq!(chain.build_property_name("Name"), "Customer.Name");
///
/// chain.push("Tags[2]");
/// assert_eq!(chain.build_property_name(""), "Customer.Tags[2]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyChain {
    segments: Vec<String>,
}

impl PropertyChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Create a chain rooted at an already built path.
    ///
    /// Used when a nested validator runs against a property value: every name
    /// it produces is prefixed with the parent's full property path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let mut chain = Self::new();
        if !path.is_empty() {
            chain.push(path);
        }
        chain
    }

    /// Push a segment onto the chain.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Pop the most recently pushed segment.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Join the chain and `leaf` into a full property name.
    ///
    /// Empty segments contribute nothing, so a model-level rule (empty leaf)
    /// at the root produces an empty name.
    pub fn build_property_name(&self, leaf: &str) -> String {
        let mut name = String::new();
        for piece in self
            .segments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(leaf))
        {
            append_segment(&mut name, piece);
        }
        name
    }
}

fn append_segment(name: &mut String, piece: &str) {
    if piece.is_empty() {
        return;
    }
    if !name.is_empty() && !piece.starts_with('[') {
        name.push('.');
    }
    name.push_str(piece);
}

impl fmt::Display for PropertyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build_property_name(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_returns_leaf_without_separator() {
        let chain = PropertyChain::new();
        assert_eq!(chain.build_property_name("Surname"), "Surname");
        assert_eq!(chain.build_property_name(""), "");
    }

    #[test]
    fn nested_segments_are_dotted() {
        let mut chain = PropertyChain::new();
        chain.push("Order");
        chain.push("Customer");

        assert_eq!(chain.build_property_name("Email"), "Order.Customer.Email");
    }

    #[test]
    fn indexers_attach_without_dot() {
        let mut chain = PropertyChain::new();
        chain.push("Order");
        chain.push("[3]");

        assert_eq!(chain.build_property_name("Sku"), "Order[3].Sku");
    }

    #[test]
    fn pop_restores_previous_path() {
        let mut chain = PropertyChain::new();
        chain.push("Lines");
        chain.push("Lines[0]");
        assert_eq!(chain.pop().as_deref(), Some("Lines[0]"));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.to_string(), "Lines");
    }

    #[test]
    fn from_path_ignores_empty_root() {
        assert!(PropertyChain::from_path("").is_empty());
        assert_eq!(
            PropertyChain::from_path("Customer").build_property_name("Name"),
            "Customer.Name"
        );
    }

    #[test]
    fn empty_segments_are_skipped() {
        let mut chain = PropertyChain::new();
        chain.push("");
        chain.push("Address");

        assert_eq!(chain.build_property_name("Line1"), "Address.Line1");
    }
}
