//! Opaque element references.
//!
//! The target/selector resolver (an external collaborator) assigns each page
//! element a stable numeric identity and snapshots the capability surface the
//! matcher's guards need: tag name and attributes. The core never touches the
//! DOM and never computes a selector.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolver-assigned element identity. Stable for the lifetime of a
/// recording; equality of ids is element identity.
pub type TargetId = u64;

/// An opaque reference to the element an event occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    id: TargetId,
    tag_name: String,
    attributes: HashMap<String, String>,
}

impl Target {
    /// Create a target reference.
    ///
    /// The tag name is normalized to upper case, matching what DOM
    /// `Element.tagName` reports for HTML documents.
    #[must_use]
    pub fn new(id: TargetId, tag_name: impl Into<String>) -> Self {
        Self {
            id,
            tag_name: tag_name.into().to_uppercase(),
            attributes: HashMap::new(),
        }
    }

    /// Attach an attribute snapshot.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Resolver-assigned identity.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Upper-cased tag name (`"INPUT"`, `"TEXTAREA"`, ...).
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Whether the element carried the named attribute at capture time.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute value lookup.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Identity comparison against another target.
    #[must_use]
    pub const fn same_as(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_is_normalized() {
        let target = Target::new(1, "input");
        assert_eq!(target.tag_name(), "INPUT");
    }

    #[test]
    fn test_same_as_uses_identity_not_shape() {
        let a = Target::new(1, "div");
        let b = Target::new(1, "span");
        let c = Target::new(2, "div");
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn test_attribute_lookup() {
        let target = Target::new(3, "input")
            .with_attribute("type", "file")
            .with_attribute("disabled", "");
        assert!(target.has_attribute("disabled"));
        assert_eq!(target.attribute("type"), Some("file"));
        assert_eq!(target.attribute("missing"), None);
    }
}
