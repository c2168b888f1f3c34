//! Qualified names.

use std::fmt;
use std::sync::Arc;

/// A namespace-qualified schema identifier.
///
/// Ordering is namespace first, then local name, which keeps sets of names
/// (augmentation identities, for one) deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Arc<str>,
    local_name: Arc<str>,
}

impl QName {
    pub fn new(namespace: impl Into<Arc<str>>, local_name: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Shared handle to the local name, used as the accessor key of generated types.
    pub fn local_name_arc(&self) -> Arc<str> {
        Arc::clone(&self.local_name)
    }

    /// A sibling name in the same namespace.
    pub fn sibling(&self, local_name: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: Arc::clone(&self.namespace),
            local_name: local_name.into(),
        }
    }

    /// Parse the `(namespace)local` form produced by [`fmt::Display`].
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('(')?;
        let (namespace, local) = rest.split_once(')')?;
        if local.is_empty() {
            return None;
        }
        Some(Self::new(namespace, local))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.namespace, self.local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let q = QName::new("urn:test", "top");
        assert_eq!(q.to_string(), "(urn:test)top");
        assert_eq!(QName::parse("(urn:test)top"), Some(q));
        assert_eq!(QName::parse("urn:test)top"), None);
        assert_eq!(QName::parse("(urn:test)"), None);
    }

    #[test]
    fn ordering_is_namespace_major() {
        let a = QName::new("a", "z");
        let b = QName::new("b", "a");
        assert!(a < b);
        assert!(a.sibling("y") < a);
    }
}
