//! Absolute schema paths.

use std::fmt;
use std::sync::Arc;

use crate::QName;

/// Absolute path of a schema node, one [`QName`] per schema level.
///
/// Unlike data paths, schema paths include choice and case levels, and the
/// input/output level of an rpc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SchemaPath(Arc<[QName]>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_qnames<I>(qnames: I) -> Self
    where
        I: IntoIterator<Item = QName>,
    {
        Self(qnames.into_iter().collect())
    }

    /// Returns a new path with `qname` appended.
    pub fn child(&self, qname: QName) -> Self {
        let mut steps = self.0.to_vec();
        steps.push(qname);
        Self(steps.into())
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.into()))
    }

    pub fn last(&self) -> Option<&QName> {
        self.0.last()
    }

    pub fn steps(&self) -> &[QName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &SchemaPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for step in self.0.iter() {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}
