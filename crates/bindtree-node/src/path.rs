//! Absolute paths into a generic tree.

use std::fmt;

use crate::PathArgument;

/// An ordered sequence of [`PathArgument`]s from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GenericPath(Vec<PathArgument>);

impl GenericPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: PathArgument) {
        self.0.push(arg);
    }

    pub fn child(&self, arg: PathArgument) -> Self {
        let mut out = self.clone();
        out.0.push(arg);
        out
    }

    pub fn arguments(&self) -> &[PathArgument] {
        &self.0
    }

    pub fn last(&self) -> Option<&PathArgument> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathArgument> for GenericPath {
    fn from_iter<T: IntoIterator<Item = PathArgument>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for GenericPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.0 {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}
