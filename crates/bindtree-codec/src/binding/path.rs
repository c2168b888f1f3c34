//! Typed paths into the typed tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{key_eq, key_hash, BindingType, KeyHolder};

/// One step of an [`InstanceIdentifier`].
#[derive(Debug, Clone)]
pub enum PathStep {
    /// A container, augmentation or unkeyed list; for a keyed list, every entry.
    Item(BindingType),
    /// One entry of a keyed list.
    Keyed {
        ty: BindingType,
        key: Arc<dyn KeyHolder>,
    },
}

impl PathStep {
    pub fn ty(&self) -> &BindingType {
        match self {
            Self::Item(ty) | Self::Keyed { ty, .. } => ty,
        }
    }

    pub fn key(&self) -> Option<&Arc<dyn KeyHolder>> {
        match self {
            Self::Keyed { key, .. } => Some(key),
            Self::Item(_) => None,
        }
    }
}

impl PartialEq for PathStep {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Item(a), Self::Item(b)) => a == b,
            (Self::Keyed { ty: a, key: ka }, Self::Keyed { ty: b, key: kb }) => {
                a == b && key_eq(&**ka, &**kb)
            }
            _ => false,
        }
    }
}

impl Eq for PathStep {}

impl Hash for PathStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty().hash(state);
        if let Self::Keyed { key, .. } = self {
            key_hash(&**key, state);
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(ty) => write!(f, "{ty}"),
            Self::Keyed { ty, key } => {
                write!(f, "{ty}[")?;
                for (i, (name, value)) in key.components().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Some(v) => write!(f, "{name}={v:?}")?,
                        None => write!(f, "{name}=?")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// A path from the root of the typed tree, one step per typed object.
///
/// Choices and cases never appear as steps; they are implied by the types
/// of the steps that follow them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstanceIdentifier {
    steps: Vec<PathStep>,
}

impl InstanceIdentifier {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn of(ty: BindingType) -> Self {
        Self {
            steps: vec![PathStep::Item(ty)],
        }
    }

    pub fn child(&self, ty: BindingType) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Item(ty));
        Self { steps }
    }

    pub fn keyed(&self, ty: BindingType, key: Arc<dyn KeyHolder>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Keyed { ty, key });
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    pub fn target_type(&self) -> Option<&BindingType> {
        self.steps.last().map(PathStep::ty)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.steps.split_last()?;
        Some(Self {
            steps: init.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ImmutableKey, TypedValue};

    fn key(name: &str) -> Arc<dyn KeyHolder> {
        Arc::new(ImmutableKey::new(
            BindingType::new("t.ListKey"),
            [("name", TypedValue::from(name))],
        ))
    }

    #[test]
    fn keyed_steps_compare_by_key_content() {
        let base = InstanceIdentifier::of(BindingType::new("t.Top"));
        let a = base.keyed(BindingType::new("t.List"), key("foo"));
        let b = base.keyed(BindingType::new("t.List"), key("foo"));
        let c = base.keyed(BindingType::new("t.List"), key("bar"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, base.child(BindingType::new("t.List")));
        assert_eq!(a.parent(), Some(base));
    }

    #[test]
    fn display_lists_steps() {
        let p = InstanceIdentifier::of(BindingType::new("t.Top"))
            .keyed(BindingType::new("t.List"), key("foo"));
        assert_eq!(p.to_string(), "/t.Top/t.List[name=String(\"foo\")]");
    }
}
