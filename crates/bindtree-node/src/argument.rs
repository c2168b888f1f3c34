//! Node identifiers.

use std::collections::BTreeSet;
use std::fmt;

use bindtree_schema::QName;

use crate::Scalar;

/// Key values of a list entry, in key declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPredicates(Vec<(QName, Scalar)>);

impl KeyPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: QName, value: Scalar) {
        self.0.push((name, value));
    }

    pub fn get(&self, name: &QName) -> Option<&Scalar> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QName, &Scalar)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(QName, Scalar)> for KeyPredicates {
    fn from_iter<T: IntoIterator<Item = (QName, Scalar)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Identifier of a keyed list entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentifierWithPredicates {
    pub node_type: QName,
    pub predicates: KeyPredicates,
}

impl NodeIdentifierWithPredicates {
    pub fn new(node_type: QName, predicates: KeyPredicates) -> Self {
        Self {
            node_type,
            predicates,
        }
    }
}

impl fmt::Display for NodeIdentifierWithPredicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node_type)?;
        for (k, v) in self.predicates.iter() {
            write!(f, "[{k}='{v}']")?;
        }
        Ok(())
    }
}

/// Identifier of an augmentation: the names of its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AugmentationIdentifier(pub BTreeSet<QName>);

impl AugmentationIdentifier {
    pub fn new(names: BTreeSet<QName>) -> Self {
        Self(names)
    }

    pub fn contains(&self, name: &QName) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> &BTreeSet<QName> {
        &self.0
    }
}

impl fmt::Display for AugmentationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AugmentationIdentifier{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        f.write_str("}")
    }
}

/// Identifier of a leaf-set entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeWithValue {
    pub node_type: QName,
    pub value: Scalar,
}

/// One step of a generic path, and the identifier of a generic node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathArgument {
    Node(QName),
    Entry(NodeIdentifierWithPredicates),
    Augmentation(AugmentationIdentifier),
    Value(NodeWithValue),
}

impl PathArgument {
    /// The qualified name this argument addresses; augmentations have none.
    pub fn node_type(&self) -> Option<&QName> {
        match self {
            Self::Node(q) => Some(q),
            Self::Entry(id) => Some(&id.node_type),
            Self::Value(v) => Some(&v.node_type),
            Self::Augmentation(_) => None,
        }
    }
}

impl From<QName> for PathArgument {
    fn from(value: QName) -> Self {
        Self::Node(value)
    }
}

impl From<NodeIdentifierWithPredicates> for PathArgument {
    fn from(value: NodeIdentifierWithPredicates) -> Self {
        Self::Entry(value)
    }
}

impl From<AugmentationIdentifier> for PathArgument {
    fn from(value: AugmentationIdentifier) -> Self {
        Self::Augmentation(value)
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(q) => write!(f, "{q}"),
            Self::Entry(id) => write!(f, "{id}"),
            Self::Augmentation(id) => write!(f, "{id}"),
            Self::Value(v) => write!(f, "{}[.='{}']", v.node_type, v.value),
        }
    }
}
