//! Immutable generic tree nodes.

use std::sync::Arc;

use bindtree_schema::QName;
use indexmap::IndexMap;

use crate::{AugmentationIdentifier, NodeIdentifierWithPredicates, NodeWithValue, PathArgument, Scalar};

/// Children of a data-container node, keyed by their identifiers.
///
/// Insertion order is kept for iteration; equality ignores it.
pub type Children = IndexMap<PathArgument, Arc<GenericNode>>;

/// A schema-agnostic, immutable data node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericNode {
    Leaf {
        name: QName,
        value: Scalar,
    },
    LeafSet {
        name: QName,
        ordered: bool,
        values: Vec<Scalar>,
    },
    Container {
        name: QName,
        children: Children,
    },
    Map {
        name: QName,
        ordered: bool,
        entries: IndexMap<NodeIdentifierWithPredicates, Arc<GenericNode>>,
    },
    MapEntry {
        id: NodeIdentifierWithPredicates,
        children: Children,
    },
    UnkeyedList {
        name: QName,
        entries: Vec<Arc<GenericNode>>,
    },
    UnkeyedListEntry {
        name: QName,
        children: Children,
    },
    Choice {
        name: QName,
        children: Children,
    },
    Augmentation {
        id: AugmentationIdentifier,
        children: Children,
    },
}

impl GenericNode {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf { .. } => "leaf",
            Self::LeafSet { .. } => "leaf-set",
            Self::Container { .. } => "container",
            Self::Map { .. } => "map",
            Self::MapEntry { .. } => "map-entry",
            Self::UnkeyedList { .. } => "unkeyed-list",
            Self::UnkeyedListEntry { .. } => "unkeyed-list-entry",
            Self::Choice { .. } => "choice",
            Self::Augmentation { .. } => "augmentation",
        }
    }

    pub fn identifier(&self) -> PathArgument {
        match self {
            Self::Leaf { name, .. }
            | Self::LeafSet { name, .. }
            | Self::Container { name, .. }
            | Self::Map { name, .. }
            | Self::UnkeyedList { name, .. }
            | Self::UnkeyedListEntry { name, .. }
            | Self::Choice { name, .. } => PathArgument::Node(name.clone()),
            Self::MapEntry { id, .. } => PathArgument::Entry(id.clone()),
            Self::Augmentation { id, .. } => PathArgument::Augmentation(id.clone()),
        }
    }

    /// Children of data-container nodes (container, entries, choice, augmentation).
    pub fn children(&self) -> Option<&Children> {
        match self {
            Self::Container { children, .. }
            | Self::MapEntry { children, .. }
            | Self::UnkeyedListEntry { children, .. }
            | Self::Choice { children, .. }
            | Self::Augmentation { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Looks up one child by identifier.
    ///
    /// Map nodes resolve entry identifiers; leaf sets resolve value identifiers
    /// to a synthesized leaf.
    pub fn child(&self, arg: &PathArgument) -> Option<Arc<GenericNode>> {
        match (self, arg) {
            (Self::Map { entries, .. }, PathArgument::Entry(id)) => entries.get(id).cloned(),
            (Self::LeafSet { name, values, .. }, PathArgument::Value(v)) if &v.node_type == name => {
                values.iter().find(|x| **x == v.value).map(|value| {
                    Arc::new(GenericNode::Leaf {
                        name: name.clone(),
                        value: value.clone(),
                    })
                })
            }
            _ => self.children()?.get(arg).cloned(),
        }
    }

    /// Descends along a relative path.
    pub fn find(self: &Arc<Self>, path: &[PathArgument]) -> Option<Arc<GenericNode>> {
        let mut current = Arc::clone(self);
        for arg in path {
            current = current.child(arg)?;
        }
        Some(current)
    }

    pub fn value(&self) -> Option<&Scalar> {
        match self {
            Self::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn values(&self) -> Option<&[Scalar]> {
        match self {
            Self::LeafSet { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Entries of a map or unkeyed list, in insertion order.
    pub fn entries(&self) -> Vec<Arc<GenericNode>> {
        match self {
            Self::Map { entries, .. } => entries.values().cloned().collect(),
            Self::UnkeyedList { entries, .. } => entries.clone(),
            _ => Vec::new(),
        }
    }

    pub fn leaf(name: QName, value: impl Into<Scalar>) -> Arc<Self> {
        Arc::new(Self::Leaf {
            name,
            value: value.into(),
        })
    }

    pub fn leaf_set<I>(name: QName, ordered: bool, values: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Scalar>,
    {
        Arc::new(Self::LeafSet {
            name,
            ordered,
            values: values.into_iter().collect(),
        })
    }

    pub fn container<I>(name: QName, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::Container {
            name,
            children: index_children(children),
        })
    }

    pub fn choice<I>(name: QName, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::Choice {
            name,
            children: index_children(children),
        })
    }

    pub fn augmentation<I>(id: AugmentationIdentifier, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::Augmentation {
            id,
            children: index_children(children),
        })
    }

    pub fn map<I>(name: QName, ordered: bool, entries: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|e| match e.identifier() {
                PathArgument::Entry(id) => Some((id, e)),
                _ => None,
            })
            .collect();
        Arc::new(Self::Map {
            name,
            ordered,
            entries,
        })
    }

    pub fn map_entry<I>(id: NodeIdentifierWithPredicates, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::MapEntry {
            id,
            children: index_children(children),
        })
    }

    pub fn unkeyed_list<I>(name: QName, entries: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::UnkeyedList {
            name,
            entries: entries.into_iter().collect(),
        })
    }

    pub fn unkeyed_entry<I>(name: QName, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Arc<GenericNode>>,
    {
        Arc::new(Self::UnkeyedListEntry {
            name,
            children: index_children(children),
        })
    }
}

fn index_children<I>(children: I) -> Children
where
    I: IntoIterator<Item = Arc<GenericNode>>,
{
    children.into_iter().map(|c| (c.identifier(), c)).collect()
}

impl NodeWithValue {
    pub fn new(node_type: QName, value: Scalar) -> Self {
        Self { node_type, value }
    }
}
