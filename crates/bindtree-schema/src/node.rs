//! Schema nodes.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{QName, SchemaPath, TypeDefinition};

/// What a schema node models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    Container {
        presence: bool,
    },
    /// A list; `key` is empty for unkeyed lists and otherwise in declaration order.
    List {
        key: Vec<QName>,
        ordered_by_user: bool,
    },
    Leaf {
        ty: TypeDefinition,
    },
    LeafList {
        ty: TypeDefinition,
        ordered_by_user: bool,
    },
    Choice,
    Case,
    Notification,
    Rpc,
    RpcInput,
    RpcOutput,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::List { .. } => "list",
            Self::Leaf { .. } => "leaf",
            Self::LeafList { .. } => "leaf-list",
            Self::Choice => "choice",
            Self::Case => "case",
            Self::Notification => "notification",
            Self::Rpc => "rpc",
            Self::RpcInput => "input",
            Self::RpcOutput => "output",
        }
    }
}

/// An immutable schema node.
///
/// `children` keeps declaration order. Children contributed by augmentations
/// are not listed there; they live in the matching entry of `augmentations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub qname: QName,
    pub kind: SchemaKind,
    pub path: SchemaPath,
    /// Path of the original definition when the node was instantiated from a grouping.
    pub origin: Option<SchemaPath>,
    pub children: Vec<Arc<SchemaNode>>,
    pub augmentations: Vec<Arc<AugmentationSchema>>,
}

impl SchemaNode {
    /// Direct declared child by name.
    pub fn child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.children.iter().find(|c| &c.qname == qname)
    }

    /// Direct declared child whose original definition is `origin`.
    pub fn child_by_origin(&self, origin: &SchemaPath) -> Option<&Arc<SchemaNode>> {
        self.children
            .iter()
            .find(|c| c.origin.as_ref() == Some(origin))
    }

    /// The augmentation contributing a child named `qname`, if any.
    pub fn augmentation_for_child(&self, qname: &QName) -> Option<&Arc<AugmentationSchema>> {
        self.augmentations
            .iter()
            .find(|aug| aug.child(qname).is_some())
    }

    /// The augmentation with exactly this identity.
    pub fn augmentation_by_identity(&self, identity: &BTreeSet<QName>) -> Option<&Arc<AugmentationSchema>> {
        self.augmentations
            .iter()
            .find(|aug| &aug.identity() == identity)
    }

    /// Ordered key definition; empty for anything other than a keyed list.
    pub fn key(&self) -> &[QName] {
        match &self.kind {
            SchemaKind::List { key, .. } => key,
            _ => &[],
        }
    }

    pub fn leaf_type(&self) -> Option<&TypeDefinition> {
        match &self.kind {
            SchemaKind::Leaf { ty } | SchemaKind::LeafList { ty, .. } => Some(ty),
            _ => None,
        }
    }

    pub fn is_keyed_list(&self) -> bool {
        matches!(&self.kind, SchemaKind::List { key, .. } if !key.is_empty())
    }

    pub fn is_ordered_by_user(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::List {
                ordered_by_user: true,
                ..
            } | SchemaKind::LeafList {
                ordered_by_user: true,
                ..
            }
        )
    }

    /// True when this node and `other` come from the same original definition.
    pub fn is_equivalent(&self, other: &SchemaNode) -> bool {
        if self.path == other.path {
            return true;
        }
        match (&self.origin, &other.origin) {
            (Some(a), Some(b)) => a == b && self.kind == other.kind,
            _ => false,
        }
    }
}

/// An augmentation of a schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationSchema {
    pub target: SchemaPath,
    /// Original definition when the augmentation came from a grouping.
    pub origin: Option<SchemaPath>,
    pub children: Vec<Arc<SchemaNode>>,
}

impl AugmentationSchema {
    /// Names of the direct children; augmentations are identified by this set.
    pub fn identity(&self) -> BTreeSet<QName> {
        self.children.iter().map(|c| c.qname.clone()).collect()
    }

    pub fn child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.children.iter().find(|c| &c.qname == qname)
    }

    pub fn is_equivalent(&self, other: &AugmentationSchema) -> bool {
        match (&self.origin, &other.origin) {
            (Some(a), Some(b)) => a == b,
            _ => self.target == other.target && self.identity() == other.identity(),
        }
    }
}
