//! The immutable schema model handed to the codec.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::{AugmentationSchema, QName, SchemaKind, SchemaNode, SchemaPath};

/// One loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub namespace: Arc<str>,
    pub revision: Option<String>,
}

/// A declared identity and its direct bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySchema {
    pub qname: QName,
    pub bases: Vec<QName>,
}

/// Where a typed-tree type lives in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaLocation {
    /// A data node, notification, rpc payload, choice or case.
    Node(SchemaPath),
    /// An augmentation of `target`, identified by its child names.
    Augmentation {
        target: SchemaPath,
        identity: BTreeSet<QName>,
    },
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(path) => write!(f, "{path}"),
            Self::Augmentation { target, identity } => {
                write!(f, "{target}+[")?;
                for (i, q) in identity.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{q}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One generation of the schema model.
///
/// Each context carries a generation number; codec trees built for one
/// generation are never mutated to follow a later one.
#[derive(Debug)]
pub struct SchemaContext {
    pub(crate) generation: u64,
    pub(crate) modules: Vec<ModuleInfo>,
    pub(crate) data: Vec<Arc<SchemaNode>>,
    pub(crate) notifications: Vec<Arc<SchemaNode>>,
    pub(crate) operations: Vec<Arc<SchemaNode>>,
    pub(crate) identities: Vec<IdentitySchema>,
}

impl SchemaContext {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    pub fn module_by_namespace(&self, namespace: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| &*m.namespace == namespace)
    }

    /// True when `qname` belongs to a loaded module.
    pub fn knows_namespace(&self, qname: &QName) -> bool {
        self.module_by_namespace(qname.namespace()).is_some()
    }

    pub fn data_children(&self) -> &[Arc<SchemaNode>] {
        &self.data
    }

    pub fn notifications(&self) -> &[Arc<SchemaNode>] {
        &self.notifications
    }

    pub fn operations(&self) -> &[Arc<SchemaNode>] {
        &self.operations
    }

    pub fn identities(&self) -> &[IdentitySchema] {
        &self.identities
    }

    pub fn data_child(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.data.iter().find(|n| &n.qname == qname)
    }

    pub fn notification(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.notifications.iter().find(|n| &n.qname == qname)
    }

    pub fn rpc(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.operations.iter().find(|n| &n.qname == qname)
    }

    pub fn identity(&self, qname: &QName) -> Option<&IdentitySchema> {
        self.identities.iter().find(|i| &i.qname == qname)
    }

    /// Any top-level node: data, notification or rpc.
    pub fn top_level(&self, qname: &QName) -> Option<&Arc<SchemaNode>> {
        self.data_child(qname)
            .or_else(|| self.notification(qname))
            .or_else(|| self.rpc(qname))
    }

    /// Resolves an absolute schema path, descending through augmentation children.
    pub fn node_at(&self, path: &SchemaPath) -> Option<Arc<SchemaNode>> {
        let (first, rest) = path.steps().split_first()?;
        let mut current = Arc::clone(self.top_level(first)?);
        for step in rest {
            let next = match current.child(step) {
                Some(child) => Arc::clone(child),
                None => {
                    let aug = current.augmentation_for_child(step)?;
                    Arc::clone(aug.child(step)?)
                }
            };
            current = next;
        }
        Some(current)
    }

    pub fn augmentation_at(
        &self,
        target: &SchemaPath,
        identity: &BTreeSet<QName>,
    ) -> Option<Arc<AugmentationSchema>> {
        let node = self.node_at(target)?;
        node.augmentation_by_identity(identity).cloned()
    }

    /// The input or output payload of an rpc.
    pub fn rpc_payload(&self, rpc: &QName, output: bool) -> Option<&Arc<SchemaNode>> {
        let rpc = self.rpc(rpc)?;
        rpc.children.iter().find(|c| {
            if output {
                c.kind == SchemaKind::RpcOutput
            } else {
                c.kind == SchemaKind::RpcInput
            }
        })
    }
}
