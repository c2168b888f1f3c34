//! Codec nodes: one per typed-tree type reachable in the schema.
//!
//! A node is created lazily the first time its type is met and then reused
//! for the lifetime of its [`CodecTree`]. Children are resolved on demand,
//! memoized per requested type; alternate types bound to the same schema
//! location resolve to the canonical node.

mod table;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use bindtree_node::{AugmentationIdentifier, PathArgument};
use bindtree_schema::{AugmentationSchema, QName, SchemaKind, SchemaLocation, SchemaNode, SchemaPath};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::binding::BindingType;
use crate::error::{CodecError, Result};
use crate::key::{KeyCodec, KeyComponent};
use crate::tree::CodecTree;
use crate::value::ValueCodec;

pub use table::{ChildEntry, ChildKind};
pub(crate) use table::NodeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Notification,
    RpcInput,
    RpcOutput,
    /// A list; the same node describes every entry.
    List,
    Choice,
    Case,
    Augmentation,
}

impl NodeKind {
    /// True for nodes whose objects carry leaves and children directly.
    pub fn holds_data(self) -> bool {
        !matches!(self, Self::Choice)
    }
}

#[derive(Debug, Clone)]
pub enum NodeSchema {
    Data(Arc<SchemaNode>),
    Augmentation(Arc<AugmentationSchema>),
}

pub struct CodecNode {
    kind: NodeKind,
    binding_type: BindingType,
    schema: NodeSchema,
    identifier: Option<PathArgument>,
    children: DashMap<BindingType, Arc<OnceCell<Arc<CodecNode>>>>,
    table: OnceCell<NodeTable>,
    key_codec: OnceCell<Arc<KeyCodec>>,
}

impl fmt::Debug for CodecNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecNode")
            .field("kind", &self.kind)
            .field("binding_type", &self.binding_type)
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Memoizes `init` per key; failures leave the slot empty so they can be retried.
pub(crate) fn load_or_create<K, V, F>(map: &DashMap<K, Arc<OnceCell<V>>>, key: &K, init: F) -> Result<V>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: FnOnce() -> Result<V>,
{
    let cell = match map.get(key) {
        Some(cell) => Arc::clone(cell.value()),
        None => Arc::clone(map.entry(key.clone()).or_default().value()),
    };
    if let Some(v) = cell.get() {
        trace!("codec cache hit");
        return Ok(v.clone());
    }
    cell.get_or_try_init(init).cloned()
}

impl CodecNode {
    pub(crate) fn for_schema(binding_type: BindingType, schema: Arc<SchemaNode>) -> Result<Arc<Self>> {
        let kind = match &schema.kind {
            SchemaKind::Container { .. } => NodeKind::Container,
            SchemaKind::List { .. } => NodeKind::List,
            SchemaKind::Choice => NodeKind::Choice,
            SchemaKind::Case => NodeKind::Case,
            SchemaKind::Notification => NodeKind::Notification,
            SchemaKind::RpcInput => NodeKind::RpcInput,
            SchemaKind::RpcOutput => NodeKind::RpcOutput,
            other => {
                return Err(CodecError::invalid_value(
                    &schema.path,
                    format!("{} has no typed-tree object", other.as_str()),
                ))
            }
        };
        let identifier = match kind {
            NodeKind::Case => None,
            _ => Some(PathArgument::Node(schema.qname.clone())),
        };
        Ok(Arc::new(Self {
            kind,
            binding_type,
            schema: NodeSchema::Data(schema),
            identifier,
            children: DashMap::new(),
            table: OnceCell::new(),
            key_codec: OnceCell::new(),
        }))
    }

    pub(crate) fn for_augmentation(binding_type: BindingType, schema: Arc<AugmentationSchema>) -> Arc<Self> {
        let identifier = PathArgument::Augmentation(AugmentationIdentifier::new(schema.identity()));
        Arc::new(Self {
            kind: NodeKind::Augmentation,
            binding_type,
            schema: NodeSchema::Augmentation(schema),
            identifier: Some(identifier),
            children: DashMap::new(),
            table: OnceCell::new(),
            key_codec: OnceCell::new(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn binding_type(&self) -> &BindingType {
        &self.binding_type
    }

    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    /// Identifier of the generic node this codec node produces; cases have none.
    pub fn identifier(&self) -> Option<&PathArgument> {
        self.identifier.as_ref()
    }

    pub fn qname(&self) -> Option<&QName> {
        match &self.schema {
            NodeSchema::Data(s) => Some(&s.qname),
            NodeSchema::Augmentation(_) => None,
        }
    }

    pub fn schema_node(&self) -> Option<&Arc<SchemaNode>> {
        match &self.schema {
            NodeSchema::Data(s) => Some(s),
            NodeSchema::Augmentation(_) => None,
        }
    }

    /// Path of the schema node; for augmentations, the augmented target.
    pub fn schema_path(&self) -> &SchemaPath {
        match &self.schema {
            NodeSchema::Data(s) => &s.path,
            NodeSchema::Augmentation(a) => &a.target,
        }
    }

    pub fn is_keyed_list(&self) -> bool {
        self.schema_node().is_some_and(|s| s.is_keyed_list())
    }

    pub fn is_ordered_by_user(&self) -> bool {
        self.schema_node().is_some_and(|s| s.is_ordered_by_user())
    }

    pub(crate) fn table(&self) -> &NodeTable {
        self.table.get_or_init(|| match &self.schema {
            NodeSchema::Data(s) => NodeTable::build(&s.children, &s.augmentations),
            NodeSchema::Augmentation(a) => NodeTable::build(&a.children, &[]),
        })
    }

    /// Declared children in schema order.
    pub fn entries(&self) -> &[ChildEntry] {
        &self.table().entries
    }

    pub(crate) fn entry_node(&self, tree: &CodecTree, idx: usize) -> Result<Arc<CodecNode>> {
        let entry = &self.table().entries[idx];
        entry
            .node
            .get_or_try_init(|| {
                let location = SchemaLocation::Node(entry.schema.path.clone());
                let ty = tree.types().type_at(&location)?;
                let node = CodecNode::for_schema(ty, Arc::clone(&entry.schema))?;
                debug!(
                    parent = %self.binding_type,
                    child = %node.binding_type,
                    kind = ?node.kind,
                    "created codec node"
                );
                Ok(node)
            })
            .cloned()
    }

    pub(crate) fn leaf_codec(&self, tree: &CodecTree, idx: usize) -> Result<Arc<ValueCodec>> {
        let entry = &self.table().entries[idx];
        entry
            .value
            .get_or_try_init(|| {
                let def = entry.schema.leaf_type().ok_or_else(|| {
                    CodecError::invalid_value(&entry.schema.path, "not a leaf or leaf-list")
                })?;
                ValueCodec::for_definition(def, tree.types()).map(Arc::new)
            })
            .cloned()
    }

    /// The child node for a container, list, choice or case type.
    pub fn child(&self, tree: &CodecTree, ty: &BindingType) -> Result<Arc<CodecNode>> {
        load_or_create(&self.children, ty, || self.create_child(tree, ty))
    }

    fn create_child(&self, tree: &CodecTree, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let location = tree.types().location_of(ty)?;
        let SchemaLocation::Node(path) = &location else {
            return Err(CodecError::not_a_child(ty, &self.binding_type));
        };
        let schema = tree
            .schema()
            .node_at(path)
            .ok_or_else(|| CodecError::MissingSchema(path.to_string()))?;
        let table = self.table();
        let idx = table
            .by_qname(&schema.qname)
            .filter(|&i| table.entries[i].accepts(&schema))
            .or_else(|| table.entries.iter().position(|e| e.schema.is_equivalent(&schema)))
            .filter(|&i| table.entries[i].kind.is_structural())
            .ok_or_else(|| CodecError::not_a_child(ty, &self.binding_type))?;
        self.entry_node(tree, idx)
    }

    /// The node for an augmentation type declared on this node.
    pub fn augmentation(&self, tree: &CodecTree, ty: &BindingType) -> Result<Arc<CodecNode>> {
        load_or_create(&self.children, ty, || {
            let location = tree.types().location_of(ty)?;
            let SchemaLocation::Augmentation { target, identity } = &location else {
                return Err(CodecError::not_a_child(ty, &self.binding_type));
            };
            let table = self.table();
            let idx = table
                .augmentations
                .iter()
                .position(|a| a.id.names() == identity)
                .or_else(|| {
                    let declared = tree.schema().augmentation_at(target, identity)?;
                    table
                        .augmentations
                        .iter()
                        .position(|a| a.schema.is_equivalent(&declared))
                })
                .ok_or_else(|| CodecError::not_a_child(ty, &self.binding_type))?;
            self.augmentation_node(tree, idx)
        })
    }

    pub(crate) fn augmentation_by_id(&self, tree: &CodecTree, id: &AugmentationIdentifier) -> Result<Arc<CodecNode>> {
        let idx = self
            .table()
            .augmentation(id)
            .ok_or_else(|| CodecError::not_a_child(id, &self.binding_type))?;
        self.augmentation_node(tree, idx)
    }

    fn augmentation_node(&self, tree: &CodecTree, idx: usize) -> Result<Arc<CodecNode>> {
        let entry = &self.table().augmentations[idx];
        entry
            .node
            .get_or_try_init(|| {
                let location = SchemaLocation::Augmentation {
                    target: entry.schema.target.clone(),
                    identity: entry.id.names().clone(),
                };
                let ty = tree.types().type_at(&location)?;
                debug!(parent = %self.binding_type, augmentation = %ty, "created augmentation codec node");
                Ok(CodecNode::for_augmentation(ty, Arc::clone(&entry.schema)))
            })
            .cloned()
    }

    /// Resolves `ty` as a descendant, passing through choices and cases.
    ///
    /// The returned chain ends with the node for `ty`; any choice and case
    /// nodes crossed on the way precede it.
    pub(crate) fn path_child(&self, tree: &CodecTree, ty: &BindingType) -> Result<Vec<Arc<CodecNode>>> {
        match self.child(tree, ty) {
            Ok(node) => return Ok(vec![node]),
            Err(CodecError::NotAChild { .. }) => {}
            Err(e) => return Err(e),
        }
        let location = tree.types().location_of(ty)?;
        let route = match &location {
            SchemaLocation::Node(path) => path.last().and_then(|q| self.table().route(q)),
            SchemaLocation::Augmentation { .. } => None,
        };
        let Some(idx) = route else {
            return Err(CodecError::not_a_child(ty, &self.binding_type));
        };
        let via = self.entry_node(tree, idx)?;
        let mut chain = via.path_child(tree, ty)?;
        chain.insert(0, via);
        Ok(chain)
    }

    /// The case of this choice that declares a child named `qname`.
    pub(crate) fn case_for_child(&self, tree: &CodecTree, qname: &QName) -> Result<Arc<CodecNode>> {
        let idx = self
            .table()
            .route(qname)
            .ok_or_else(|| CodecError::not_a_child(qname, &self.binding_type))?;
        self.entry_node(tree, idx)
    }

    /// The structural child addressed by one generic path argument.
    ///
    /// `Ok(None)` means the argument addresses something without a typed
    /// object of its own, such as a leaf.
    pub(crate) fn child_by_argument(&self, tree: &CodecTree, arg: &PathArgument) -> Result<Option<Arc<CodecNode>>> {
        match arg {
            PathArgument::Augmentation(id) => self.augmentation_by_id(tree, id).map(Some),
            PathArgument::Node(qname) if self.kind == NodeKind::Choice => {
                self.case_for_child(tree, qname)?.child_by_argument(tree, arg)
            }
            PathArgument::Node(qname) => match self.table().by_qname(qname) {
                Some(idx) if self.table().entries[idx].kind.is_structural() => {
                    self.entry_node(tree, idx).map(Some)
                }
                Some(_) => Ok(None),
                None if !tree.schema().knows_namespace(qname) => {
                    Err(CodecError::MissingSchema(qname.to_string()))
                }
                None => Err(CodecError::not_a_child(qname, &self.binding_type)),
            },
            PathArgument::Entry(_) | PathArgument::Value(_) => Ok(None),
        }
    }

    /// Key codec of a keyed list.
    pub fn key_codec(&self, tree: &CodecTree) -> Result<Arc<KeyCodec>> {
        self.key_codec
            .get_or_try_init(|| {
                let schema = self
                    .schema_node()
                    .filter(|s| s.is_keyed_list())
                    .ok_or_else(|| CodecError::invalid_value(&self.binding_type, "not a keyed list"))?;
                let factory = tree.types().key_factory(&self.binding_type)?;
                let components = schema
                    .key()
                    .iter()
                    .map(|k| {
                        let idx = self
                            .table()
                            .by_qname(k)
                            .ok_or_else(|| CodecError::MissingSchema(k.to_string()))?;
                        Ok(KeyComponent {
                            qname: k.clone(),
                            local_name: k.local_name_arc(),
                            codec: self.leaf_codec(tree, idx)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                debug!(list = %self.binding_type, "built key codec");
                Ok(Arc::new(KeyCodec::new(schema.qname.clone(), components, factory)))
            })
            .cloned()
    }
}
