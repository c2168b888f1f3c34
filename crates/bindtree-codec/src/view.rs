//! Lazily decoded typed-tree objects backed by generic nodes.

use std::fmt;
use std::sync::Arc;

use bindtree_node::{GenericNode, PathArgument};
use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::binding::{BindingType, BindingValue, DataObject, KeyHolder};
use crate::error::{CodecError, Result};
use crate::node::{ChildEntry, ChildKind, CodecNode};
use crate::tree::CodecTree;

/// A typed object whose attributes are decoded from `data` on first access
/// and remembered afterwards.
///
/// For a case, `data` is the generic choice node holding the case's children.
pub struct LazyDataObject {
    tree: Arc<CodecTree>,
    node: Arc<CodecNode>,
    data: Arc<GenericNode>,
    values: DashMap<Arc<str>, Option<BindingValue>>,
    key: OnceCell<Option<Arc<dyn KeyHolder>>>,
}

impl fmt::Debug for LazyDataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyDataObject")
            .field("type", self.node.binding_type())
            .field("data", &self.data.identifier())
            .finish()
    }
}

impl LazyDataObject {
    pub(crate) fn wrap(tree: Arc<CodecTree>, node: Arc<CodecNode>, data: Arc<GenericNode>) -> Arc<dyn DataObject> {
        Arc::new(Self {
            tree,
            node,
            data,
            values: DashMap::new(),
            key: OnceCell::new(),
        })
    }

    /// The generic node this view reads from.
    pub fn data(&self) -> &Arc<GenericNode> {
        &self.data
    }

    fn view(&self, node: Arc<CodecNode>, data: Arc<GenericNode>) -> Arc<dyn DataObject> {
        Self::wrap(Arc::clone(&self.tree), node, data)
    }

    fn decode_attribute(&self, name: &str) -> Result<Option<BindingValue>> {
        let idx = self
            .node
            .table()
            .by_local(name)
            .ok_or_else(|| CodecError::not_a_child(name, self.node.binding_type()))?;
        let entry = &self.node.entries()[idx];
        let Some(child) = self.data.child(&PathArgument::Node(entry.qname().clone())) else {
            return Ok(None);
        };
        let tree = &*self.tree;

        let value = match entry.kind() {
            ChildKind::Leaf => {
                let scalar = child.value().ok_or_else(|| mismatch(entry, &child))?;
                BindingValue::Leaf(self.node.leaf_codec(tree, idx)?.deserialize(tree, scalar)?)
            }
            ChildKind::LeafList => {
                let scalars = child.values().ok_or_else(|| mismatch(entry, &child))?;
                let codec = self.node.leaf_codec(tree, idx)?;
                BindingValue::LeafList(
                    scalars
                        .iter()
                        .map(|s| codec.deserialize(tree, s))
                        .collect::<Result<_>>()?,
                )
            }
            ChildKind::Container => {
                if !matches!(*child, GenericNode::Container { .. }) {
                    return Err(mismatch(entry, &child));
                }
                BindingValue::Container(self.view(self.node.entry_node(tree, idx)?, child))
            }
            ChildKind::List => {
                if !matches!(*child, GenericNode::Map { .. } | GenericNode::UnkeyedList { .. }) {
                    return Err(mismatch(entry, &child));
                }
                let list = self.node.entry_node(tree, idx)?;
                BindingValue::List(
                    child
                        .entries()
                        .into_iter()
                        .map(|e| self.view(Arc::clone(&list), e))
                        .collect(),
                )
            }
            ChildKind::Choice => {
                // Augmentations of the case carry no name to select it by.
                let selector = match &*child {
                    GenericNode::Choice { children, .. } => children.keys().find_map(|arg| match arg {
                        PathArgument::Node(qname) => Some(qname.clone()),
                        _ => None,
                    }),
                    _ => return Err(mismatch(entry, &child)),
                };
                let Some(selector) = selector else {
                    return Ok(None);
                };
                let case = self.node.entry_node(tree, idx)?.case_for_child(tree, &selector)?;
                BindingValue::Choice(self.view(case, child))
            }
            ChildKind::Case => return Err(mismatch(entry, &child)),
        };
        Ok(Some(value))
    }
}

fn mismatch(entry: &ChildEntry, found: &GenericNode) -> CodecError {
    CodecError::invalid_value(
        entry.qname(),
        format!("declared {:?} but found a {}", entry.kind(), found.kind()),
    )
}

impl DataObject for LazyDataObject {
    fn implemented_type(&self) -> &BindingType {
        self.node.binding_type()
    }

    fn attribute(&self, name: &str) -> Result<Option<BindingValue>> {
        if let Some(memo) = self.values.get(name) {
            return Ok(memo.value().clone());
        }
        let value = self.decode_attribute(name)?;
        self.values.insert(Arc::from(name), value.clone());
        Ok(value)
    }

    fn attribute_names(&self) -> Vec<Arc<str>> {
        self.node
            .entries()
            .iter()
            .filter(|e| {
                self.data
                    .child(&PathArgument::Node(e.qname().clone()))
                    .is_some()
            })
            .map(|e| Arc::clone(e.local_name()))
            .collect()
    }

    fn key(&self) -> Result<Option<Arc<dyn KeyHolder>>> {
        self.key
            .get_or_try_init(|| match &*self.data {
                GenericNode::MapEntry { id, .. } => {
                    let tree = &*self.tree;
                    Ok(Some(self.node.key_codec(tree)?.deserialize(tree, id)?))
                }
                _ => Ok(None),
            })
            .cloned()
    }

    fn augmentations(&self) -> Result<Vec<Arc<dyn DataObject>>> {
        let Some(children) = self.data.children() else {
            return Ok(Vec::new());
        };
        children
            .iter()
            .filter_map(|(arg, child)| match arg {
                PathArgument::Augmentation(id) => Some((id, child)),
                _ => None,
            })
            .map(|(id, child)| {
                let node = self.node.augmentation_by_id(&self.tree, id)?;
                Ok(self.view(node, Arc::clone(child)))
            })
            .collect()
    }

    fn augmentation(&self, ty: &BindingType) -> Result<Option<Arc<dyn DataObject>>> {
        let node = self.node.augmentation(&self.tree, ty)?;
        let Some(id) = node.identifier() else {
            return Ok(None);
        };
        Ok(self.data.child(id).map(|child| self.view(node, child)))
    }
}
