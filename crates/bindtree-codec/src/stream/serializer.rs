//! Walks typed-tree objects in schema order, driving a [`BindingStreamWriter`].

use std::sync::Arc;

use bindtree_node::{GenericNode, GenericTreeBuilder, NodeStreamWriter};

use super::{BindingStreamWriter, Position};
use crate::binding::{BindingValue, DataObject};
use crate::cache::SubtreeCaches;
use crate::error::{CodecError, Result};
use crate::node::{ChildKind, CodecNode, NodeKind};
use crate::tree::CodecTree;

/// How an object is entered in the generic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enclosure {
    Container,
    Entry,
    Augmentation,
}

impl Enclosure {
    pub(crate) fn for_node(node: &CodecNode) -> Self {
        match node.kind() {
            NodeKind::List => Self::Entry,
            NodeKind::Augmentation => Self::Augmentation,
            _ => Self::Container,
        }
    }

    /// The writer position the enclosing start event is written from.
    pub(crate) fn position(self) -> Position {
        match self {
            Self::Entry => Position::Entries,
            Self::Container | Self::Augmentation => Position::Children,
        }
    }
}

pub(crate) struct DataObjectSerializer<'t> {
    tree: &'t CodecTree,
    caches: Option<&'t SubtreeCaches>,
}

impl<'t> DataObjectSerializer<'t> {
    pub(crate) fn new(tree: &'t CodecTree, caches: Option<&'t SubtreeCaches>) -> Self {
        Self { tree, caches }
    }

    /// Writes `obj` as a child of the writer's current position, reusing a
    /// cached subtree when its type is memoized.
    pub(crate) fn write_object<W>(
        &self,
        enclosure: Enclosure,
        obj: &Arc<dyn DataObject>,
        w: &mut BindingStreamWriter<'_, W>,
    ) -> Result<()>
    where
        W: NodeStreamWriter + ?Sized,
    {
        let cache = self
            .caches
            .and_then(|caches| caches.get(obj.implemented_type()));
        match cache {
            Some(cache) => {
                let parent = w.current().cloned();
                let node = cache.get_or_encode(obj, || self.encode_standalone(enclosure, parent, obj))?;
                w.add_cached(node)
            }
            None => self.write_enclosed(enclosure, obj, w),
        }
    }

    fn write_enclosed<W>(
        &self,
        enclosure: Enclosure,
        obj: &Arc<dyn DataObject>,
        w: &mut BindingStreamWriter<'_, W>,
    ) -> Result<()>
    where
        W: NodeStreamWriter + ?Sized,
    {
        let ty = obj.implemented_type();
        let node = match enclosure {
            Enclosure::Container => w.start_container(ty)?,
            Enclosure::Augmentation => w.start_augmentation(ty)?,
            Enclosure::Entry => {
                let key = obj.key()?;
                w.start_entry(key.as_deref())?
            }
        };
        self.write_body(&node, &**obj, w)?;
        w.end()
    }

    /// Encodes one object on its own, so the result can be shared.
    fn encode_standalone(
        &self,
        enclosure: Enclosure,
        parent: Option<Arc<CodecNode>>,
        obj: &Arc<dyn DataObject>,
    ) -> Result<Arc<GenericNode>> {
        let mut builder = GenericTreeBuilder::new();
        let mut w = match parent {
            Some(parent) => BindingStreamWriter::within(self.tree, parent, enclosure.position(), &mut builder),
            None => BindingStreamWriter::new(self.tree, &mut builder),
        };
        self.write_enclosed(enclosure, obj, &mut w)?;
        w.finish()?;
        Ok(builder.finish()?)
    }

    /// Emits the children of `obj` in schema declaration order, followed by
    /// its augmentations. The enclosing start and end events are the
    /// caller's.
    pub(crate) fn write_body<W>(
        &self,
        node: &Arc<CodecNode>,
        obj: &dyn DataObject,
        w: &mut BindingStreamWriter<'_, W>,
    ) -> Result<()>
    where
        W: NodeStreamWriter + ?Sized,
    {
        for (idx, entry) in node.entries().iter().enumerate() {
            let Some(value) = obj.attribute(entry.local_name())? else {
                continue;
            };
            if value.is_vacant() {
                continue;
            }
            match (entry.kind(), value) {
                (ChildKind::Leaf, BindingValue::Leaf(v)) => w.leaf(entry.local_name(), &v)?,
                (ChildKind::LeafList, BindingValue::LeafList(values)) => {
                    w.start_leaf_set(entry.local_name())?;
                    for v in &values {
                        w.leaf_set_entry(v)?;
                    }
                    w.end()?;
                }
                (ChildKind::Container, BindingValue::Container(child)) => {
                    self.write_object(Enclosure::Container, &child, w)?;
                }
                (ChildKind::List, BindingValue::List(entries)) => {
                    let list = node.entry_node(self.tree, idx)?;
                    if list.is_keyed_list() {
                        w.start_map(list.binding_type())?;
                    } else {
                        w.start_unkeyed_list(list.binding_type())?;
                    }
                    for e in &entries {
                        self.write_object(Enclosure::Entry, e, w)?;
                    }
                    w.end()?;
                }
                (ChildKind::Choice, BindingValue::Choice(case)) => {
                    let choice = node.entry_node(self.tree, idx)?;
                    w.start_choice(choice.binding_type())?;
                    let case_node = w.start_case(case.implemented_type())?;
                    self.write_body(&case_node, &*case, w)?;
                    w.end()?;
                    w.end()?;
                }
                (kind, value) => {
                    return Err(CodecError::invalid_value(
                        entry.qname(),
                        format!("{} value where a {kind:?} is declared", value.kind()),
                    ))
                }
            }
        }
        for aug in obj.augmentations()? {
            self.write_object(Enclosure::Augmentation, &aug, w)?;
        }
        Ok(())
    }
}
