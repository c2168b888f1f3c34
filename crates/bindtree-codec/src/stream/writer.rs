//! Typed stream events translated into generic stream events.

use std::sync::Arc;

use bindtree_node::{GenericNode, NodeStreamWriter};
use bindtree_schema::QName;

use crate::binding::{BindingType, KeyHolder, TypedValue};
use crate::error::{CodecError, Result};
use crate::node::{ChildKind, CodecNode, NodeKind};
use crate::tree::CodecTree;
use crate::value::ValueCodec;

#[derive(Debug)]
enum Frame {
    /// An object with leaves and children: container, list entry, case,
    /// augmentation, notification or rpc payload.
    Data(Arc<CodecNode>),
    Choice(Arc<CodecNode>),
    /// An open list waiting for entries.
    List(Arc<CodecNode>),
    LeafSet(Arc<ValueCodec>),
}

impl Frame {
    fn describe(&self) -> String {
        match self {
            Self::Data(n) => format!("{} {}", kind_name(n.kind()), n.binding_type()),
            Self::Choice(n) => format!("choice {}", n.binding_type()),
            Self::List(n) => format!("list {}", n.binding_type()),
            Self::LeafSet(_) => "leaf-list".to_owned(),
        }
    }

    fn node(&self) -> Option<&Arc<CodecNode>> {
        match self {
            Self::Data(n) | Self::Choice(n) | Self::List(n) => Some(n),
            Self::LeafSet(_) => None,
        }
    }
}

/// Where a writer opened with [`BindingStreamWriter::within`] starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Among the children of an object: a container, case, augmentation or
    /// a single list entry.
    Children,
    /// Among the entries of a list.
    Entries,
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Container => "container",
        NodeKind::Notification => "notification",
        NodeKind::RpcInput => "rpc input",
        NodeKind::RpcOutput => "rpc output",
        NodeKind::List => "list entry",
        NodeKind::Choice => "choice",
        NodeKind::Case => "case",
        NodeKind::Augmentation => "augmentation",
    }
}

fn node_name(node: &CodecNode) -> Result<QName> {
    node.qname()
        .cloned()
        .ok_or_else(|| CodecError::Nesting(format!("{} has no name", node.binding_type())))
}

/// Accepts typed-tree events, keeps a stack of open codec nodes and forwards
/// the equivalent generic events to `sink`.
///
/// Every `start_*` is balanced by one [`end`](Self::end). Case frames produce
/// no generic event of their own.
pub struct BindingStreamWriter<'a, W: NodeStreamWriter + ?Sized> {
    tree: &'a CodecTree,
    sink: &'a mut W,
    stack: Vec<Frame>,
    base: usize,
}

impl<'a, W: NodeStreamWriter + ?Sized> BindingStreamWriter<'a, W> {
    /// A writer positioned at the root of the data tree.
    pub fn new(tree: &'a CodecTree, sink: &'a mut W) -> Self {
        Self {
            tree,
            sink,
            stack: Vec::new(),
            base: 0,
        }
    }

    /// A writer positioned inside `parent`. With [`Position::Entries`] the
    /// first event starts an entry of the list `parent`; otherwise it
    /// describes one of `parent`'s children.
    pub fn within(tree: &'a CodecTree, parent: Arc<CodecNode>, position: Position, sink: &'a mut W) -> Self {
        let frame = match (position, parent.kind()) {
            (Position::Entries, _) => Frame::List(parent),
            (Position::Children, NodeKind::Choice) => Frame::Choice(parent),
            (Position::Children, _) => Frame::Data(parent),
        };
        Self {
            tree,
            sink,
            stack: vec![frame],
            base: 1,
        }
    }

    /// The codec node of the innermost open frame.
    pub fn current(&self) -> Option<&Arc<CodecNode>> {
        self.stack.last().and_then(Frame::node)
    }

    pub fn depth(&self) -> usize {
        self.stack.len() - self.base
    }

    fn data_parent(&self, event: &str) -> Result<Option<&Arc<CodecNode>>> {
        match self.stack.last() {
            None => Ok(None),
            Some(Frame::Data(n)) => Ok(Some(n)),
            Some(other) => Err(CodecError::Nesting(format!(
                "{event} inside {}",
                other.describe()
            ))),
        }
    }

    fn child(&self, ty: &BindingType, event: &str) -> Result<Arc<CodecNode>> {
        match self.data_parent(event)? {
            None => self.tree.root_child(ty),
            Some(parent) => parent.child(self.tree, ty),
        }
    }

    pub fn start_container(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let node = self.child(ty, "container")?;
        match node.kind() {
            NodeKind::Container | NodeKind::Notification | NodeKind::RpcInput | NodeKind::RpcOutput => {}
            other => {
                return Err(CodecError::Nesting(format!(
                    "{ty} is a {}, not a container",
                    kind_name(other)
                )))
            }
        }
        self.sink.start_container(node_name(&node)?)?;
        self.stack.push(Frame::Data(Arc::clone(&node)));
        Ok(node)
    }

    pub fn start_choice(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let node = self.child(ty, "choice")?;
        if node.kind() != NodeKind::Choice {
            return Err(CodecError::Nesting(format!("{ty} is not a choice")));
        }
        self.sink.start_choice(node_name(&node)?)?;
        self.stack.push(Frame::Choice(Arc::clone(&node)));
        Ok(node)
    }

    pub fn start_case(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let Some(Frame::Choice(choice)) = self.stack.last() else {
            return Err(CodecError::Nesting(format!("case {ty} without an open choice")));
        };
        let case = choice.child(self.tree, ty)?;
        self.stack.push(Frame::Data(Arc::clone(&case)));
        Ok(case)
    }

    pub fn start_augmentation(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let parent = match self.stack.last() {
            Some(Frame::Data(n)) if n.kind() != NodeKind::Augmentation => Arc::clone(n),
            Some(other) => {
                return Err(CodecError::Nesting(format!(
                    "augmentation {ty} inside {}",
                    other.describe()
                )))
            }
            None => {
                return Err(CodecError::Nesting(format!(
                    "augmentation {ty} at the root"
                )))
            }
        };
        let node = parent.augmentation(self.tree, ty).map_err(|e| match e {
            CodecError::NotAChild { .. } => CodecError::Nesting(format!(
                "augmentation {ty} is not declared by {}",
                parent.binding_type()
            )),
            other => other,
        })?;
        let Some(bindtree_node::PathArgument::Augmentation(id)) = node.identifier() else {
            return Err(CodecError::Nesting(format!("{ty} is not an augmentation")));
        };
        self.sink.start_augmentation(id.clone())?;
        self.stack.push(Frame::Data(Arc::clone(&node)));
        Ok(node)
    }

    pub fn start_map(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let node = self.child(ty, "list")?;
        if node.kind() != NodeKind::List || !node.is_keyed_list() {
            return Err(CodecError::Nesting(format!("{ty} is not a keyed list")));
        }
        self.sink
            .start_map(node_name(&node)?, node.is_ordered_by_user())?;
        self.stack.push(Frame::List(Arc::clone(&node)));
        Ok(node)
    }

    pub fn start_unkeyed_list(&mut self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let node = self.child(ty, "list")?;
        if node.kind() != NodeKind::List || node.is_keyed_list() {
            return Err(CodecError::Nesting(format!("{ty} is not an unkeyed list")));
        }
        self.sink.start_unkeyed_list(node_name(&node)?)?;
        self.stack.push(Frame::List(Arc::clone(&node)));
        Ok(node)
    }

    pub fn start_map_entry(&mut self, key: &dyn KeyHolder) -> Result<Arc<CodecNode>> {
        let list = match self.stack.last() {
            Some(Frame::List(n)) if n.is_keyed_list() => Arc::clone(n),
            other => {
                return Err(CodecError::Nesting(format!(
                    "keyed entry outside a keyed list ({})",
                    other.map_or_else(|| "root".to_owned(), Frame::describe)
                )))
            }
        };
        let id = list.key_codec(self.tree)?.serialize(self.tree, key)?;
        self.sink.start_map_entry(id)?;
        self.stack.push(Frame::Data(Arc::clone(&list)));
        Ok(list)
    }

    pub fn start_unkeyed_list_item(&mut self) -> Result<Arc<CodecNode>> {
        let list = match self.stack.last() {
            Some(Frame::List(n)) if !n.is_keyed_list() => Arc::clone(n),
            other => {
                return Err(CodecError::Nesting(format!(
                    "list item outside an unkeyed list ({})",
                    other.map_or_else(|| "root".to_owned(), Frame::describe)
                )))
            }
        };
        self.sink.start_unkeyed_list_item()?;
        self.stack.push(Frame::Data(Arc::clone(&list)));
        Ok(list)
    }

    /// Starts an entry of the open list, keyed or not.
    pub fn start_entry(&mut self, key: Option<&dyn KeyHolder>) -> Result<Arc<CodecNode>> {
        let keyed = match self.stack.last() {
            Some(Frame::List(n)) => n.is_keyed_list(),
            _ => false,
        };
        match (keyed, key) {
            (true, Some(key)) => self.start_map_entry(key),
            (true, None) => {
                let Some(Frame::List(list)) = self.stack.last() else {
                    return Err(CodecError::Nesting("entry outside a list".to_owned()));
                };
                let codec = list.key_codec(self.tree)?;
                let component = codec.component_names().next().cloned();
                Err(match component {
                    Some(component) => CodecError::IncompleteKey {
                        list: codec.list().clone(),
                        component,
                    },
                    None => CodecError::Nesting(format!("{} has no key", list.binding_type())),
                })
            }
            (false, _) => self.start_unkeyed_list_item(),
        }
    }

    fn leaf_entry(&self, name: &str, expected: ChildKind) -> Result<(Arc<CodecNode>, usize)> {
        let parent = self
            .data_parent("leaf")?
            .ok_or_else(|| CodecError::Nesting(format!("leaf {name} at the root")))?;
        let idx = parent
            .table()
            .by_local(name)
            .filter(|&i| parent.entries()[i].kind() == expected)
            .ok_or_else(|| CodecError::not_a_child(name, parent.binding_type()))?;
        Ok((Arc::clone(parent), idx))
    }

    pub fn leaf(&mut self, name: &str, value: &TypedValue) -> Result<()> {
        let (parent, idx) = self.leaf_entry(name, ChildKind::Leaf)?;
        let codec = parent.leaf_codec(self.tree, idx)?;
        let scalar = codec.serialize(self.tree, value)?;
        self.sink
            .leaf(parent.entries()[idx].qname().clone(), scalar)?;
        Ok(())
    }

    pub fn start_leaf_set(&mut self, name: &str) -> Result<()> {
        let (parent, idx) = self.leaf_entry(name, ChildKind::LeafList)?;
        let codec = parent.leaf_codec(self.tree, idx)?;
        let entry = &parent.entries()[idx];
        self.sink
            .start_leaf_set(entry.qname().clone(), entry.schema().is_ordered_by_user())?;
        self.stack.push(Frame::LeafSet(codec));
        Ok(())
    }

    pub fn leaf_set_entry(&mut self, value: &TypedValue) -> Result<()> {
        let Some(Frame::LeafSet(codec)) = self.stack.last() else {
            return Err(CodecError::Nesting("leaf-list entry outside a leaf-list".to_owned()));
        };
        let scalar = codec.serialize(self.tree, value)?;
        self.sink.leaf_set_entry(scalar)?;
        Ok(())
    }

    /// Splices a previously encoded subtree in place of its events.
    pub fn add_cached(&mut self, node: Arc<GenericNode>) -> Result<()> {
        self.sink.add_child(node)?;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        if self.stack.len() == self.base {
            return Err(CodecError::Nesting("end without a matching start".to_owned()));
        }
        match self.stack.pop() {
            Some(Frame::Data(n)) if n.kind() == NodeKind::Case => Ok(()),
            _ => Ok(self.sink.end_node()?),
        }
    }

    /// Checks that every started node was ended.
    pub fn finish(self) -> Result<()> {
        match self.depth() {
            0 => Ok(()),
            open => Err(CodecError::Nesting(format!("{open} nodes left open"))),
        }
    }
}
