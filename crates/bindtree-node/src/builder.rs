//! Assembles immutable generic nodes from stream events.

use std::sync::Arc;

use bindtree_schema::QName;
use indexmap::IndexMap;

use crate::{
    AugmentationIdentifier, Children, GenericNode, NodeIdentifierWithPredicates, NodeStreamWriter,
    PathArgument, Scalar, TreeError,
};

#[derive(Debug)]
enum Open {
    Container {
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
    LeafSet {
        name: QName,
        ordered: bool,
        values: Vec<Scalar>,
    },
}

impl Open {
    fn kind(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::Choice { .. } => "choice",
            Self::Augmentation { .. } => "augmentation",
            Self::Map { .. } => "map",
            Self::MapEntry { .. } => "map-entry",
            Self::UnkeyedList { .. } => "unkeyed-list",
            Self::UnkeyedListEntry { .. } => "unkeyed-list-entry",
            Self::LeafSet { .. } => "leaf-set",
        }
    }

    fn close(self) -> GenericNode {
        match self {
            Self::Container { name, children } => GenericNode::Container { name, children },
            Self::Choice { name, children } => GenericNode::Choice { name, children },
            Self::Augmentation { id, children } => GenericNode::Augmentation { id, children },
            Self::Map {
                name,
                ordered,
                entries,
            } => GenericNode::Map {
                name,
                ordered,
                entries,
            },
            Self::MapEntry { id, children } => GenericNode::MapEntry { id, children },
            Self::UnkeyedList { name, entries } => GenericNode::UnkeyedList { name, entries },
            Self::UnkeyedListEntry { name, children } => {
                GenericNode::UnkeyedListEntry { name, children }
            }
            Self::LeafSet {
                name,
                ordered,
                values,
            } => GenericNode::LeafSet {
                name,
                ordered,
                values,
            },
        }
    }

    fn accept(&mut self, node: Arc<GenericNode>) -> Result<(), TreeError> {
        let parent = self.kind();
        match self {
            Self::Container { children, .. }
            | Self::Choice { children, .. }
            | Self::Augmentation { children, .. }
            | Self::MapEntry { children, .. }
            | Self::UnkeyedListEntry { children, .. } => match node.as_ref() {
                GenericNode::MapEntry { .. } | GenericNode::UnkeyedListEntry { .. } => {
                    Err(TreeError::ChildNotAllowed {
                        parent,
                        child: node.kind(),
                    })
                }
                _ => insert_unique(children, node),
            },
            Self::Map { entries, .. } => match node.as_ref() {
                GenericNode::MapEntry { id, .. } => {
                    if entries.contains_key(id) {
                        return Err(TreeError::DuplicateChild(id.to_string()));
                    }
                    entries.insert(id.clone(), node);
                    Ok(())
                }
                other => Err(TreeError::ChildNotAllowed {
                    parent,
                    child: other.kind(),
                }),
            },
            Self::UnkeyedList { entries, .. } => match node.as_ref() {
                GenericNode::UnkeyedListEntry { .. } => {
                    entries.push(node);
                    Ok(())
                }
                other => Err(TreeError::ChildNotAllowed {
                    parent,
                    child: other.kind(),
                }),
            },
            Self::LeafSet { .. } => Err(TreeError::ChildNotAllowed {
                parent,
                child: node.kind(),
            }),
        }
    }
}

fn insert_unique(children: &mut Children, node: Arc<GenericNode>) -> Result<(), TreeError> {
    let id = node.identifier();
    if children.contains_key(&id) {
        return Err(TreeError::DuplicateChild(id.to_string()));
    }
    children.insert(id, node);
    Ok(())
}

/// A [`NodeStreamWriter`] producing one immutable [`GenericNode`].
///
/// The first started (or added) node becomes the root; the result is
/// available from [`finish`](Self::finish) once every node is closed.
#[derive(Debug, Default)]
pub struct GenericTreeBuilder {
    stack: Vec<Open>,
    root: Option<Arc<GenericNode>>,
}

impl GenericTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn finish(self) -> Result<Arc<GenericNode>, TreeError> {
        if !self.stack.is_empty() {
            return Err(TreeError::Unclosed(self.stack.len()));
        }
        self.root.ok_or(TreeError::Empty)
    }

    fn open(&mut self, node: Open) -> Result<(), TreeError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(TreeError::MultipleRoots);
        }
        match (self.stack.last(), &node) {
            (Some(Open::Map { .. }), Open::MapEntry { .. })
            | (Some(Open::UnkeyedList { .. }), Open::UnkeyedListEntry { .. }) => {}
            (Some(parent @ (Open::Map { .. } | Open::UnkeyedList { .. } | Open::LeafSet { .. })), child)
            | (Some(parent), child @ (Open::MapEntry { .. } | Open::UnkeyedListEntry { .. })) => {
                return Err(TreeError::ChildNotAllowed {
                    parent: parent.kind(),
                    child: child.kind(),
                });
            }
            _ => {}
        }
        self.stack.push(node);
        Ok(())
    }

    fn emit(&mut self, node: Arc<GenericNode>) -> Result<(), TreeError> {
        match self.stack.last_mut() {
            Some(parent) => parent.accept(node),
            None => {
                if self.root.is_some() {
                    return Err(TreeError::MultipleRoots);
                }
                self.root = Some(node);
                Ok(())
            }
        }
    }
}

impl NodeStreamWriter for GenericTreeBuilder {
    fn start_container(&mut self, name: QName) -> Result<(), TreeError> {
        self.open(Open::Container {
            name,
            children: Children::new(),
        })
    }

    fn start_choice(&mut self, name: QName) -> Result<(), TreeError> {
        self.open(Open::Choice {
            name,
            children: Children::new(),
        })
    }

    fn start_augmentation(&mut self, id: AugmentationIdentifier) -> Result<(), TreeError> {
        self.open(Open::Augmentation {
            id,
            children: Children::new(),
        })
    }

    fn start_map(&mut self, name: QName, ordered: bool) -> Result<(), TreeError> {
        self.open(Open::Map {
            name,
            ordered,
            entries: IndexMap::new(),
        })
    }

    fn start_map_entry(&mut self, id: NodeIdentifierWithPredicates) -> Result<(), TreeError> {
        self.open(Open::MapEntry {
            id,
            children: Children::new(),
        })
    }

    fn start_unkeyed_list(&mut self, name: QName) -> Result<(), TreeError> {
        self.open(Open::UnkeyedList {
            name,
            entries: Vec::new(),
        })
    }

    fn start_unkeyed_list_item(&mut self) -> Result<(), TreeError> {
        let name = match self.stack.last() {
            Some(Open::UnkeyedList { name, .. }) => name.clone(),
            Some(other) => {
                return Err(TreeError::ChildNotAllowed {
                    parent: other.kind(),
                    child: "unkeyed-list-entry",
                })
            }
            None => {
                return Err(TreeError::ChildNotAllowed {
                    parent: "root",
                    child: "unkeyed-list-entry",
                })
            }
        };
        self.open(Open::UnkeyedListEntry {
            name,
            children: Children::new(),
        })
    }

    fn start_leaf_set(&mut self, name: QName, ordered: bool) -> Result<(), TreeError> {
        self.open(Open::LeafSet {
            name,
            ordered,
            values: Vec::new(),
        })
    }

    fn leaf_set_entry(&mut self, value: Scalar) -> Result<(), TreeError> {
        match self.stack.last_mut() {
            Some(Open::LeafSet { values, .. }) => {
                values.push(value);
                Ok(())
            }
            Some(other) => Err(TreeError::ChildNotAllowed {
                parent: other.kind(),
                child: "leaf-set-entry",
            }),
            None => Err(TreeError::ChildNotAllowed {
                parent: "root",
                child: "leaf-set-entry",
            }),
        }
    }

    fn leaf(&mut self, name: QName, value: Scalar) -> Result<(), TreeError> {
        self.emit(Arc::new(GenericNode::Leaf { name, value }))
    }

    fn add_child(&mut self, node: Arc<GenericNode>) -> Result<(), TreeError> {
        self.emit(node)
    }

    fn end_node(&mut self) -> Result<(), TreeError> {
        let open = self.stack.pop().ok_or(TreeError::UnbalancedEnd)?;
        self.emit(Arc::new(open.close()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPredicates;

    fn q(local: &str) -> QName {
        QName::new("urn:t", local)
    }

    #[test]
    fn builds_nested_tree() {
        let mut b = GenericTreeBuilder::new();
        b.start_container(q("top")).unwrap();
        b.start_map(q("list"), false).unwrap();
        let id = NodeIdentifierWithPredicates::new(
            q("list"),
            [(q("name"), Scalar::from("foo"))].into_iter().collect::<KeyPredicates>(),
        );
        b.start_map_entry(id.clone()).unwrap();
        b.leaf(q("name"), Scalar::from("foo")).unwrap();
        b.end_node().unwrap();
        b.end_node().unwrap();
        b.start_unkeyed_list(q("u")).unwrap();
        b.start_unkeyed_list_item().unwrap();
        b.leaf(q("x"), Scalar::from(1)).unwrap();
        b.end_node().unwrap();
        b.end_node().unwrap();
        b.start_leaf_set(q("tags"), true).unwrap();
        b.leaf_set_entry(Scalar::from("a")).unwrap();
        b.leaf_set_entry(Scalar::from("b")).unwrap();
        b.end_node().unwrap();
        b.end_node().unwrap();
        let root = b.finish().unwrap();

        let expected = GenericNode::container(
            q("top"),
            [
                GenericNode::map(
                    q("list"),
                    false,
                    [GenericNode::map_entry(id, [GenericNode::leaf(q("name"), "foo")])],
                ),
                GenericNode::unkeyed_list(
                    q("u"),
                    [GenericNode::unkeyed_entry(q("u"), [GenericNode::leaf(q("x"), 1)])],
                ),
                GenericNode::leaf_set(q("tags"), true, [Scalar::from("a"), Scalar::from("b")]),
            ],
        );
        assert_eq!(root, expected);
    }

    #[test]
    fn add_child_keeps_reference() {
        let shared = GenericNode::leaf(q("x"), "v");
        let mut b = GenericTreeBuilder::new();
        b.start_container(q("c")).unwrap();
        b.add_child(Arc::clone(&shared)).unwrap();
        b.end_node().unwrap();
        let root = b.finish().unwrap();
        let child = root.child(&PathArgument::Node(q("x"))).unwrap();
        assert!(Arc::ptr_eq(&child, &shared));
    }

    #[test]
    fn misuse_matrix() {
        let mut b = GenericTreeBuilder::new();
        assert_eq!(b.end_node(), Err(TreeError::UnbalancedEnd));

        let mut b = GenericTreeBuilder::new();
        b.start_container(q("c")).unwrap();
        assert!(matches!(
            b.start_unkeyed_list_item(),
            Err(TreeError::ChildNotAllowed { .. })
        ));
        b.leaf(q("x"), Scalar::Empty).unwrap();
        assert!(matches!(
            b.leaf(q("x"), Scalar::Empty),
            Err(TreeError::DuplicateChild(_))
        ));

        let mut b = GenericTreeBuilder::new();
        b.start_map(q("m"), false).unwrap();
        assert!(matches!(
            b.start_container(q("c")),
            Err(TreeError::ChildNotAllowed { .. })
        ));
        assert_eq!(b.finish(), Err(TreeError::Unclosed(1)));

        let mut b = GenericTreeBuilder::new();
        b.leaf(q("a"), Scalar::Empty).unwrap();
        assert_eq!(b.leaf(q("b"), Scalar::Empty), Err(TreeError::MultipleRoots));
        assert_eq!(GenericTreeBuilder::new().finish(), Err(TreeError::Empty));
    }
}
