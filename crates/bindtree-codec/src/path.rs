//! Typed paths to generic paths and back.

use std::sync::Arc;

use bindtree_node::{GenericPath, PathArgument};
use bindtree_schema::SchemaLocation;

use crate::binding::{InstanceIdentifier, PathStep};
use crate::error::{CodecError, Result};
use crate::node::{CodecNode, NodeKind};
use crate::tree::CodecTree;

/// A generic path produced from a typed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPath {
    pub path: GenericPath,
    /// Some list step carried no key, so the path addresses every entry.
    pub wildcarded: bool,
}

/// The codec node a typed path ends at, and where its object is written.
#[derive(Debug, Clone)]
pub(crate) struct PathTarget {
    pub node: Arc<CodecNode>,
    /// The node the target's object is written into; `None` at the root.
    pub parent: Option<Arc<CodecNode>>,
}

pub(crate) struct PathCodec<'t> {
    tree: &'t CodecTree,
}

fn identifier_of(node: &CodecNode) -> Result<PathArgument> {
    node.identifier()
        .cloned()
        .ok_or_else(|| CodecError::InvalidPath(format!("{} has no generic identifier", node.binding_type())))
}

impl<'t> PathCodec<'t> {
    pub(crate) fn new(tree: &'t CodecTree) -> Self {
        Self { tree }
    }

    pub(crate) fn encode(&self, path: &InstanceIdentifier) -> Result<(EncodedPath, PathTarget)> {
        let tree = self.tree;
        let mut out = GenericPath::empty();
        let mut wildcarded = false;
        let mut target: Option<PathTarget> = None;

        for step in path.steps() {
            let ty = step.ty();
            let current = target.as_ref().map(|t| Arc::clone(&t.node));
            let chain = match &current {
                None => vec![tree.root_child(ty)?],
                Some(node) => match tree.types().location_of(ty)? {
                    SchemaLocation::Augmentation { .. } => vec![node.augmentation(tree, ty)?],
                    SchemaLocation::Node(_) => node.path_child(tree, ty)?,
                },
            };
            let Some((node, via)) = chain.split_last() else {
                return Err(CodecError::not_a_child(ty, "path"));
            };

            let mut parent = current;
            for n in via {
                if let Some(id) = n.identifier() {
                    out.push(id.clone());
                }
                parent = Some(Arc::clone(n));
            }

            match (node.kind(), step) {
                (NodeKind::List, PathStep::Keyed { key, .. }) => {
                    if !node.is_keyed_list() {
                        return Err(CodecError::InvalidPath(format!("{ty} is not a keyed list")));
                    }
                    out.push(identifier_of(node)?);
                    let id = node.key_codec(tree)?.serialize(tree, &**key)?;
                    out.push(PathArgument::Entry(id));
                }
                (NodeKind::List, PathStep::Item(_)) => {
                    out.push(identifier_of(node)?);
                    wildcarded = true;
                }
                (_, PathStep::Keyed { .. }) => {
                    return Err(CodecError::InvalidPath(format!("{ty} is not a list but has a key")));
                }
                (_, PathStep::Item(_)) => out.push(identifier_of(node)?),
            }

            target = Some(PathTarget {
                node: Arc::clone(node),
                parent,
            });
        }

        let target = target.ok_or_else(|| CodecError::InvalidPath("empty path".to_owned()))?;
        Ok((
            EncodedPath {
                path: out,
                wildcarded,
            },
            target,
        ))
    }

    /// `Ok(None)` when the generic path has no typed equivalent: it ends at
    /// a leaf, a choice, or a keyed list without an entry.
    pub(crate) fn decode(&self, path: &GenericPath) -> Result<Option<(InstanceIdentifier, Arc<CodecNode>)>> {
        let tree = self.tree;
        let args = path.arguments();
        let mut steps = Vec::new();
        let mut current: Option<Arc<CodecNode>> = None;
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let node = match &current {
                None => match arg {
                    PathArgument::Node(qname) => tree.root_by_qname(qname)?,
                    other => {
                        return Err(CodecError::InvalidPath(format!("{other} cannot start a path")))
                    }
                },
                Some(parent) => match parent.child_by_argument(tree, arg)? {
                    Some(node) => node,
                    None => return Ok(None),
                },
            };
            i += 1;

            let ty = node.binding_type().clone();
            match node.kind() {
                NodeKind::Choice if i == args.len() => return Ok(None),
                NodeKind::Choice => {}
                NodeKind::List => match args.get(i) {
                    Some(PathArgument::Entry(id)) => {
                        let key = node.key_codec(tree)?.deserialize(tree, id)?;
                        steps.push(PathStep::Keyed { ty, key });
                        i += 1;
                    }
                    None if node.is_keyed_list() => return Ok(None),
                    _ => steps.push(PathStep::Item(ty)),
                },
                _ => steps.push(PathStep::Item(ty)),
            }
            current = Some(node);
        }

        match current {
            Some(node) => Ok(Some((InstanceIdentifier::new(steps), node))),
            None => Err(CodecError::InvalidPath("empty path".to_owned())),
        }
    }
}
