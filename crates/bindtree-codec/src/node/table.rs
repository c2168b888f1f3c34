//! Per-node child tables, built once on first use.

use std::collections::HashMap;
use std::sync::Arc;

use bindtree_node::AugmentationIdentifier;
use bindtree_schema::{AugmentationSchema, QName, SchemaKind, SchemaNode};
use once_cell::sync::OnceCell;

use super::CodecNode;
use crate::value::ValueCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Leaf,
    LeafList,
    Container,
    List,
    Choice,
    Case,
}

impl ChildKind {
    fn of(kind: &SchemaKind) -> Option<Self> {
        Some(match kind {
            SchemaKind::Leaf { .. } => Self::Leaf,
            SchemaKind::LeafList { .. } => Self::LeafList,
            SchemaKind::Container { .. } => Self::Container,
            SchemaKind::List { .. } => Self::List,
            SchemaKind::Choice => Self::Choice,
            SchemaKind::Case => Self::Case,
            _ => return None,
        })
    }

    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Leaf | Self::LeafList)
    }
}

/// One declared child, with its codec slots.
#[derive(Debug)]
pub struct ChildEntry {
    pub(crate) schema: Arc<SchemaNode>,
    pub(crate) kind: ChildKind,
    pub(crate) local_name: Arc<str>,
    pub(crate) value: OnceCell<Arc<ValueCodec>>,
    pub(crate) node: OnceCell<Arc<CodecNode>>,
}

impl ChildEntry {
    pub fn qname(&self) -> &QName {
        &self.schema.qname
    }

    pub fn kind(&self) -> ChildKind {
        self.kind
    }

    pub fn local_name(&self) -> &Arc<str> {
        &self.local_name
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// Same schema element, or one of the same kind under the same name.
    pub(crate) fn accepts(&self, schema: &SchemaNode) -> bool {
        self.schema.is_equivalent(schema)
            || (self.schema.qname == schema.qname
                && std::mem::discriminant(&self.schema.kind) == std::mem::discriminant(&schema.kind))
    }
}

#[derive(Debug)]
pub(crate) struct AugmentationEntry {
    pub schema: Arc<AugmentationSchema>,
    pub id: AugmentationIdentifier,
    pub node: OnceCell<Arc<CodecNode>>,
}

#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    pub entries: Vec<ChildEntry>,
    by_qname: HashMap<QName, usize>,
    by_local: HashMap<Arc<str>, usize>,
    /// Names reachable only through a choice (or, in a choice, through a
    /// case), mapped to the entry leading to them.
    routes: HashMap<QName, usize>,
    pub augmentations: Vec<AugmentationEntry>,
}

impl NodeTable {
    pub fn build(children: &[Arc<SchemaNode>], augmentations: &[Arc<AugmentationSchema>]) -> Self {
        let mut table = Self::default();
        for child in children {
            let Some(kind) = ChildKind::of(&child.kind) else {
                continue;
            };
            let idx = table.entries.len();
            table.by_qname.insert(child.qname.clone(), idx);
            table.by_local.insert(child.qname.local_name_arc(), idx);
            table.entries.push(ChildEntry {
                schema: Arc::clone(child),
                kind,
                local_name: child.qname.local_name_arc(),
                value: OnceCell::new(),
                node: OnceCell::new(),
            });
        }
        for (idx, entry) in table.entries.iter().enumerate() {
            let mut names = Vec::new();
            match entry.kind {
                ChildKind::Choice => choice_descendants(&entry.schema, &mut names),
                ChildKind::Case => case_descendants(&entry.schema, &mut names),
                _ => continue,
            }
            for name in names {
                table.routes.entry(name).or_insert(idx);
            }
        }
        table.augmentations = augmentations
            .iter()
            .map(|aug| AugmentationEntry {
                schema: Arc::clone(aug),
                id: AugmentationIdentifier::new(aug.identity()),
                node: OnceCell::new(),
            })
            .collect();
        table
    }

    pub fn by_qname(&self, qname: &QName) -> Option<usize> {
        self.by_qname.get(qname).copied()
    }

    pub fn by_local(&self, name: &str) -> Option<usize> {
        self.by_local.get(name).copied()
    }

    pub fn route(&self, qname: &QName) -> Option<usize> {
        self.routes.get(qname).copied()
    }

    pub fn augmentation(&self, id: &AugmentationIdentifier) -> Option<usize> {
        self.augmentations.iter().position(|a| &a.id == id)
    }
}

fn choice_descendants(choice: &SchemaNode, out: &mut Vec<QName>) {
    for case in &choice.children {
        case_descendants(case, out);
    }
}

fn case_descendants(case: &SchemaNode, out: &mut Vec<QName>) {
    for child in &case.children {
        out.push(child.qname.clone());
        if child.kind == SchemaKind::Choice {
            choice_descendants(child, out);
        }
    }
}
