//! Fluent construction of schema contexts.
//!
//! Nodes are assembled as mutable builders, augmentations are attached to
//! their targets, and the whole tree is then frozen into shared immutable
//! [`SchemaNode`]s with absolute paths filled in.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    AugmentationSchema, IdentitySchema, ModuleInfo, QName, SchemaContext, SchemaError, SchemaKind,
    SchemaNode, SchemaPath, TypeDefinition,
};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct SchemaNodeBuilder {
    qname: QName,
    kind: SchemaKind,
    origin: Option<SchemaPath>,
    children: Vec<SchemaNodeBuilder>,
    augmentations: Vec<AugmentationBuilder>,
}

impl SchemaNodeBuilder {
    fn new(qname: QName, kind: SchemaKind) -> Self {
        Self {
            qname,
            kind,
            origin: None,
            children: Vec::new(),
            augmentations: Vec::new(),
        }
    }

    pub fn container(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Container { presence: false })
    }

    pub fn presence_container(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Container { presence: true })
    }

    pub fn list<I>(qname: QName, key: I) -> Self
    where
        I: IntoIterator<Item = QName>,
    {
        Self::new(
            qname,
            SchemaKind::List {
                key: key.into_iter().collect(),
                ordered_by_user: false,
            },
        )
    }

    pub fn unkeyed_list(qname: QName) -> Self {
        Self::list(qname, [])
    }

    pub fn leaf(qname: QName, ty: TypeDefinition) -> Self {
        Self::new(qname, SchemaKind::Leaf { ty })
    }

    pub fn leaf_list(qname: QName, ty: TypeDefinition) -> Self {
        Self::new(
            qname,
            SchemaKind::LeafList {
                ty,
                ordered_by_user: false,
            },
        )
    }

    pub fn choice(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Choice)
    }

    pub fn case(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Case)
    }

    pub fn notification(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Notification)
    }

    pub fn rpc(qname: QName) -> Self {
        Self::new(qname, SchemaKind::Rpc)
    }

    /// Rpc input; by convention named `input` in the rpc's namespace.
    pub fn input(rpc: &QName) -> Self {
        Self::new(rpc.sibling("input"), SchemaKind::RpcInput)
    }

    pub fn output(rpc: &QName) -> Self {
        Self::new(rpc.sibling("output"), SchemaKind::RpcOutput)
    }

    pub fn child(mut self, child: SchemaNodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = SchemaNodeBuilder>,
    {
        self.children.extend(children);
        self
    }

    /// Marks the node (and nothing below it) as instantiated from `origin`.
    pub fn origin(mut self, origin: SchemaPath) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn ordered_by_user(mut self) -> Self {
        match &mut self.kind {
            SchemaKind::List {
                ordered_by_user, ..
            }
            | SchemaKind::LeafList {
                ordered_by_user, ..
            } => *ordered_by_user = true,
            _ => {}
        }
        self
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    fn descend(&mut self, steps: &[QName]) -> Option<&mut SchemaNodeBuilder> {
        let Some((first, rest)) = steps.split_first() else {
            return Some(self);
        };
        if let Some(idx) = self.children.iter().position(|c| &c.qname == first) {
            return self.children[idx].descend(rest);
        }
        for aug in &mut self.augmentations {
            if let Some(idx) = aug.children.iter().position(|c| &c.qname == first) {
                return aug.children[idx].descend(rest);
            }
        }
        None
    }

    fn freeze(self, parent: &SchemaPath) -> Result<Arc<SchemaNode>, SchemaError> {
        let path = parent.child(self.qname.clone());

        let mut seen = HashSet::new();
        for child in &self.children {
            if !seen.insert(child.qname.clone()) {
                return Err(SchemaError::DuplicateChild {
                    parent: path,
                    child: child.qname.clone(),
                });
            }
        }
        if self.kind == SchemaKind::Choice
            && self.children.iter().any(|c| c.kind != SchemaKind::Case)
        {
            return Err(SchemaError::InvalidChoiceChild(path));
        }
        if let SchemaKind::List { key, .. } = &self.kind {
            for k in key {
                let is_leaf = self
                    .children
                    .iter()
                    .any(|c| &c.qname == k && matches!(c.kind, SchemaKind::Leaf { .. }));
                if !is_leaf {
                    return Err(SchemaError::MissingKeyLeaf {
                        list: path,
                        key: k.clone(),
                    });
                }
            }
        }

        let children = self
            .children
            .into_iter()
            .map(|c| c.freeze(&path))
            .collect::<Result<Vec<_>, _>>()?;
        let augmentations = self
            .augmentations
            .into_iter()
            .map(|a| a.freeze(&path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(SchemaNode {
            qname: self.qname,
            kind: self.kind,
            path,
            origin: self.origin,
            children,
            augmentations,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct AugmentationBuilder {
    target: SchemaPath,
    origin: Option<SchemaPath>,
    children: Vec<SchemaNodeBuilder>,
}

impl AugmentationBuilder {
    pub fn new(target: SchemaPath) -> Self {
        Self {
            target,
            origin: None,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: SchemaNodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn origin(mut self, origin: SchemaPath) -> Self {
        self.origin = Some(origin);
        self
    }

    fn freeze(self, target: &SchemaPath) -> Result<Arc<AugmentationSchema>, SchemaError> {
        if self.children.is_empty() {
            return Err(SchemaError::EmptyAugmentation(target.clone()));
        }
        let children = self
            .children
            .into_iter()
            .map(|c| c.freeze(target))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(AugmentationSchema {
            target: target.clone(),
            origin: self.origin,
            children,
        }))
    }
}

#[derive(Debug, Default)]
pub struct SchemaContextBuilder {
    generation: Option<u64>,
    modules: Vec<ModuleInfo>,
    data: Vec<SchemaNodeBuilder>,
    notifications: Vec<SchemaNodeBuilder>,
    operations: Vec<SchemaNodeBuilder>,
    identities: Vec<IdentitySchema>,
    augmentations: Vec<AugmentationBuilder>,
}

impl SchemaContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the generation number instead of drawing the next one.
    pub fn generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn module(mut self, name: impl Into<String>, namespace: impl Into<Arc<str>>) -> Self {
        self.modules.push(ModuleInfo {
            name: name.into(),
            namespace: namespace.into(),
            revision: None,
        });
        self
    }

    pub fn data(mut self, node: SchemaNodeBuilder) -> Self {
        self.data.push(node);
        self
    }

    pub fn notification(mut self, node: SchemaNodeBuilder) -> Self {
        self.notifications.push(node);
        self
    }

    pub fn rpc(mut self, node: SchemaNodeBuilder) -> Self {
        self.operations.push(node);
        self
    }

    pub fn identity<I>(mut self, qname: QName, bases: I) -> Self
    where
        I: IntoIterator<Item = QName>,
    {
        self.identities.push(IdentitySchema {
            qname,
            bases: bases.into_iter().collect(),
        });
        self
    }

    pub fn augment(mut self, augmentation: AugmentationBuilder) -> Self {
        self.augmentations.push(augmentation);
        self
    }

    fn locate(&mut self, steps: &[QName]) -> Option<&mut SchemaNodeBuilder> {
        let (first, rest) = steps.split_first()?;
        if let Some(idx) = self.data.iter().position(|n| &n.qname == first) {
            return self.data[idx].descend(rest);
        }
        if let Some(idx) = self.notifications.iter().position(|n| &n.qname == first) {
            return self.notifications[idx].descend(rest);
        }
        if let Some(idx) = self.operations.iter().position(|n| &n.qname == first) {
            return self.operations[idx].descend(rest);
        }
        None
    }

    pub fn build(mut self) -> Result<Arc<SchemaContext>, SchemaError> {
        // Augmentations may target nodes introduced by other augmentations,
        // so attach in rounds until nothing is left or nothing moves.
        let mut pending = std::mem::take(&mut self.augmentations);
        while !pending.is_empty() {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for aug in pending {
                match self.locate(aug.target.steps()) {
                    Some(target) => target.augmentations.push(aug),
                    None => unresolved.push(aug),
                }
            }
            if unresolved.len() == before {
                return Err(SchemaError::UnresolvedAugmentTarget(
                    unresolved[0].target.clone(),
                ));
            }
            pending = unresolved;
        }

        let root = SchemaPath::root();
        let freeze_all = |nodes: Vec<SchemaNodeBuilder>| {
            nodes
                .into_iter()
                .map(|n| n.freeze(&root))
                .collect::<Result<Vec<_>, _>>()
        };
        let data = freeze_all(self.data)?;
        let notifications = freeze_all(self.notifications)?;
        let operations = freeze_all(self.operations)?;

        let generation = self
            .generation
            .unwrap_or_else(|| NEXT_GENERATION.fetch_add(1, Ordering::Relaxed));

        Ok(Arc::new(SchemaContext {
            generation,
            modules: self.modules,
            data,
            notifications,
            operations,
            identities: self.identities,
        }))
    }
}
