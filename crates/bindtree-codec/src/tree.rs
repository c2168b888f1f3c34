//! One codec tree per schema generation.

use std::sync::Arc;

use bindtree_node::{AugmentationIdentifier, GenericNode, GenericPath, GenericTreeBuilder};
use bindtree_schema::{QName, SchemaContext, SchemaKind, SchemaLocation, SchemaPath};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::binding::{key_eq, BindingType, DataObject, ImmutableDataObject, InstanceIdentifier, PathStep};
use crate::cache::SubtreeCaches;
use crate::error::{CodecError, Result};
use crate::key::KeyCodec;
use crate::node::{load_or_create, CodecNode, NodeKind, NodeSchema};
use crate::options::{CodecOptions, DecodeMode};
use crate::path::{EncodedPath, PathCodec};
use crate::stream::{BindingStreamWriter, DataObjectSerializer, Enclosure, Position};
use crate::types::TypeRegistry;
use crate::value::ValueContext;
use crate::view::LazyDataObject;

/// The codec nodes built for one schema context and type registry.
///
/// Nodes are created on first use and never change afterwards; a schema
/// update produces a new tree rather than mutating this one.
pub struct CodecTree {
    schema: Arc<SchemaContext>,
    types: Arc<dyn TypeRegistry>,
    options: CodecOptions,
    roots: DashMap<BindingType, Arc<OnceCell<Arc<CodecNode>>>>,
}

impl std::fmt::Debug for CodecTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecTree")
            .field("generation", &self.generation())
            .field("options", &self.options)
            .field("roots", &self.roots.len())
            .finish()
    }
}

impl CodecTree {
    pub fn new(schema: Arc<SchemaContext>, types: Arc<dyn TypeRegistry>, options: CodecOptions) -> Self {
        Self {
            schema,
            types,
            options,
            roots: DashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.schema.generation()
    }

    pub fn schema(&self) -> &Arc<SchemaContext> {
        &self.schema
    }

    pub fn types(&self) -> &dyn TypeRegistry {
        &*self.types
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// The node for a top-level container, list, notification or rpc payload.
    pub fn root_child(&self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        load_or_create(&self.roots, ty, || self.create_root(ty))
    }

    fn create_root(&self, ty: &BindingType) -> Result<Arc<CodecNode>> {
        let location = self.types.location_of(ty)?;
        let SchemaLocation::Node(path) = &location else {
            return Err(CodecError::not_a_child(ty, "root"));
        };
        let schema = self
            .schema
            .node_at(path)
            .ok_or_else(|| CodecError::MissingSchema(path.to_string()))?;
        let depth = match schema.kind {
            SchemaKind::RpcInput | SchemaKind::RpcOutput => 2,
            _ => 1,
        };
        if path.len() != depth {
            return Err(CodecError::not_a_child(ty, "root"));
        }
        let canonical = self.types.type_at(&location)?;
        if &canonical != ty {
            return self.root_child(&canonical);
        }
        let node = CodecNode::for_schema(canonical, schema)?;
        debug!(root = %ty, kind = ?node.kind(), generation = self.generation(), "created root codec node");
        Ok(node)
    }

    /// The root node for a top-level data node or notification by name.
    pub(crate) fn root_by_qname(&self, qname: &QName) -> Result<Arc<CodecNode>> {
        let schema = self
            .schema
            .data_child(qname)
            .or_else(|| self.schema.notification(qname))
            .ok_or_else(|| self.unknown(qname, "root"))?;
        let ty = self.types.type_at(&SchemaLocation::Node(schema.path.clone()))?;
        self.root_child(&ty)
    }

    fn unknown(&self, qname: &QName, parent: &str) -> CodecError {
        if self.schema.knows_namespace(qname) {
            CodecError::not_a_child(qname, parent)
        } else {
            CodecError::MissingSchema(qname.to_string())
        }
    }

    /// Descends from the root along an absolute schema path.
    fn node_at(&self, path: &SchemaPath) -> Result<Arc<CodecNode>> {
        let (first, rest) = path
            .steps()
            .split_first()
            .ok_or_else(|| CodecError::InvalidPath("empty schema path".to_owned()))?;
        match self.schema.rpc(first) {
            Some(rpc) => {
                let payload = rest
                    .first()
                    .and_then(|q| rpc.child(q))
                    .ok_or_else(|| CodecError::MissingSchema(path.to_string()))?;
                let ty = self.types.type_at(&SchemaLocation::Node(payload.path.clone()))?;
                self.descend(self.root_child(&ty)?, &rest[1..])
            }
            None => self.descend(self.root_by_qname(first)?, rest),
        }
    }

    fn descend(&self, mut node: Arc<CodecNode>, steps: &[QName]) -> Result<Arc<CodecNode>> {
        for step in steps {
            node = match node.table().by_qname(step) {
                Some(idx) => node.entry_node(self, idx)?,
                None => {
                    let aug = node
                        .schema_node()
                        .and_then(|s| s.augmentation_for_child(step))
                        .ok_or_else(|| self.unknown(step, node.binding_type().name()))?;
                    let aug = node.augmentation_by_id(self, &AugmentationIdentifier::new(aug.identity()))?;
                    let idx = aug
                        .table()
                        .by_qname(step)
                        .ok_or_else(|| CodecError::not_a_child(step, aug.binding_type()))?;
                    aug.entry_node(self, idx)?
                }
            };
        }
        Ok(node)
    }

    pub fn encode(&self, path: &InstanceIdentifier, obj: &Arc<dyn DataObject>) -> Result<(GenericPath, Arc<GenericNode>)> {
        self.encode_with(path, obj, None)
    }

    pub(crate) fn encode_with(
        &self,
        path: &InstanceIdentifier,
        obj: &Arc<dyn DataObject>,
        caches: Option<&SubtreeCaches>,
    ) -> Result<(GenericPath, Arc<GenericNode>)> {
        let (encoded, target) = PathCodec::new(self).encode(path)?;
        if encoded.wildcarded {
            return Err(CodecError::InvalidPath(format!("{path} does not address a single object")));
        }
        let node = &target.node;
        if !self.belongs_at(obj.implemented_type(), node)? {
            return Err(CodecError::invalid_value(
                obj.implemented_type(),
                format!("object does not belong at {path}"),
            ));
        }
        if let (Some(PathStep::Keyed { key, .. }), Some(own)) = (path.last(), obj.key()?) {
            if !key_eq(&**key, &*own) {
                return Err(CodecError::invalid_value(obj.implemented_type(), "key differs from path key"));
            }
        }

        let mut builder = GenericTreeBuilder::new();
        {
            let enclosure = Enclosure::for_node(node);
            let mut w = match (enclosure, &target.parent) {
                (Enclosure::Entry, _) => {
                    BindingStreamWriter::within(self, Arc::clone(node), Position::Entries, &mut builder)
                }
                (_, Some(parent)) => {
                    BindingStreamWriter::within(self, Arc::clone(parent), Position::Children, &mut builder)
                }
                (_, None) => BindingStreamWriter::new(self, &mut builder),
            };
            DataObjectSerializer::new(self, caches).write_object(enclosure, obj, &mut w)?;
            w.finish()?;
        }
        let data = builder.finish()?;
        trace!(path = %encoded.path, "encoded object");
        Ok((encoded.path, data))
    }

    /// Whether an object of type `ty` may be written where `node` sits: it is
    /// bound to the same schema location, or to one instantiated from the
    /// same grouping.
    fn belongs_at(&self, ty: &BindingType, node: &CodecNode) -> Result<bool> {
        if ty == node.binding_type() {
            return Ok(true);
        }
        let location = self.types.location_of(ty)?;
        if &self.types.type_at(&location)? == node.binding_type() {
            return Ok(true);
        }
        Ok(match (&location, node.schema()) {
            (SchemaLocation::Node(path), NodeSchema::Data(at)) => self
                .schema
                .node_at(path)
                .is_some_and(|own| own.is_equivalent(at)),
            (SchemaLocation::Augmentation { target, identity }, NodeSchema::Augmentation(at)) => self
                .schema
                .augmentation_at(target, identity)
                .is_some_and(|own| own.is_equivalent(at)),
            _ => false,
        })
    }

    /// Decodes the generic node found at `path` into a typed object.
    ///
    /// `Ok(None)` when the path has no typed equivalent.
    pub fn decode(
        self: &Arc<Self>,
        path: &GenericPath,
        data: &Arc<GenericNode>,
    ) -> Result<Option<(InstanceIdentifier, Arc<dyn DataObject>)>> {
        let Some((typed, node)) = PathCodec::new(self).decode(path)? else {
            return Ok(None);
        };
        let id = data.identifier();
        if path.last() != Some(&id) {
            return Err(CodecError::InvalidPath(format!("{path} does not end at {id}")));
        }
        if node.kind() == NodeKind::List
            && !matches!(**data, GenericNode::MapEntry { .. } | GenericNode::UnkeyedListEntry { .. })
        {
            return Ok(None);
        }
        let obj = self.materialize(node, data)?;
        Ok(Some((typed, obj)))
    }

    fn materialize(self: &Arc<Self>, node: Arc<CodecNode>, data: &Arc<GenericNode>) -> Result<Arc<dyn DataObject>> {
        let view = LazyDataObject::wrap(Arc::clone(self), node, Arc::clone(data));
        match self.options.decode_mode {
            DecodeMode::Lazy => Ok(view),
            DecodeMode::Eager => ImmutableDataObject::copy_of(&*view),
        }
    }

    pub fn encode_path(&self, path: &InstanceIdentifier) -> Result<EncodedPath> {
        PathCodec::new(self).encode(path).map(|(encoded, _)| encoded)
    }

    /// `Ok(None)` when the generic path has no typed equivalent.
    pub fn decode_path(&self, path: &GenericPath) -> Result<Option<InstanceIdentifier>> {
        Ok(PathCodec::new(self).decode(path)?.map(|(typed, _)| typed))
    }

    pub fn encode_notification(&self, obj: &Arc<dyn DataObject>) -> Result<Arc<GenericNode>> {
        self.encode_top_level(obj, &[NodeKind::Notification])
    }

    pub fn decode_notification(self: &Arc<Self>, data: &Arc<GenericNode>) -> Result<Arc<dyn DataObject>> {
        let GenericNode::Container { name, .. } = &**data else {
            return Err(CodecError::invalid_value(data.identifier(), "a notification is a container"));
        };
        let schema = self
            .schema
            .notification(name)
            .ok_or_else(|| self.unknown(name, "notifications"))?;
        let ty = self.types.type_at(&SchemaLocation::Node(schema.path.clone()))?;
        let node = self.root_child(&ty)?;
        self.materialize(node, data)
    }

    /// Encodes an rpc input or output payload.
    pub fn encode_rpc_data(&self, obj: &Arc<dyn DataObject>) -> Result<Arc<GenericNode>> {
        self.encode_top_level(obj, &[NodeKind::RpcInput, NodeKind::RpcOutput])
    }

    pub fn decode_rpc_data(self: &Arc<Self>, ty: &BindingType, data: &Arc<GenericNode>) -> Result<Arc<dyn DataObject>> {
        let node = self.root_child(ty)?;
        if !matches!(node.kind(), NodeKind::RpcInput | NodeKind::RpcOutput) {
            return Err(CodecError::invalid_value(ty, "not an rpc input or output"));
        }
        match (&**data, node.qname()) {
            (GenericNode::Container { name, .. }, Some(expected)) if name == expected => self.materialize(node, data),
            _ => Err(CodecError::invalid_value(
                data.identifier(),
                format!("expected the payload of {ty}"),
            )),
        }
    }

    fn encode_top_level(&self, obj: &Arc<dyn DataObject>, kinds: &[NodeKind]) -> Result<Arc<GenericNode>> {
        let ty = obj.implemented_type();
        let node = self.root_child(ty)?;
        if !kinds.contains(&node.kind()) {
            return Err(CodecError::invalid_value(ty, format!("{:?} cannot be encoded here", node.kind())));
        }
        let mut builder = GenericTreeBuilder::new();
        {
            let mut w = BindingStreamWriter::new(self, &mut builder);
            DataObjectSerializer::new(self, None).write_object(Enclosure::Container, obj, &mut w)?;
            w.finish()?;
        }
        Ok(builder.finish()?)
    }

    pub fn identity_to_qname(&self, ty: &BindingType) -> Result<QName> {
        self.types.identity_of(ty)
    }

    pub fn qname_to_identity(&self, qname: &QName) -> Result<BindingType> {
        if self.schema.identity(qname).is_none() {
            return Err(CodecError::MissingSchema(qname.to_string()));
        }
        self.types.identity_type(qname)
    }

    /// The key codec of a keyed list type.
    pub fn key_codec(&self, list: &BindingType) -> Result<Arc<KeyCodec>> {
        let SchemaLocation::Node(path) = self.types.location_of(list)? else {
            return Err(CodecError::invalid_value(list, "not a keyed list"));
        };
        self.node_at(&path)?.key_codec(self)
    }
}

impl ValueContext for CodecTree {
    fn schema(&self) -> &SchemaContext {
        &self.schema
    }

    fn types(&self) -> &dyn TypeRegistry {
        &*self.types
    }

    fn encode_instance_identifier(&self, path: &InstanceIdentifier) -> Result<GenericPath> {
        Ok(self.encode_path(path)?.path)
    }

    fn decode_instance_identifier(&self, path: &GenericPath) -> Result<Option<InstanceIdentifier>> {
        self.decode_path(path)
    }
}
