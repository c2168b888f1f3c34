//! Entry point holding the codec tree for the current schema generation.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bindtree_node::{GenericNode, GenericPath};
use bindtree_schema::{QName, SchemaContext};
use tracing::info;

use crate::binding::{BindingType, DataObject, InstanceIdentifier};
use crate::cache::CachingEncoder;
use crate::error::Result;
use crate::key::KeyCodec;
use crate::options::CodecOptions;
use crate::path::EncodedPath;
use crate::tree::CodecTree;
use crate::types::TypeRegistry;

/// Encodes and decodes against the most recently installed schema.
///
/// Every call captures the current tree once, so an operation started
/// before [`update_schema`](Self::update_schema) completes against the tree
/// it started with.
///
/// ```
/// use std::sync::Arc;
/// use bindtree_codec::{BindingCodecRegistry, StaticTypeRegistry};
/// use bindtree_schema::SchemaContextBuilder;
///
/// let schema = SchemaContextBuilder::new().generation(1).build().unwrap();
/// let registry = BindingCodecRegistry::new(schema, Arc::new(StaticTypeRegistry::new()));
/// assert_eq!(registry.generation(), 1);
/// ```
pub struct BindingCodecRegistry {
    current: ArcSwap<CodecTree>,
    options: CodecOptions,
}

impl std::fmt::Debug for BindingCodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCodecRegistry")
            .field("generation", &self.generation())
            .field("options", &self.options)
            .finish()
    }
}

impl BindingCodecRegistry {
    pub fn new(schema: Arc<SchemaContext>, types: Arc<dyn TypeRegistry>) -> Self {
        Self::with_options(schema, types, CodecOptions::default())
    }

    pub fn with_options(schema: Arc<SchemaContext>, types: Arc<dyn TypeRegistry>, options: CodecOptions) -> Self {
        let tree = CodecTree::new(schema, types, options.clone());
        info!(generation = tree.generation(), "installed codec tree");
        Self {
            current: ArcSwap::from_pointee(tree),
            options,
        }
    }

    /// Replaces the codec tree with a fresh one for `schema`.
    pub fn update_schema(&self, schema: Arc<SchemaContext>, types: Arc<dyn TypeRegistry>) {
        let previous = self.generation();
        let tree = CodecTree::new(schema, types, self.options.clone());
        info!(from = previous, to = tree.generation(), "replaced codec tree");
        self.current.store(Arc::new(tree));
    }

    /// The tree in use right now.
    pub fn tree(&self) -> Arc<CodecTree> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn encode(&self, path: &InstanceIdentifier, obj: &Arc<dyn DataObject>) -> Result<(GenericPath, Arc<GenericNode>)> {
        self.tree().encode(path, obj)
    }

    pub fn decode(
        &self,
        path: &GenericPath,
        data: &Arc<GenericNode>,
    ) -> Result<Option<(InstanceIdentifier, Arc<dyn DataObject>)>> {
        self.tree().decode(path, data)
    }

    pub fn encode_path(&self, path: &InstanceIdentifier) -> Result<EncodedPath> {
        self.tree().encode_path(path)
    }

    pub fn decode_path(&self, path: &GenericPath) -> Result<Option<InstanceIdentifier>> {
        self.tree().decode_path(path)
    }

    pub fn encode_notification(&self, obj: &Arc<dyn DataObject>) -> Result<Arc<GenericNode>> {
        self.tree().encode_notification(obj)
    }

    pub fn decode_notification(&self, data: &Arc<GenericNode>) -> Result<Arc<dyn DataObject>> {
        self.tree().decode_notification(data)
    }

    pub fn encode_rpc_data(&self, obj: &Arc<dyn DataObject>) -> Result<Arc<GenericNode>> {
        self.tree().encode_rpc_data(obj)
    }

    pub fn decode_rpc_data(&self, ty: &BindingType, data: &Arc<GenericNode>) -> Result<Arc<dyn DataObject>> {
        self.tree().decode_rpc_data(ty, data)
    }

    pub fn identity_to_qname(&self, ty: &BindingType) -> Result<QName> {
        self.tree().identity_to_qname(ty)
    }

    pub fn qname_to_identity(&self, qname: &QName) -> Result<BindingType> {
        self.tree().qname_to_identity(qname)
    }

    pub fn key_codec(&self, list: &BindingType) -> Result<Arc<KeyCodec>> {
        self.tree().key_codec(list)
    }

    /// An encoder for objects of type `root` that shares the generic
    /// subtrees of every type in `memoize` across calls.
    ///
    /// The encoder stays bound to the current tree.
    pub fn caching_encoder<I>(&self, root: BindingType, memoize: I) -> CachingEncoder
    where
        I: IntoIterator<Item = BindingType>,
    {
        let memoize: HashSet<BindingType> = memoize.into_iter().collect();
        CachingEncoder::new(self.tree(), root, memoize)
    }
}
