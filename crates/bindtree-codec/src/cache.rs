//! Identity-preserving encoding.
//!
//! A [`CachingEncoder`] remembers the generic subtree produced for every
//! object of the memoized types. Encoding an equal object again splices the
//! very same `Arc<GenericNode>` into the output, so callers can detect
//! unchanged subtrees by pointer comparison.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bindtree_node::{GenericNode, GenericPath};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::binding::{data_object_eq, data_object_hash, BindingType, DataObject, InstanceIdentifier};
use crate::error::{CodecError, Result};
use crate::node::load_or_create;
use crate::tree::CodecTree;

/// Hashes and compares an object by content.
#[derive(Debug, Clone)]
struct ObjectKey(Arc<dyn DataObject>);

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        data_object_eq(&*self.0, &*other.0)
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        data_object_hash(&*self.0, state);
    }
}

#[derive(Debug, Default)]
pub(crate) struct SubtreeCache {
    entries: DashMap<ObjectKey, Arc<OnceCell<Arc<GenericNode>>>>,
}

impl SubtreeCache {
    pub(crate) fn get_or_encode<F>(&self, obj: &Arc<dyn DataObject>, encode: F) -> Result<Arc<GenericNode>>
    where
        F: FnOnce() -> Result<Arc<GenericNode>>,
    {
        let ty = obj.implemented_type();
        load_or_create(&self.entries, &ObjectKey(Arc::clone(obj)), || {
            trace!(%ty, "subtree cache miss");
            encode()
        })
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) type SubtreeCaches = HashMap<BindingType, SubtreeCache>;

/// An encoder scoped to one root type that shares subtrees across calls.
///
/// Holds on to the codec tree it was created from, even if the registry
/// moves to a newer schema generation in the meantime.
pub struct CachingEncoder {
    tree: Arc<CodecTree>,
    root: BindingType,
    caches: RwLock<SubtreeCaches>,
    closed: AtomicBool,
}

impl std::fmt::Debug for CachingEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingEncoder")
            .field("root", &self.root)
            .field("generation", &self.tree.generation())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl CachingEncoder {
    pub(crate) fn new(tree: Arc<CodecTree>, root: BindingType, cacheable: HashSet<BindingType>) -> Self {
        debug!(root = %root, types = cacheable.len(), "created caching encoder");
        let caches = cacheable
            .into_iter()
            .map(|ty| (ty, SubtreeCache::default()))
            .collect();
        Self {
            tree,
            root,
            caches: RwLock::new(caches),
            closed: AtomicBool::new(false),
        }
    }

    pub fn root_type(&self) -> &BindingType {
        &self.root
    }

    pub fn is_memoized(&self, ty: &BindingType) -> bool {
        self.caches.read().contains_key(ty)
    }

    /// Number of distinct subtrees currently held.
    pub fn cached_subtrees(&self) -> usize {
        self.caches.read().values().map(SubtreeCache::len).sum()
    }

    /// Encodes an object of the root type found at `path`.
    pub fn encode(
        &self,
        path: &InstanceIdentifier,
        obj: &Arc<dyn DataObject>,
    ) -> Result<(GenericPath, Arc<GenericNode>)> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CodecError::EncoderClosed);
        }
        if obj.implemented_type() != &self.root {
            return Err(CodecError::invalid_value(
                obj.implemented_type(),
                format!("encoder is scoped to {}", self.root),
            ));
        }
        let caches = self.caches.read();
        self.tree.encode_with(path, obj, Some(&*caches))
    }

    /// Drops every cached subtree; later calls fail with
    /// [`CodecError::EncoderClosed`].
    pub fn dispose(&self) {
        self.closed.store(true, Ordering::Release);
        self.caches.write().clear();
        debug!(root = %self.root, "disposed caching encoder");
    }
}
