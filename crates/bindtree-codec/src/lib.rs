//! Translation between typed trees and schema-agnostic generic trees.
//!
//! A [`CodecTree`] holds one [`CodecNode`] per typed-tree type reached so
//! far, built lazily from a [`SchemaContext`](bindtree_schema::SchemaContext)
//! and a [`TypeRegistry`]. Encoding walks a [`DataObject`] in schema order
//! and drives a [`GenericTreeBuilder`](bindtree_node::GenericTreeBuilder);
//! decoding returns lazy views that convert each attribute on first access.
//!
//! [`BindingCodecRegistry`] is the usual entry point: it owns the tree for
//! the current schema generation and swaps in a new one on schema updates.

pub mod binding;
mod cache;
mod error;
mod key;
mod node;
mod options;
mod path;
mod registry;
mod stream;
mod tree;
mod types;
pub mod value;
mod view;

pub use binding::{
    BindingType, BindingValue, BitsValue, DataObject, DataObjectBuilder, DerivedValue, EnumValue,
    ImmutableDataObject, ImmutableKey, ImmutableKeyFactory, InstanceIdentifier, KeyHolder, PathStep,
    TypedValue, UnionValue,
};
pub use cache::CachingEncoder;
pub use error::{CodecError, Result};
pub use key::KeyCodec;
pub use node::{ChildEntry, ChildKind, CodecNode, NodeKind, NodeSchema};
pub use options::{CodecOptions, DecodeMode};
pub use path::EncodedPath;
pub use registry::BindingCodecRegistry;
pub use stream::{BindingStreamWriter, Position};
pub use tree::CodecTree;
pub use types::{KeyFactory, StaticTypeRegistry, TypeRegistry};
pub use value::{ValueCodec, ValueContext};
pub use view::LazyDataObject;
