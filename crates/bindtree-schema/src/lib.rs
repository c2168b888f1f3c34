//! Immutable schema model for bindtree.
//!
//! The codec treats this model as read-only input: a [`SchemaContext`] holds
//! top-level data nodes, notifications, rpcs and identities, and every
//! [`SchemaNode`] knows its absolute [`SchemaPath`], its declared children and
//! the augmentations attached to it.

mod builder;
mod context;
mod error;
mod node;
mod path;
mod qname;
mod types;

pub use builder::{AugmentationBuilder, SchemaContextBuilder, SchemaNodeBuilder};
pub use context::{IdentitySchema, ModuleInfo, SchemaContext, SchemaLocation};
pub use error::SchemaError;
pub use node::{AugmentationSchema, SchemaKind, SchemaNode};
pub use path::SchemaPath;
pub use qname::QName;
pub use types::{Bit, EnumMember, TypeDefinition};
