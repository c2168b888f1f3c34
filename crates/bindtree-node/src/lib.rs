//! Schema-agnostic data trees.
//!
//! A [`GenericNode`] is identified by a [`PathArgument`] and holds either a
//! [`Scalar`] or children. Trees are immutable once built; they are produced
//! by feeding [`NodeStreamWriter`] events into a [`GenericTreeBuilder`].

mod argument;
mod builder;
mod error;
mod node;
mod path;
mod scalar;
mod writer;

pub mod json;

pub use argument::{
    AugmentationIdentifier, KeyPredicates, NodeIdentifierWithPredicates, NodeWithValue,
    PathArgument,
};
pub use builder::GenericTreeBuilder;
pub use error::TreeError;
pub use node::{Children, GenericNode};
pub use path::GenericPath;
pub use scalar::{Decimal64, Scalar};
pub use writer::NodeStreamWriter;
