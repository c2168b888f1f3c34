//! Streaming translation from typed objects to generic events.

mod serializer;
mod writer;

pub(crate) use serializer::{DataObjectSerializer, Enclosure};
pub use writer::{BindingStreamWriter, Position};
