use thiserror::Error;

use crate::{QName, SchemaPath};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("augmentation target {0} does not exist")]
    UnresolvedAugmentTarget(SchemaPath),
    #[error("list {list} declares key {key} which is not one of its leaves")]
    MissingKeyLeaf { list: SchemaPath, key: QName },
    #[error("{parent} declares {child} more than once")]
    DuplicateChild { parent: SchemaPath, child: QName },
    #[error("choice {0} may only contain cases")]
    InvalidChoiceChild(SchemaPath),
    #[error("augmentation of {0} has no children")]
    EmptyAugmentation(SchemaPath),
}
