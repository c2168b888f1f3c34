use bindtree_node::TreeError;
use bindtree_schema::QName;
use thiserror::Error;

use crate::binding::BindingType;

/// Everything that can go wrong while translating between the two trees.
///
/// All kinds are raised where they are detected and propagate unchanged; no
/// partially translated node is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The schema model has no definition for the referenced element.
    #[error("no schema definition for {0}")]
    MissingSchema(String),
    /// The schema element exists but no typed-tree type is bound to it.
    #[error("no typed-tree type is bound to {0}")]
    MissingType(String),
    /// The binding is known but the type cannot be obtained right now.
    #[error("type {0} is declared but not currently available")]
    TypeUnavailable(BindingType),
    #[error("{child} is not a child of {parent}")]
    NotAChild { child: String, parent: String },
    /// Stream events arrived out of order.
    #[error("stream nesting violation: {0}")]
    Nesting(String),
    #[error("key of {list} is missing component {component}")]
    IncompleteKey { list: QName, component: QName },
    #[error("invalid value for {target}: {reason}")]
    InvalidValue { target: String, reason: String },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("caching encoder has been disposed")]
    EncoderClosed,
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl CodecError {
    /// True only for [`CodecError::TypeUnavailable`]: the same call may
    /// succeed once the missing type has been supplied.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TypeUnavailable(_))
    }

    pub(crate) fn invalid_value(target: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_a_child(child: impl ToString, parent: impl ToString) -> Self {
        Self::NotAChild {
            child: child.to_string(),
            parent: parent.to_string(),
        }
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
