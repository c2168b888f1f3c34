//! The typed-tree side of the codec.
//!
//! Typed trees are made of [`DataObject`]s: objects that know their
//! [`BindingType`], expose their schema children through accessors named by
//! the child's local name, optionally carry a [`KeyHolder`], and hold
//! augmentations keyed by augmentation type.

mod equality;
mod object;
mod path;

use std::fmt;
use std::sync::Arc;

use bindtree_node::Decimal64;

use crate::error::Result;

pub use equality::{binding_value_eq, data_object_eq, data_object_hash, key_eq, key_hash};
pub use object::{DataObjectBuilder, ImmutableDataObject, ImmutableKey, ImmutableKeyFactory};
pub use path::{InstanceIdentifier, PathStep};

/// Name of a typed-tree type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingType(Arc<str>);

impl BindingType {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BindingType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A member of a typed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: BindingType,
    pub name: Arc<str>,
    pub value: i32,
}

/// A bits value: one flag per declared bit, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitsValue {
    pub ty: BindingType,
    pub flags: Vec<(Arc<str>, bool)>,
}

impl BitsValue {
    pub fn new<I, S>(ty: BindingType, flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<Arc<str>>,
    {
        Self {
            ty,
            flags: flags.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.iter().any(|(n, v)| &**n == name && *v)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().filter(|(_, v)| *v).map(|(n, _)| &**n)
    }
}

/// A value of a named union type; `value` is the member that is populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionValue {
    pub ty: BindingType,
    pub value: Box<TypedValue>,
}

/// A value of a named derived type wrapping its base type's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedValue {
    pub ty: BindingType,
    pub value: Box<TypedValue>,
}

/// A leaf value as the typed tree represents it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedValue {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Decimal64(Decimal64),
    String(String),
    Binary(Vec<u8>),
    Empty,
    Enum(EnumValue),
    Bits(BitsValue),
    Union(UnionValue),
    Derived(DerivedValue),
    /// Reference to an identity, by the identity's typed-tree type.
    Identity(BindingType),
    InstanceIdentifier(InstanceIdentifier),
}

impl TypedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Decimal64(_) => "decimal64",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Empty => "empty",
            Self::Enum(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::Union(_) => "union",
            Self::Derived(_) => "derived",
            Self::Identity(_) => "identityref",
            Self::InstanceIdentifier(_) => "instance-identifier",
        }
    }

    pub fn derived(ty: BindingType, value: TypedValue) -> Self {
        Self::Derived(DerivedValue {
            ty,
            value: Box::new(value),
        })
    }

    pub fn union(ty: BindingType, value: TypedValue) -> Self {
        Self::Union(UnionValue {
            ty,
            value: Box::new(value),
        })
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for TypedValue {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<Decimal64> for TypedValue {
    fn from(v: Decimal64) -> Self {
        Self::Decimal64(v)
    }
}

impl From<EnumValue> for TypedValue {
    fn from(v: EnumValue) -> Self {
        Self::Enum(v)
    }
}

impl From<BitsValue> for TypedValue {
    fn from(v: BitsValue) -> Self {
        Self::Bits(v)
    }
}

impl From<InstanceIdentifier> for TypedValue {
    fn from(v: InstanceIdentifier) -> Self {
        Self::InstanceIdentifier(v)
    }
}

/// What an attribute accessor returns.
#[derive(Debug, Clone)]
pub enum BindingValue {
    Leaf(TypedValue),
    LeafList(Vec<TypedValue>),
    Container(Arc<dyn DataObject>),
    /// The populated case of a choice.
    Choice(Arc<dyn DataObject>),
    List(Vec<Arc<dyn DataObject>>),
}

impl BindingValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
            Self::Container(_) => "container",
            Self::Choice(_) => "choice",
            Self::List(_) => "list",
        }
    }

    pub fn as_leaf(&self) -> Option<&TypedValue> {
        match self {
            Self::Leaf(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn DataObject>> {
        match self {
            Self::Container(o) | Self::Choice(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arc<dyn DataObject>]> {
        match self {
            Self::List(entries) => Some(entries),
            _ => None,
        }
    }

    /// Empty lists and leaf-lists are indistinguishable from absent ones.
    pub(crate) fn is_vacant(&self) -> bool {
        match self {
            Self::LeafList(v) => v.is_empty(),
            Self::List(v) => v.is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for BindingValue {
    fn eq(&self, other: &Self) -> bool {
        binding_value_eq(self, other)
    }
}

/// An object of the typed tree.
///
/// Accessors are addressed by the local name of the schema child they
/// expose. Implementations are either application objects (typically built
/// with [`DataObjectBuilder`]) or views produced by the codec.
pub trait DataObject: fmt::Debug + Send + Sync {
    fn implemented_type(&self) -> &BindingType;

    /// Value of the accessor for `name`; `None` when the child is absent.
    fn attribute(&self, name: &str) -> Result<Option<BindingValue>>;

    /// Names of the accessors that currently hold a value.
    fn attribute_names(&self) -> Vec<Arc<str>>;

    /// Key of a keyed list entry.
    fn key(&self) -> Result<Option<Arc<dyn KeyHolder>>> {
        Ok(None)
    }

    fn augmentations(&self) -> Result<Vec<Arc<dyn DataObject>>> {
        Ok(Vec::new())
    }

    fn augmentation(&self, ty: &BindingType) -> Result<Option<Arc<dyn DataObject>>> {
        Ok(self
            .augmentations()?
            .into_iter()
            .find(|aug| aug.implemented_type() == ty))
    }
}

/// Key of a keyed list entry.
pub trait KeyHolder: fmt::Debug + Send + Sync {
    fn key_type(&self) -> &BindingType;

    /// Components by local name, in the list's declared key order. `None`
    /// marks a component that was never set.
    fn components(&self) -> Vec<(Arc<str>, Option<TypedValue>)>;

    fn component(&self, name: &str) -> Option<TypedValue> {
        self.components()
            .into_iter()
            .find(|(n, _)| &**n == name)
            .and_then(|(_, v)| v)
    }
}
