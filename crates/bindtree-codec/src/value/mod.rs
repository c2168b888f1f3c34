//! Leaf value codecs.
//!
//! A [`ValueCodec`] converts between a typed-tree [`TypedValue`] and a
//! generic [`Scalar`]. Codecs are built once per leaf type from the schema
//! definition and the type registry; references to other parts of the model
//! (identities, instance identifiers) are resolved through a
//! [`ValueContext`] passed at call time.
//!
//! Every codec has a strict form (`serialize`/`deserialize`) and a probing
//! form (`try_*`) returning `Ok(None)` when a value simply does not belong
//! to the codec's type. Unions are built on the probing form.

mod enumeration;
mod primitive;
mod reference;
mod union;

use bindtree_node::{GenericPath, Scalar};
use bindtree_schema::{SchemaContext, TypeDefinition};
use tracing::debug;

use crate::binding::{BindingType, InstanceIdentifier, TypedValue};
use crate::error::{CodecError, Result};
use crate::types::TypeRegistry;

pub use enumeration::{BitsCodec, EnumCodec};
pub use primitive::Primitive;
pub use reference::{CompositeCodec, EncapsulatedCodec, Projection};
pub use union::UnionCodec;

/// What value codecs may consult while converting.
pub trait ValueContext {
    fn schema(&self) -> &SchemaContext;

    fn types(&self) -> &dyn TypeRegistry;

    fn encode_instance_identifier(&self, path: &InstanceIdentifier) -> Result<GenericPath>;

    fn decode_instance_identifier(&self, path: &GenericPath) -> Result<Option<InstanceIdentifier>>;
}

#[derive(Debug)]
pub enum ValueCodec {
    /// Built-in types carried unchanged.
    Identity(Primitive),
    Enum(EnumCodec),
    Bits(BitsCodec),
    Union(UnionCodec),
    /// A typedef over a type that needs no model context.
    Encapsulated(EncapsulatedCodec),
    IdentityRef,
    InstanceIdentifier,
    /// A typedef over an identityref or instance-identifier.
    Composite(CompositeCodec),
}

impl ValueCodec {
    pub fn for_definition(def: &TypeDefinition, types: &dyn TypeRegistry) -> Result<Self> {
        let def = def.resolved();
        if let Some(primitive) = Primitive::of(def) {
            return Ok(Self::Identity(primitive));
        }
        let codec = match def {
            TypeDefinition::Enumeration { name, members } => {
                Self::Enum(EnumCodec::new(types.definition_type(name)?, members))
            }
            TypeDefinition::Bits { name, bits } => {
                Self::Bits(BitsCodec::new(types.definition_type(name)?, bits))
            }
            TypeDefinition::Union { name, members } => {
                let ty = types.definition_type(name)?;
                let members = members
                    .iter()
                    .map(|m| Self::for_definition(m, types))
                    .collect::<Result<Vec<_>>>()?;
                Self::Union(UnionCodec::new(ty, members))
            }
            TypeDefinition::IdentityRef { .. } => Self::IdentityRef,
            TypeDefinition::InstanceIdentifier { .. } => Self::InstanceIdentifier,
            TypeDefinition::Derived { name, base } => {
                let ty = types.definition_type(name)?;
                let inner = Self::for_definition(base, types)?;
                if base.is_context_dependent() {
                    Self::Composite(CompositeCodec::new(Projection::new(ty), inner))
                } else {
                    Self::Encapsulated(EncapsulatedCodec::new(ty, inner))
                }
            }
            other => {
                return Err(CodecError::invalid_value(
                    other.kind(),
                    "type cannot be carried by a leaf",
                ))
            }
        };
        debug!(codec = %codec.describe(), "built value codec");
        Ok(codec)
    }

    pub fn serialize(&self, cx: &dyn ValueContext, value: &TypedValue) -> Result<Scalar> {
        self.try_serialize(cx, value)?.ok_or_else(|| {
            CodecError::invalid_value(
                self.describe(),
                format!("{} value does not belong to this type", value.kind()),
            )
        })
    }

    pub fn deserialize(&self, cx: &dyn ValueContext, scalar: &Scalar) -> Result<TypedValue> {
        self.try_deserialize(cx, scalar)?.ok_or_else(|| {
            CodecError::invalid_value(
                self.describe(),
                format!("cannot decode {} scalar {scalar}", scalar.kind()),
            )
        })
    }

    pub fn try_serialize(&self, cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
        match self {
            Self::Identity(p) => Ok(p.scalar_of(value)),
            Self::Enum(c) => Ok(c.scalar_of(value)),
            Self::Bits(c) => c.scalar_of(value),
            Self::Union(c) => c.try_serialize(cx, value),
            Self::Encapsulated(c) => c.try_serialize(cx, value),
            Self::IdentityRef => reference::identity_to_scalar(cx, value),
            Self::InstanceIdentifier => reference::path_to_scalar(cx, value),
            Self::Composite(c) => c.try_serialize(cx, value),
        }
    }

    pub fn try_deserialize(&self, cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
        match self {
            Self::Identity(p) => Ok(p.value_of(scalar)),
            Self::Enum(c) => Ok(c.value_of(scalar)),
            Self::Bits(c) => Ok(c.value_of(scalar)),
            Self::Union(c) => c.try_deserialize(cx, scalar),
            Self::Encapsulated(c) => c.try_deserialize(cx, scalar),
            Self::IdentityRef => reference::identity_from_scalar(cx, scalar),
            Self::InstanceIdentifier => reference::path_from_scalar(cx, scalar),
            Self::Composite(c) => c.try_deserialize(cx, scalar),
        }
    }

    /// The typed-tree type this codec produces, when it has one of its own.
    pub fn binding_type(&self) -> Option<&BindingType> {
        match self {
            Self::Enum(c) => Some(c.ty()),
            Self::Bits(c) => Some(c.ty()),
            Self::Union(c) => Some(c.ty()),
            Self::Encapsulated(c) => Some(c.ty()),
            Self::Composite(c) => Some(c.ty()),
            Self::Identity(_) | Self::IdentityRef | Self::InstanceIdentifier => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Identity(p) => p.name().to_owned(),
            Self::IdentityRef => "identityref".to_owned(),
            Self::InstanceIdentifier => "instance-identifier".to_owned(),
            other => match other.binding_type() {
                Some(ty) => ty.to_string(),
                None => "value".to_owned(),
            },
        }
    }
}
