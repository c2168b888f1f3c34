//! Typedef wrappers and values that point elsewhere in the model.

use bindtree_node::Scalar;

use super::{ValueCodec, ValueContext};
use crate::binding::{BindingType, TypedValue};
use crate::error::{CodecError, Result};

/// Moves values in and out of a typedef's wrapper type without looking at
/// what they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    ty: BindingType,
}

impl Projection {
    pub fn new(ty: BindingType) -> Self {
        Self { ty }
    }

    pub fn ty(&self) -> &BindingType {
        &self.ty
    }

    /// The wrapped value, when `value` is an instance of this typedef.
    pub fn strip<'v>(&self, value: &'v TypedValue) -> Option<&'v TypedValue> {
        match value {
            TypedValue::Derived(v) if v.ty == self.ty => Some(&v.value),
            _ => None,
        }
    }

    pub fn wrap(&self, value: TypedValue) -> TypedValue {
        TypedValue::derived(self.ty.clone(), value)
    }
}

/// Unwraps a typedef value and hands it to the base type's codec.
#[derive(Debug)]
pub struct EncapsulatedCodec {
    projection: Projection,
    inner: Box<ValueCodec>,
}

impl EncapsulatedCodec {
    pub fn new(ty: BindingType, inner: ValueCodec) -> Self {
        Self {
            projection: Projection::new(ty),
            inner: Box::new(inner),
        }
    }

    pub fn ty(&self) -> &BindingType {
        self.projection.ty()
    }

    pub(crate) fn try_serialize(&self, cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
        match self.projection.strip(value) {
            Some(v) => self.inner.try_serialize(cx, v),
            None => Ok(None),
        }
    }

    pub(crate) fn try_deserialize(&self, cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
        Ok(self
            .inner
            .try_deserialize(cx, scalar)?
            .map(|v| self.projection.wrap(v)))
    }
}

/// A typedef over a context-dependent base, run as two stages.
///
/// `outer` is structural and needs no model: it strips or applies the
/// typedef wrapper. `inner` resolves the bare identity or path against the
/// model at call time. A value whose wrapper does not match never reaches
/// the model.
#[derive(Debug)]
pub struct CompositeCodec {
    outer: Projection,
    inner: Box<ValueCodec>,
}

impl CompositeCodec {
    pub fn new(outer: Projection, inner: ValueCodec) -> Self {
        Self {
            outer,
            inner: Box::new(inner),
        }
    }

    pub fn ty(&self) -> &BindingType {
        self.outer.ty()
    }

    pub fn outer(&self) -> &Projection {
        &self.outer
    }

    pub fn inner(&self) -> &ValueCodec {
        &self.inner
    }

    pub(crate) fn try_serialize(&self, cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
        let Some(bare) = self.outer.strip(value) else {
            return Ok(None);
        };
        self.inner.try_serialize(cx, bare)
    }

    pub(crate) fn try_deserialize(&self, cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
        let resolved = self.inner.try_deserialize(cx, scalar)?;
        Ok(resolved.map(|v| self.outer.wrap(v)))
    }
}

pub(crate) fn identity_to_scalar(cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
    let TypedValue::Identity(ty) = value else {
        return Ok(None);
    };
    Ok(Some(Scalar::QName(cx.types().identity_of(ty)?)))
}

pub(crate) fn identity_from_scalar(cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
    let Scalar::QName(qname) = scalar else {
        return Ok(None);
    };
    if cx.schema().identity(qname).is_none() {
        return Err(CodecError::MissingSchema(format!("identity {qname}")));
    }
    Ok(Some(TypedValue::Identity(cx.types().identity_type(qname)?)))
}

pub(crate) fn path_to_scalar(cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
    let TypedValue::InstanceIdentifier(path) = value else {
        return Ok(None);
    };
    Ok(Some(Scalar::InstanceIdentifier(
        cx.encode_instance_identifier(path)?,
    )))
}

pub(crate) fn path_from_scalar(cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
    let Scalar::InstanceIdentifier(path) = scalar else {
        return Ok(None);
    };
    match cx.decode_instance_identifier(path)? {
        Some(p) => Ok(Some(TypedValue::InstanceIdentifier(p))),
        None => Err(CodecError::invalid_value(
            "instance-identifier",
            format!("{path} has no typed-tree representation"),
        )),
    }
}
