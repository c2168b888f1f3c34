use bindtree_node::Scalar;

use super::{ValueCodec, ValueContext};
use crate::binding::{BindingType, TypedValue};
use crate::error::Result;

/// Tries member codecs in declaration order; the first that accepts wins.
#[derive(Debug)]
pub struct UnionCodec {
    ty: BindingType,
    members: Vec<ValueCodec>,
}

impl UnionCodec {
    pub fn new(ty: BindingType, members: Vec<ValueCodec>) -> Self {
        Self { ty, members }
    }

    pub fn ty(&self) -> &BindingType {
        &self.ty
    }

    pub(crate) fn try_serialize(&self, cx: &dyn ValueContext, value: &TypedValue) -> Result<Option<Scalar>> {
        let TypedValue::Union(v) = value else {
            return Ok(None);
        };
        if v.ty != self.ty {
            return Ok(None);
        }
        for member in &self.members {
            if let Some(scalar) = member.try_serialize(cx, &v.value)? {
                return Ok(Some(scalar));
            }
        }
        Ok(None)
    }

    pub(crate) fn try_deserialize(&self, cx: &dyn ValueContext, scalar: &Scalar) -> Result<Option<TypedValue>> {
        for member in &self.members {
            if let Some(value) = member.try_deserialize(cx, scalar)? {
                return Ok(Some(TypedValue::union(self.ty.clone(), value)));
            }
        }
        Ok(None)
    }
}
