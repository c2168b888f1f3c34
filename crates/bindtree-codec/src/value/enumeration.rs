use std::collections::BTreeSet;
use std::sync::Arc;

use bindtree_node::Scalar;
use bindtree_schema::{Bit, EnumMember};

use crate::binding::{BindingType, BitsValue, EnumValue, TypedValue};
use crate::error::{CodecError, Result};

/// Enumerations travel as their member name.
#[derive(Debug)]
pub struct EnumCodec {
    ty: BindingType,
    members: Vec<(Arc<str>, i32)>,
}

impl EnumCodec {
    pub fn new(ty: BindingType, members: &[EnumMember]) -> Self {
        Self {
            ty,
            members: members
                .iter()
                .map(|m| (Arc::from(m.name.as_str()), m.value))
                .collect(),
        }
    }

    pub fn ty(&self) -> &BindingType {
        &self.ty
    }

    pub(crate) fn scalar_of(&self, value: &TypedValue) -> Option<Scalar> {
        match value {
            TypedValue::Enum(v) if v.ty == self.ty => self
                .members
                .iter()
                .find(|(name, _)| *name == v.name)
                .map(|(name, _)| Scalar::String(name.to_string())),
            _ => None,
        }
    }

    pub(crate) fn value_of(&self, scalar: &Scalar) -> Option<TypedValue> {
        let text = scalar.as_str()?;
        self.members
            .iter()
            .find(|(name, _)| &**name == text)
            .map(|(name, value)| {
                TypedValue::Enum(EnumValue {
                    ty: self.ty.clone(),
                    name: Arc::clone(name),
                    value: *value,
                })
            })
    }
}

/// Bits travel as the set of names that are set.
///
/// Decoding yields one flag per declared bit, in declaration order.
#[derive(Debug)]
pub struct BitsCodec {
    ty: BindingType,
    names: Vec<Arc<str>>,
}

impl BitsCodec {
    pub fn new(ty: BindingType, bits: &[Bit]) -> Self {
        Self {
            ty,
            names: bits.iter().map(|b| Arc::from(b.name.as_str())).collect(),
        }
    }

    pub fn ty(&self) -> &BindingType {
        &self.ty
    }

    pub(crate) fn scalar_of(&self, value: &TypedValue) -> Result<Option<Scalar>> {
        let TypedValue::Bits(v) = value else {
            return Ok(None);
        };
        if v.ty != self.ty {
            return Ok(None);
        }
        if let Some(unknown) = v.set_names().find(|n| !self.declares(n)) {
            return Err(CodecError::invalid_value(
                &self.ty,
                format!("undeclared bit {unknown}"),
            ));
        }
        let set: BTreeSet<String> = self
            .names
            .iter()
            .filter(|n| v.is_set(n))
            .map(|n| n.to_string())
            .collect();
        Ok(Some(Scalar::Bits(set)))
    }

    pub(crate) fn value_of(&self, scalar: &Scalar) -> Option<TypedValue> {
        let Scalar::Bits(set) = scalar else {
            return None;
        };
        if set.iter().any(|n| !self.declares(n)) {
            return None;
        }
        Some(TypedValue::Bits(BitsValue::new(
            self.ty.clone(),
            self.names
                .iter()
                .map(|n| (Arc::clone(n), set.contains(&**n))),
        )))
    }

    fn declares(&self, name: &str) -> bool {
        self.names.iter().any(|n| &**n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits() -> BitsCodec {
        let decl = ["alpha", "beta", "gamma"]
            .iter()
            .enumerate()
            .map(|(i, n)| Bit {
                name: (*n).to_owned(),
                position: i as u32,
            })
            .collect::<Vec<_>>();
        BitsCodec::new(BindingType::new("t.Flags"), &decl)
    }

    #[test]
    fn bits_decode_in_declaration_order() {
        let codec = bits();
        let decoded = codec.value_of(&Scalar::bits(["gamma", "alpha"])).unwrap();
        let TypedValue::Bits(v) = decoded else {
            panic!("expected bits");
        };
        let flags: Vec<_> = v.flags.iter().map(|(n, b)| (n.to_string(), *b)).collect();
        assert_eq!(
            flags,
            vec![
                ("alpha".to_owned(), true),
                ("beta".to_owned(), false),
                ("gamma".to_owned(), true)
            ]
        );
    }

    #[test]
    fn bits_reject_undeclared_names() {
        let codec = bits();
        assert!(codec.value_of(&Scalar::bits(["delta"])).is_none());
        let bad = TypedValue::Bits(BitsValue::new(
            BindingType::new("t.Flags"),
            [("delta", true)],
        ));
        assert!(codec.scalar_of(&bad).is_err());
    }

    #[test]
    fn enum_round_trips_by_name() {
        let codec = EnumCodec::new(
            BindingType::new("t.Color"),
            &[
                EnumMember {
                    name: "red".into(),
                    value: 0,
                },
                EnumMember {
                    name: "blue".into(),
                    value: 5,
                },
            ],
        );
        let v = codec.value_of(&Scalar::from("blue")).unwrap();
        assert_eq!(
            v,
            TypedValue::Enum(EnumValue {
                ty: BindingType::new("t.Color"),
                name: "blue".into(),
                value: 5
            })
        );
        assert_eq!(codec.scalar_of(&v), Some(Scalar::from("blue")));
        assert!(codec.value_of(&Scalar::from("green")).is_none());
    }
}
